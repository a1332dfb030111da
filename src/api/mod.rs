//! # API Module
//!
//! This module provides the HTTP endpoints served by the short-lived local
//! web server that backs the sign-in flow. It implements the OAuth
//! redirect target plus a health probe.
//!
//! ## Overview
//!
//! Signing in to SharePoint Online happens in the user's browser against
//! the Microsoft identity platform. The identity platform hands the
//! authorization code back by redirecting to `localhost`, which is where
//! this module comes in:
//!
//! - **OAuth Redirect Handling**: [`callback`] receives the authorization
//!   code (or the error the identity platform reports instead), redeems
//!   it with the stored PKCE verifier and passes the token back to the
//!   waiting login command through shared state.
//! - **Health Probe**: [`health`] reports name and version, which doubles
//!   as a quick way to check that the callback port is actually bound.
//!
//! ## Architecture
//!
//! The endpoints are plain async functions wired into an
//! [Axum](https://docs.rs/axum) router by [`crate::server`]. The server
//! only runs while a `spo login` is in flight; nothing here is reachable
//! afterwards.
//!
//! ## Security Considerations
//!
//! - The PKCE verifier never leaves the process; only the derived
//!   challenge is sent through the browser
//! - A failed or denied authorization renders a terse page and logs the
//!   identity platform's error description to the terminal
//!
//! ## Related Modules
//!
//! - [`crate::sharepoint::auth`] - Drives the sign-in flow and consumes
//!   the token produced here
//! - [`crate::types`] - [`crate::types::AuthRequest`] carries verifier
//!   and token between flow and handler

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
