//! # CLI Module
//!
//! This module provides the command-line interface layer for the CLI, a
//! SharePoint Online administration client. It implements all user-facing
//! commands and coordinates between the SharePoint integration layer, the
//! persisted session and user interaction.
//!
//! ## Overview
//!
//! The CLI module is the boundary where flags and arguments turn into
//! SharePoint API calls and API responses turn into console output. It
//! provides commands for:
//!
//! - **Session Management**: Signing in via OAuth 2.0 PKCE, signing out,
//!   inspecting the current connection
//! - **App Catalog**: Uploading, deploying, listing and removing `.sppkg`
//!   packages in the tenant app catalog
//! - **Site Collections**: Creating modern sites, inspecting sites, and
//!   the classic tenant-administration lifecycle (create, update, list,
//!   remove)
//! - **Site Designs & Scripts**: Registering and managing site
//!   provisioning artifacts
//! - **Tenant Properties**: Reading and writing storage entities
//!
//! ## Command Categories
//!
//! ### Session
//!
//! - [`auth::login`] - Signs in to a SharePoint Online site
//! - [`auth::logout`] - Discards the cached token and connection
//! - [`auth::status`] - Shows the current connection and token state
//!
//! ### App Catalog
//!
//! - [`app::add`] / [`app::deploy`] / [`app::get`] / [`app::list`] /
//!   [`app::remove`]
//!
//! ### Site Collections
//!
//! - [`site::add`] - Creates a modern team or communication site
//! - [`site::get`] - Shows the properties of a site collection
//! - [`site::classic_add`] / [`site::classic_set`] /
//!   [`site::classic_list`] / [`site::classic_remove`] - Classic lifecycle
//!   through the tenant admin CSOM API, optionally waiting for the
//!   deferred server-side operation to finish
//!
//! ### Provisioning Artifacts
//!
//! - [`sitedesign::add`] / [`sitedesign::apply`] / [`sitedesign::get`] /
//!   [`sitedesign::list`] / [`sitedesign::remove`]
//! - [`sitescript::add`] / [`sitescript::get`] / [`sitescript::list`] /
//!   [`sitescript::remove`]
//!
//! ### Tenant Properties
//!
//! - [`storageentity::get`] / [`storageentity::list`] /
//!   [`storageentity::set`] / [`storageentity::remove`]
//!
//! ## Interaction Patterns
//!
//! Commands follow a shared shape:
//!
//! 1. **Validate** flags locally (URLs, GUIDs, file paths) before any
//!    network traffic
//! 2. **Restore** the session into an [`SpoContext`]
//! 3. **Call** the SharePoint integration layer
//! 4. **Render** the result: tables for lists, pretty-printed JSON for
//!    single objects, colored status lines for actions
//!
//! Long-running operations show a spinner while polling; destructive
//! commands ask for confirmation unless `--confirm` was passed. Errors
//! print through the [`error!`](crate::error!) macro, which terminates
//! the process with a non-zero exit code.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::{error, sharepoint::SpoContext};

pub mod app;
pub mod auth;
pub mod site;
pub mod sitedesign;
pub mod sitescript;
pub mod storageentity;

/// Restores the persisted session or exits with sign-in guidance.
pub(crate) async fn load_context() -> SpoContext {
    match SpoContext::load().await {
        Ok(ctx) => ctx,
        Err(e) => error!("{}", e),
    }
}

pub(crate) fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb
}

pub(crate) fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("Failed to render response: {}", e),
    }
}

/// Asks a yes/no question on the terminal, defaulting to no.
pub(crate) fn confirmed(prompt: &str) -> bool {
    use std::io::{self, Write};

    print!("{} [y/N] ", prompt);
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    if io::stdin().read_line(&mut answer).is_err() {
        return false;
    }

    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
