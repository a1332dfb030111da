//! Configuration management for the SharePoint Online CLI.
//!
//! This module handles loading and accessing configuration values from
//! environment variables and `.env` files. Every setting ships with a working
//! default so a plain `spo login <url>` works out of the box with the public
//! client registration; the `.env` file in the local data directory exists for
//! tenants that bring their own Entra ID app registration or a sovereign-cloud
//! login endpoint.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults

use dotenv;
use std::{env, path::PathBuf};

/// Well-known public client id of the PnP management app registration.
const DEFAULT_CLIENT_ID: &str = "31359c7f-bd7e-475c-86db-fdb8c937548e";
const DEFAULT_TENANT: &str = "common";
const DEFAULT_LOGIN_URL: &str = "https://login.microsoftonline.com";
const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8306";
const DEFAULT_REDIRECT_URI: &str = "http://localhost:8306/callback";
const DEFAULT_OPERATION_TIMEOUT_SECS: u64 = 600;

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the necessary directory structure if it doesn't exist and loads
/// environment variables from `spocli/.env` under the platform-specific local
/// data directory. The file is optional: every setting read from it has a
/// built-in default, so a missing file is not an error.
///
/// # Directory Structure
///
/// The function looks for the `.env` file in:
/// - Linux: `~/.local/share/spocli/.env`
/// - macOS: `~/Library/Application Support/spocli/.env`
/// - Windows: `%LOCALAPPDATA%/spocli/.env`
///
/// # Errors
///
/// Returns an error string only when the parent directory cannot be created.
pub async fn load_env() -> Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spocli/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    // the .env file is optional; defaults cover the public client
    let _ = dotenv::from_path(path);
    Ok(())
}

/// Returns the server address for the local OAuth callback server.
///
/// Read from `SPO_SERVER_ADDRESS`; defaults to `127.0.0.1:8306`. Must agree
/// with the port in [`login_redirect_uri`] or the callback never arrives.
pub fn server_addr() -> String {
    env::var("SPO_SERVER_ADDRESS").unwrap_or_else(|_| DEFAULT_SERVER_ADDRESS.to_string())
}

/// Returns the Entra ID application (client) id used for sign-in.
///
/// Read from `SPO_AUTH_CLIENT_ID`; defaults to the well-known PnP public
/// client registration, which is pre-consented for SharePoint Online access
/// in most tenants.
pub fn login_client_id() -> String {
    env::var("SPO_AUTH_CLIENT_ID").unwrap_or_else(|_| DEFAULT_CLIENT_ID.to_string())
}

/// Returns the tenant segment of the authorization endpoints.
///
/// Read from `SPO_AUTH_TENANT`; defaults to `common`, which lets the identity
/// platform resolve the home tenant from the signed-in account. Tenants that
/// restrict multi-tenant sign-in set their tenant id or `contoso.onmicrosoft.com`
/// here.
pub fn login_tenant() -> String {
    env::var("SPO_AUTH_TENANT").unwrap_or_else(|_| DEFAULT_TENANT.to_string())
}

/// Returns the base URL of the Microsoft identity platform.
///
/// Read from `SPO_LOGIN_URL`; defaults to `https://login.microsoftonline.com`.
/// Sovereign clouds (GCC High, China) point this at their own login host.
pub fn login_base_url() -> String {
    env::var("SPO_LOGIN_URL").unwrap_or_else(|_| DEFAULT_LOGIN_URL.to_string())
}

/// Returns the OAuth2 v2.0 authorization endpoint for the configured tenant.
pub fn login_authorize_url() -> String {
    format!(
        "{base}/{tenant}/oauth2/v2.0/authorize",
        base = login_base_url(),
        tenant = login_tenant()
    )
}

/// Returns the OAuth2 v2.0 token endpoint for the configured tenant.
pub fn login_token_url() -> String {
    format!(
        "{base}/{tenant}/oauth2/v2.0/token",
        base = login_base_url(),
        tenant = login_tenant()
    )
}

/// Returns the redirect URI registered for the public client.
///
/// Read from `SPO_AUTH_REDIRECT_URI`; defaults to
/// `http://localhost:8306/callback`, served by the local callback server
/// started during `spo login`.
pub fn login_redirect_uri() -> String {
    env::var("SPO_AUTH_REDIRECT_URI").unwrap_or_else(|_| DEFAULT_REDIRECT_URI.to_string())
}

/// Returns the overall timeout applied while polling long-running tenant
/// operations, in seconds.
///
/// Read from `SPO_OPERATION_TIMEOUT`; defaults to 600. Unparsable values fall
/// back to the default rather than aborting the command.
pub fn operation_timeout_secs() -> u64 {
    env::var("SPO_OPERATION_TIMEOUT")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(DEFAULT_OPERATION_TIMEOUT_SECS)
}
