use std::{sync::Arc, time::Duration};

use chrono::Utc;
use reqwest::{Client, Url};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    config, error,
    management::{ConnectionManager, TokenManager},
    server::start_api_server,
    success,
    types::{AuthRequest, ConnectionInfo, Token},
    utils, warning,
};

/// Window within which the browser sign-in has to complete.
const LOGIN_TIMEOUT_SECS: u64 = 300;

/// Signs in to SharePoint Online via the OAuth 2.0 authorization code flow
/// with PKCE against the Microsoft identity platform.
///
/// The flow in order:
/// 1. Generates a PKCE code verifier and derives the SHA-256 challenge
/// 2. Starts a local HTTP server to receive the redirect from the identity
///    platform
/// 3. Opens the authorization URL in the default browser, requesting the
///    `{site}/.default` scope plus `offline_access` for refresh tokens
/// 4. Waits for the callback handler to redeem the authorization code
/// 5. Persists the token and the connection info (site URL, tenant) so
///    subsequent commands can restore the session
///
/// # Arguments
///
/// * `site_url` - Normalized SharePoint site URL the session is bound to
/// * `shared_state` - State shared with the callback handler; carries the
///   code verifier out and the redeemed token back
///
/// Failures to open a browser degrade to printing the URL for manual
/// navigation. A missing callback within the timeout terminates the
/// program with an error message.
pub async fn login(site_url: String, shared_state: Arc<Mutex<Option<AuthRequest>>>) {
    // generate PKCE verifier and challenge
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);

    // start callback server
    let server_state = Arc::clone(&shared_state);
    tokio::spawn(async move {
        start_api_server(server_state).await;
    });

    let scope = format!("{}/.default offline_access", site_url);
    let auth_url = match Url::parse_with_params(
        &config::login_authorize_url(),
        &[
            ("client_id", config::login_client_id()),
            ("response_type", String::from("code")),
            ("redirect_uri", config::login_redirect_uri()),
            ("code_challenge", code_challenge),
            ("code_challenge_method", String::from("S256")),
            ("scope", scope),
        ],
    ) {
        Ok(url) => url,
        Err(e) => {
            error!("Failed to construct the authorization URL: {}", e);
        }
    };

    // Store verifier in shared state before redirect
    {
        let mut lock = shared_state.lock().await;
        *lock = Some(AuthRequest {
            code_verifier: code_verifier.clone(),
            token: None,
        });
    }

    // Open the authorization URL in the default browser
    if webbrowser::open(auth_url.as_str()).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    // wait for callback to be hit
    let token = wait_for_token(shared_state).await;

    match token {
        Some(t) => {
            let token_manager = TokenManager::new(t.clone());
            if let Err(e) = token_manager.persist().await {
                error!("Failed to save token to cache: {}", e);
            }

            let connection = ConnectionManager::new(ConnectionInfo {
                site_url: site_url.clone(),
                tenant: config::login_tenant(),
            });
            if let Err(e) = connection.persist().await {
                error!("Failed to save connection info: {}", e);
            }

            success!("Connected to {}", site_url);
        }
        None => {
            error!("Sign-in failed or timed out.");
        }
    }
}

/// Waits for the OAuth callback to complete and return a token.
///
/// Polls the shared state once a second until the callback handler has
/// stored the redeemed token, giving up after [`LOGIN_TIMEOUT_SECS`].
/// Returns `None` on timeout.
async fn wait_for_token(shared_state: Arc<Mutex<Option<AuthRequest>>>) -> Option<Token> {
    use std::time::Instant;

    let max_wait = Duration::from_secs(LOGIN_TIMEOUT_SECS);
    let start = Instant::now();

    while start.elapsed() < max_wait {
        let lock = shared_state.lock().await;
        if let Some(auth_request) = lock.as_ref() {
            if let Some(token) = &auth_request.token {
                return Some(token.clone());
            }
        }
        drop(lock);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}

/// Exchanges an authorization code for an access token using PKCE.
///
/// Completes the authorization code flow by redeeming the code at the
/// Microsoft identity platform token endpoint. The code verifier proves
/// that the client completing the flow is the one that initiated it. The
/// identity platform binds the granted scopes to the authorization
/// request, so none are sent here.
///
/// # Arguments
///
/// * `code` - Authorization code received by the callback handler
/// * `verifier` - PKCE code verifier generated at the start of the flow
///
/// Returns the redeemed token, or the identity platform's error
/// description when the code is rejected.
pub async fn exchange_code_pkce(code: &str, verifier: &str) -> Result<Token, String> {
    let client = Client::new();
    let res = client
        .post(config::login_token_url())
        .form(&[
            ("grant_type", "authorization_code"),
            ("client_id", &config::login_client_id()),
            ("code", code),
            ("code_verifier", verifier),
            ("redirect_uri", &config::login_redirect_uri()),
        ])
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let json: Value = res.json().await.map_err(|e| e.to_string())?;

    let access_token = match json["access_token"].as_str() {
        Some(t) => t.to_string(),
        None => {
            let description = json["error_description"]
                .as_str()
                .or_else(|| json["error"].as_str())
                .unwrap_or("token endpoint returned no access token");
            return Err(description.to_string());
        }
    };

    Ok(Token {
        access_token,
        refresh_token: json["refresh_token"]
            .as_str()
            .unwrap_or_default()
            .to_string(),
        scope: json["scope"].as_str().unwrap_or_default().to_string(),
        expires_in: json["expires_in"].as_u64().unwrap_or(3600),
        obtained_at: Utc::now().timestamp() as u64,
    })
}
