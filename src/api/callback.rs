use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};
use tokio::sync::Mutex;

use crate::{sharepoint, types::AuthRequest, warning};

/// Handles the redirect from the Microsoft identity platform.
///
/// On a granted authorization the query carries a `code` which is redeemed
/// with the PKCE verifier stored in the shared state; the resulting token
/// is placed back into that state for the login command to pick up. A
/// denied or failed authorization arrives as `error` and
/// `error_description` query parameters instead.
pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(shared_state): Extension<Arc<Mutex<Option<AuthRequest>>>>,
) -> Html<&'static str> {
    if let Some(error) = params.get("error") {
        let description = params
            .get("error_description")
            .map(String::as_str)
            .unwrap_or("no description");
        warning!("Sign-in was not completed: {}: {}", error, description);
        return Html("<h4>Sign-in was not completed.</h4><p>You can close this window.</p>");
    }

    if let Some(code) = params.get("code") {
        let mut state = shared_state.lock().await;
        // Take code verifier from state
        let Some(ref mut auth_request) = state.as_mut() else {
            return Html("<h4>Missing PKCE code verifier.</h4>");
        };

        let verifier = auth_request.code_verifier.clone();

        match sharepoint::auth::exchange_code_pkce(code, &verifier).await {
            Ok(token) => {
                auth_request.token = Some(token);
                Html("<h2>Sign-in successful.</h2><p>You can close this window and return to the terminal.</p>")
            }
            Err(e) => {
                warning!("Token exchange failed: {}", e);
                Html("<h4>Sign-in failed.</h4>")
            }
        }
    } else {
        Html("<h4>Missing authorization code.</h4>")
    }
}
