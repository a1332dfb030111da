use axum::{Extension, Router, routing::get};
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::sync::Mutex;

use crate::{api, config, error, types::AuthRequest};

/// Runs the local HTTP server that receives the OAuth redirect from the
/// Microsoft identity platform during sign-in. The server lives only for
/// the duration of the login command.
pub async fn start_api_server(state: Arc<Mutex<Option<AuthRequest>>>) {
    let app = Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback).layer(Extension(state)));

    let addr = match SocketAddr::from_str(&config::server_addr()) {
        Ok(addr) => addr,
        Err(e) => error!("Failed to parse server address: {}", e),
    };

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => error!("Failed to bind callback server to {}: {}", addr, e),
    };

    if let Err(e) = axum::serve(listener, app).await {
        error!("Callback server failed: {}", e);
    }
}
