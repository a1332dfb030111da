use std::sync::Arc;

use chrono::{TimeZone, Utc};
use tokio::sync::Mutex;

use crate::{
    error, info,
    management::{ConnectionManager, TokenManager},
    sharepoint, success,
    types::AuthRequest,
    utils, warning,
};

pub async fn login(url: String, shared_state: Arc<Mutex<Option<AuthRequest>>>) {
    let site_url = match utils::normalize_site_url(&url) {
        Ok(site_url) => site_url,
        Err(e) => error!("{}", e),
    };

    sharepoint::auth::login(site_url, shared_state).await;
}

pub async fn logout() {
    if let Err(e) = TokenManager::clear().await {
        warning!("Failed to remove cached token: {}", e);
    }
    if let Err(e) = ConnectionManager::clear().await {
        warning!("Failed to remove connection info: {}", e);
    }

    success!("Signed out from SharePoint Online.");
}

pub async fn status() {
    let connection = match ConnectionManager::load().await {
        Ok(connection) => connection,
        Err(_) => {
            info!("Not connected to SharePoint Online.");
            return;
        }
    };

    println!("Connected to: {}", connection.site_url());
    println!("Tenant:       {}", connection.info().tenant);

    match TokenManager::load().await {
        Ok(tokens) => {
            let token = tokens.current_token();
            let context = sharepoint::SpoContext::new(connection.site_url(), token.clone());
            println!(
                "Admin site:   {}",
                if context.is_tenant_admin() { "yes" } else { "no" }
            );

            let expires_at = token.obtained_at + token.expires_in;
            match Utc.timestamp_opt(expires_at as i64, 0).single() {
                Some(expiry) => {
                    if (Utc::now().timestamp() as u64) < expires_at {
                        println!("Token:        valid until {}", expiry.to_rfc3339());
                    } else {
                        println!("Token:        expired {}, will refresh on next call", expiry.to_rfc3339());
                    }
                }
                None => println!("Token:        cached"),
            }
        }
        Err(_) => warning!("Connection info found but no cached token. Run `spo login <url>` again."),
    }
}
