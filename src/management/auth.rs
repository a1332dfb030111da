use std::path::PathBuf;

use chrono::Utc;
use reqwest::Client;

use crate::{config, types::Token};

/// Refresh ahead of the actual expiry so a token never dies mid-request.
const EXPIRY_MARGIN_SECS: u64 = 240;

pub struct TokenManager {
    token: Token,
}

impl TokenManager {
    pub fn new(token: Token) -> Self {
        TokenManager { token }
    }

    pub async fn load() -> Result<Self, String> {
        let path = Self::token_path();
        let content = async_fs::read_to_string(&path)
            .await
            .map_err(|e| e.to_string())?;
        let token: Token = serde_json::from_str(&content).map_err(|e| e.to_string())?;
        Ok(Self { token })
    }

    pub async fn persist(&self) -> Result<(), String> {
        let path = Self::token_path();
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(&self.token).map_err(|e| e.to_string())?;
        async_fs::write(Self::token_path(), json)
            .await
            .map_err(|e| e.to_string())
    }

    pub async fn clear() -> Result<(), String> {
        let path = Self::token_path();
        if path.is_file() {
            async_fs::remove_file(path)
                .await
                .map_err(|e| e.to_string())?;
        }
        Ok(())
    }

    /// Returns a bearer token that is valid for at least the expiry margin,
    /// refreshing through the identity platform when the cached one is stale.
    pub async fn get_valid_token(&mut self) -> Result<String, String> {
        if self.is_expired() {
            let new_token = self.refresh_token().await?;
            self.token = new_token;
            let _ = self.persist().await;
        }

        Ok(self.token.access_token.clone())
    }

    fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp() as u64;
        now >= self.token.obtained_at + self.token.expires_in - EXPIRY_MARGIN_SECS
    }

    async fn refresh_token(&self) -> Result<Token, String> {
        if self.token.refresh_token.is_empty() {
            return Err(String::from("no refresh token cached"));
        }

        let client = Client::new();
        let res = client
            .post(&config::login_token_url())
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", &self.token.refresh_token),
                ("client_id", &config::login_client_id()),
                ("scope", &self.token.scope),
            ])
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let json: serde_json::Value = res.json().await.map_err(|e| e.to_string())?;

        let access_token = match json["access_token"].as_str() {
            Some(t) => t.to_string(),
            None => {
                let reason = json["error_description"]
                    .as_str()
                    .or_else(|| json["error"].as_str())
                    .unwrap_or("no access token in refresh response");
                return Err(reason.to_string());
            }
        };

        Ok(Token {
            access_token,
            // the identity platform may rotate the refresh token; keep the
            // old one when it doesn't
            refresh_token: json["refresh_token"]
                .as_str()
                .unwrap_or(&self.token.refresh_token)
                .to_string(),
            scope: json["scope"]
                .as_str()
                .unwrap_or(&self.token.scope)
                .to_string(),
            expires_in: json["expires_in"].as_u64().unwrap_or(3600),
            obtained_at: Utc::now().timestamp() as u64,
        })
    }

    fn token_path() -> PathBuf {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("spocli/cache/token.json");
        path
    }

    pub fn current_token(&self) -> &Token {
        &self.token
    }
}
