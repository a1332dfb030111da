use std::collections::HashMap;

use chrono::Utc;

use crate::{
    error::{CommandError, Result},
    management::{ConnectionManager, TokenManager},
    sharepoint::request,
    types::{FormDigestInfo, Token},
    utils,
};

/// Seconds a cached form digest is retired before its server-side expiry.
const DIGEST_MARGIN_SECS: u64 = 30;

#[derive(Debug, Clone)]
struct CachedDigest {
    value: String,
    expires_at: u64,
}

/// Connection state for a signed-in SharePoint Online session.
///
/// Holds the site URL the user connected to, the token manager that hands
/// out (and refreshes) access tokens, and a per-web cache of request
/// digests for POST operations. Commands receive a `SpoContext` explicitly
/// instead of reaching into global state, so a single process can be
/// pointed at different sites in tests.
pub struct SpoContext {
    site_url: String,
    tokens: TokenManager,
    digests: HashMap<String, CachedDigest>,
}

impl SpoContext {
    /// Builds a context from an already obtained token, without touching
    /// the on-disk session.
    pub fn new(site_url: impl Into<String>, token: Token) -> Self {
        SpoContext {
            site_url: site_url.into(),
            tokens: TokenManager::new(token),
            digests: HashMap::new(),
        }
    }

    /// Restores the persisted session (connection info plus cached token).
    pub async fn load() -> Result<Self> {
        let connection = ConnectionManager::load().await.map_err(|_| {
            CommandError::Auth(String::from(
                "Not connected to SharePoint Online. Run `spo login <url>` first.",
            ))
        })?;
        let tokens = TokenManager::load().await.map_err(|_| {
            CommandError::Auth(String::from(
                "No cached token found. Run `spo login <url>` first.",
            ))
        })?;

        Ok(SpoContext {
            site_url: connection.site_url().to_string(),
            tokens,
            digests: HashMap::new(),
        })
    }

    /// The site URL this session is connected to, without a trailing slash.
    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    /// True when the connected site is the `-admin` tenant administration
    /// site itself.
    pub fn is_tenant_admin(&self) -> bool {
        utils::is_tenant_admin_url(&self.site_url)
    }

    /// The tenant administration URL derived from the connected site, e.g.
    /// `https://contoso.sharepoint.com` becomes
    /// `https://contoso-admin.sharepoint.com`.
    pub fn admin_url(&self) -> Result<String> {
        utils::admin_url(&self.site_url).ok_or_else(|| {
            CommandError::Usage(format!(
                "Unable to determine the tenant admin URL for {}. Connect to your \
                 SharePoint Online site, e.g. https://contoso.sharepoint.com.",
                self.site_url
            ))
        })
    }

    /// A currently valid access token, refreshed through the token manager
    /// when the cached one is about to expire.
    pub async fn access_token(&mut self) -> Result<String> {
        self.tokens.get_valid_token().await.map_err(|e| {
            CommandError::Auth(format!(
                "Could not refresh the access token: {}. Run `spo login <url>` to sign in again.",
                e
            ))
        })
    }

    /// A request digest for POST operations against `web_url`, fetched via
    /// `/_api/contextinfo` and cached until shortly before it expires.
    pub async fn ensure_form_digest(&mut self, web_url: &str) -> Result<String> {
        let now = Utc::now().timestamp() as u64;
        if let Some(cached) = self.digests.get(web_url) {
            if cached.expires_at > now {
                return Ok(cached.value.clone());
            }
        }

        let token = self.access_token().await?;
        let url = format!("{}/_api/contextinfo", web_url);
        let info: FormDigestInfo = request::post_empty(&token, &url, None).await?;

        let lifetime = info
            .form_digest_timeout_seconds
            .saturating_sub(DIGEST_MARGIN_SECS);
        self.digests.insert(
            web_url.to_string(),
            CachedDigest {
                value: info.form_digest_value.clone(),
                expires_at: now + lifetime,
            },
        );

        Ok(info.form_digest_value)
    }
}
