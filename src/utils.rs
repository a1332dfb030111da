use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

pub fn generate_code_verifier() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect()
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Validates and normalizes a SharePoint site URL: https only, host present,
/// no trailing slash. Returns the cleaned URL.
pub fn normalize_site_url(url: &str) -> Result<String, String> {
    let url = url.trim().trim_end_matches('/');

    let rest = match url.strip_prefix("https://") {
        Some(rest) => rest,
        None => return Err(format!("{} is not a valid https URL", url)),
    };

    let host = rest.split('/').next().unwrap_or_default();
    if host.is_empty() {
        return Err(format!("{} is missing a host name", url));
    }

    Ok(url.to_string())
}

/// Derives the tenant admin site URL from any site URL of the tenant:
/// `https://contoso.sharepoint.com/...` becomes
/// `https://contoso-admin.sharepoint.com`. Returns `None` when the host has
/// no tenant label to suffix (single-label hosts, IP addresses).
pub fn admin_url(site_url: &str) -> Option<String> {
    let rest = site_url.strip_prefix("https://")?;
    let host = rest.split('/').next()?;
    if host.parse::<std::net::Ipv4Addr>().is_ok() {
        return None;
    }

    let (label, domain) = host.split_once('.')?;
    if label.is_empty() {
        return None;
    }

    if label.ends_with("-admin") {
        return Some(format!("https://{}", host));
    }

    Some(format!("https://{}-admin.{}", label, domain))
}

pub fn is_tenant_admin_url(site_url: &str) -> bool {
    site_url
        .strip_prefix("https://")
        .and_then(|rest| rest.split('/').next())
        .and_then(|host| host.split_once('.'))
        .map(|(label, _)| label.ends_with("-admin"))
        .unwrap_or(false)
}

/// Checks the `8-4-4-4-12` hex GUID shape used by app ids, site design ids
/// and site script ids.
pub fn is_guid(value: &str) -> bool {
    let value = value
        .strip_prefix('{')
        .and_then(|v| v.strip_suffix('}'))
        .unwrap_or(value);

    let groups: Vec<&str> = value.split('-').collect();
    if groups.len() != 5 {
        return false;
    }

    let expected = [8, 4, 4, 4, 12];
    groups
        .iter()
        .zip(expected.iter())
        .all(|(group, len)| group.len() == *len && group.chars().all(|c| c.is_ascii_hexdigit()))
}
