use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode, header};
use serde::{Serialize, de::DeserializeOwned};
use tokio::time::sleep;

use crate::error::{CommandError, Result};

pub const ACCEPT_JSON: &str = "application/json;odata=nometadata";
pub const CONTENT_TYPE_JSON: &str = "application/json;odata=nometadata;charset=utf-8";
const CONTENT_TYPE_XML: &str = "text/xml";
const DIGEST_HEADER: &str = "X-RequestDigest";

const MAX_ATTEMPTS: u32 = 3;
const BAD_GATEWAY_PAUSE_SECS: u64 = 10;
const MAX_RETRY_AFTER_SECS: u64 = 120;

/// Sends a request, retrying throttled (429, honoring `Retry-After`) and
/// flaky-gateway (502) responses a bounded number of times. Any other
/// non-success status is mapped through the OData error shapes into
/// [`CommandError`].
async fn execute<F>(build: F) -> Result<reqwest::Response>
where
    F: Fn() -> RequestBuilder,
{
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        let response = build().send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS && attempt < MAX_ATTEMPTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5);
            if retry_after <= MAX_RETRY_AFTER_SECS {
                sleep(Duration::from_secs(retry_after)).await;
                continue; // retry
            }
        }

        if status == StatusCode::BAD_GATEWAY && attempt < MAX_ATTEMPTS {
            sleep(Duration::from_secs(BAD_GATEWAY_PAUSE_SECS)).await;
            continue; // retry
        }

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        return Err(CommandError::from_odata_body(status, &body));
    }
}

fn apply_digest(builder: RequestBuilder, digest: Option<&str>) -> RequestBuilder {
    match digest {
        Some(digest) => builder.header(DIGEST_HEADER, digest),
        None => builder,
    }
}

pub async fn get_json<T: DeserializeOwned>(token: &str, url: &str) -> Result<T> {
    let client = Client::new();
    let response = execute(|| {
        client
            .get(url)
            .bearer_auth(token)
            .header(header::ACCEPT, ACCEPT_JSON)
    })
    .await?;

    Ok(response.json::<T>().await?)
}

pub async fn post_json<T: DeserializeOwned, B: Serialize>(
    token: &str,
    url: &str,
    digest: Option<&str>,
    body: &B,
) -> Result<T> {
    let client = Client::new();
    let response = execute(|| {
        apply_digest(
            client
                .post(url)
                .bearer_auth(token)
                .header(header::ACCEPT, ACCEPT_JSON)
                .header(header::CONTENT_TYPE, CONTENT_TYPE_JSON)
                .json(body),
            digest,
        )
    })
    .await?;

    Ok(response.json::<T>().await?)
}

/// POST with a JSON body for operations that answer with an empty or
/// irrelevant body (deploy, delete operations).
pub async fn post_json_unit<B: Serialize>(
    token: &str,
    url: &str,
    digest: Option<&str>,
    body: &B,
) -> Result<()> {
    let client = Client::new();
    execute(|| {
        apply_digest(
            client
                .post(url)
                .bearer_auth(token)
                .header(header::ACCEPT, ACCEPT_JSON)
                .header(header::CONTENT_TYPE, CONTENT_TYPE_JSON)
                .json(body),
            digest,
        )
    })
    .await?;

    Ok(())
}

/// Bodyless POST for operations that answer with an empty body.
pub async fn post_unit(token: &str, url: &str, digest: Option<&str>) -> Result<()> {
    let client = Client::new();
    execute(|| {
        apply_digest(
            client
                .post(url)
                .bearer_auth(token)
                .header(header::ACCEPT, ACCEPT_JSON),
            digest,
        )
    })
    .await?;

    Ok(())
}

/// Bodyless POST that parses the response, used by `/_api/contextinfo` and
/// the parameterless `SiteScriptUtility` operations.
pub async fn post_empty<T: DeserializeOwned>(
    token: &str,
    url: &str,
    digest: Option<&str>,
) -> Result<T> {
    let client = Client::new();
    let response = execute(|| {
        apply_digest(
            client
                .post(url)
                .bearer_auth(token)
                .header(header::ACCEPT, ACCEPT_JSON),
            digest,
        )
    })
    .await?;

    Ok(response.json::<T>().await?)
}

/// POST of a raw JSON string, used where the payload already is serialized
/// JSON (site script content).
pub async fn post_text<T: DeserializeOwned>(
    token: &str,
    url: &str,
    digest: Option<&str>,
    body: String,
) -> Result<T> {
    let client = Client::new();
    let response = execute(move || {
        apply_digest(
            client
                .post(url)
                .bearer_auth(token)
                .header(header::ACCEPT, ACCEPT_JSON)
                .header(header::CONTENT_TYPE, CONTENT_TYPE_JSON)
                .body(body.clone()),
            digest,
        )
    })
    .await?;

    Ok(response.json::<T>().await?)
}

/// POST of file bytes, used for `.sppkg` uploads into the app catalog.
pub async fn post_binary<T: DeserializeOwned>(
    token: &str,
    url: &str,
    digest: Option<&str>,
    bytes: &[u8],
) -> Result<T> {
    let client = Client::new();
    let response = execute(|| {
        apply_digest(
            client
                .post(url)
                .bearer_auth(token)
                .header(header::ACCEPT, ACCEPT_JSON)
                .header(header::CONTENT_TYPE, "application/octet-stream")
                .body(bytes.to_vec()),
            digest,
        )
    })
    .await?;

    Ok(response.json::<T>().await?)
}

/// POST of a CSOM envelope to `client.svc/ProcessQuery`. Returns the raw
/// body; the caller parses the CSOM response array out of it.
pub async fn post_xml(token: &str, url: &str, digest: &str, xml: String) -> Result<String> {
    let client = Client::new();
    let response = execute(move || {
        client
            .post(url)
            .bearer_auth(token)
            .header(header::ACCEPT, ACCEPT_JSON)
            .header(header::CONTENT_TYPE, CONTENT_TYPE_XML)
            .header(DIGEST_HEADER, digest)
            .body(xml.clone())
    })
    .await?;

    Ok(response.text().await?)
}
