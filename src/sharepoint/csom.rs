use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    error::{CommandError, Result},
    sharepoint::{SpoContext, request},
    types::{CsomHeader, SpoOperation},
};

/// Service endpoint for CSOM batches, relative to a web URL.
pub const PROCESS_QUERY_PATH: &str = "/_vti_bin/client.svc/ProcessQuery";

/// CSOM type id of the `Microsoft.Online.SharePoint.TenantAdministration.Tenant`
/// constructor.
pub const TENANT_TYPE_ID: &str = "{268004ae-ef6b-4e9b-8425-127220d84719}";

const SCHEMA_VERSION: &str = "15.0.0.0";
const LIBRARY_VERSION: &str = "16.0.0.0";
const APPLICATION_NAME: &str = "spocli";

/// Floor for the server-driven polling interval.
const MIN_POLL_MS: u64 = 5_000;

/// Escapes a string for embedding in CSOM XML attribute or element content.
///
/// Besides the five XML entities this escapes newlines and carriage
/// returns numerically; object identities returned by the server contain
/// literal newlines that must survive the round trip through an XML
/// attribute.
pub fn xml_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\n' => escaped.push_str("&#xA;"),
            '\r' => escaped.push_str("&#xD;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Wraps actions and object paths into a complete `ProcessQuery` request
/// envelope.
pub fn envelope(actions: &str, object_paths: &str) -> String {
    format!(
        "<Request AddExpandoFieldTypeSuffix=\"true\" SchemaVersion=\"{SCHEMA_VERSION}\" \
         LibraryVersion=\"{LIBRARY_VERSION}\" ApplicationName=\"{APPLICATION_NAME}\" \
         xmlns=\"http://schemas.microsoft.com/sharepoint/clientquery/2009\">\
         <Actions>{actions}</Actions><ObjectPaths>{object_paths}</ObjectPaths></Request>"
    )
}

fn protocol_error(message: String) -> CommandError {
    CommandError::Csom {
        message,
        error_type: None,
        correlation_id: None,
        error_code: None,
    }
}

/// Parses a `ProcessQuery` response body into its JSON array form.
///
/// The body is a JSON array whose first element is a header object. A
/// failed batch reports the failure in the header's `ErrorInfo`, with the
/// HTTP status still 200; such a response is turned into
/// [`CommandError::Csom`] here.
pub fn parse_response(body: &str) -> Result<Vec<Value>> {
    let values: Vec<Value> = serde_json::from_str(body)
        .map_err(|_| protocol_error(format!("Unexpected response from client.svc: {}", body)))?;

    let header = values
        .first()
        .ok_or_else(|| protocol_error(String::from("Empty response from client.svc")))?;
    let header: CsomHeader = serde_json::from_value(header.clone())
        .map_err(|_| protocol_error(String::from("Malformed client.svc response header")))?;

    if let Some(error_info) = header.error_info {
        return Err(CommandError::from(error_info));
    }

    Ok(values)
}

/// Extracts the result object of the last query in a batch.
///
/// Results follow their action ids in the response array, so the object
/// belonging to the query that was placed last in `<Actions>` is the last
/// array element. Callers order their actions accordingly.
pub fn payload<T: DeserializeOwned>(body: &str) -> Result<T> {
    let values = parse_response(body)?;
    if values.len() < 2 {
        return Err(protocol_error(String::from(
            "client.svc response contained no payload",
        )));
    }

    let last = values[values.len() - 1].clone();
    serde_json::from_value(last)
        .map_err(|e| protocol_error(format!("Unexpected client.svc payload: {}", e)))
}

/// Executes a CSOM envelope against the `client.svc/ProcessQuery` endpoint
/// of `web_url` and returns the raw response body.
///
/// `ProcessQuery` requires a form digest even though the batch rides on a
/// bearer token; the digest is obtained through the context's cache.
pub async fn process_query(ctx: &mut SpoContext, web_url: &str, xml: String) -> Result<String> {
    let digest = ctx.ensure_form_digest(web_url).await?;
    let token = ctx.access_token().await?;
    let url = format!("{}{}", web_url, PROCESS_QUERY_PATH);
    request::post_xml(&token, &url, &digest, xml).await
}

fn operation_status_query(object_identity: &str) -> String {
    envelope(
        "<Query Id=\"188\" ObjectPathId=\"184\"><Query SelectAllProperties=\"false\">\
         <Properties><Property Name=\"IsComplete\" ScalarProperty=\"true\" />\
         <Property Name=\"PollingInterval\" ScalarProperty=\"true\" /></Properties>\
         </Query></Query>",
        &format!(
            "<Identity Id=\"184\" Name=\"{}\" />",
            xml_escape(object_identity)
        ),
    )
}

/// Delay before the next status query: the interval the operation handle
/// suggests, with a five second floor. The handle always carries an
/// interval; a zero clamps to the floor like any other low value.
pub fn polling_interval(operation: &SpoOperation) -> Duration {
    Duration::from_millis(operation.polling_interval.max(MIN_POLL_MS))
}

/// Polls a deferred tenant operation until the server reports it complete.
///
/// Site collection creation, deletion and property updates return an
/// `SpoOperation` handle instead of finishing synchronously. This sleeps
/// for the interval the server suggests (bounded below by five seconds),
/// re-queries `IsComplete` through the operation's object identity and
/// repeats until completion or until `max_wait` has elapsed, whichever
/// comes first. Exceeding `max_wait` yields
/// [`CommandError::OperationTimeout`]; the operation itself keeps running
/// server-side.
pub async fn wait_for_operation(
    ctx: &mut SpoContext,
    web_url: &str,
    mut operation: SpoOperation,
    max_wait: Duration,
) -> Result<()> {
    use std::time::Instant;

    let start = Instant::now();

    while !operation.is_complete {
        if start.elapsed() >= max_wait {
            return Err(CommandError::OperationTimeout {
                seconds: max_wait.as_secs(),
            });
        }

        tokio::time::sleep(polling_interval(&operation)).await;

        let xml = operation_status_query(&operation.object_identity);
        let body = process_query(ctx, web_url, xml).await?;
        operation = payload::<SpoOperation>(&body)?;
    }

    Ok(())
}
