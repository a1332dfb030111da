//! The single error surface every command reports through. Failures fall into
//! three wire-level families (OData JSON errors, CSOM `ErrorInfo`, transport
//! rejections) plus the local ones (auth state, flag validation, IO).

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::types::CsomErrorInfo;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("{message}")]
    OData {
        code: Option<String>,
        message: String,
    },

    #[error("{message}")]
    Csom {
        message: String,
        error_type: Option<String>,
        correlation_id: Option<String>,
        error_code: Option<i64>,
    },

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Auth(String),

    #[error("Operation did not complete within {seconds} seconds")]
    OperationTimeout { seconds: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("{0}")]
    Usage(String),
}

pub type Result<T> = std::result::Result<T, CommandError>;

impl CommandError {
    /// Maps a non-success REST response body into the OData variant.
    ///
    /// SharePoint and the identity platform answer with a handful of error
    /// shapes depending on endpoint and odata level:
    ///
    /// - `{"odata.error": {"code": "...", "message": {"value": "..."}}}`
    /// - `{"error": {"code": "...", "message": {"value": "..."}}}`
    /// - `{"error": {"message": "..."}}` or `{"error": "..."}`
    /// - `{"error_description": "..."}`
    ///
    /// Anything unrecognized keeps the raw body so the user still sees what
    /// the server said.
    pub fn from_odata_body(status: StatusCode, body: &str) -> CommandError {
        if let Ok(json) = serde_json::from_str::<Value>(body) {
            if let Some(err) = json.get("odata.error").or_else(|| json.get("error")) {
                if let Some(message) = err.as_str() {
                    return CommandError::OData {
                        code: None,
                        message: message.to_string(),
                    };
                }

                let code = err
                    .get("code")
                    .and_then(Value::as_str)
                    .map(|c| c.to_string());
                let message = err
                    .get("message")
                    .and_then(|m| m.get("value").and_then(Value::as_str).or_else(|| m.as_str()))
                    .map(|m| m.to_string());

                if let Some(message) = message {
                    return CommandError::OData { code, message };
                }
            }

            if let Some(desc) = json.get("error_description").and_then(Value::as_str) {
                return CommandError::OData {
                    code: None,
                    message: desc.to_string(),
                };
            }
        }

        let body = body.trim();
        let message = if body.is_empty() {
            format!("Request failed with status {}", status)
        } else {
            format!("Request failed with status {}: {}", status, body)
        };

        CommandError::OData {
            code: None,
            message,
        }
    }
}

impl From<CsomErrorInfo> for CommandError {
    fn from(info: CsomErrorInfo) -> Self {
        CommandError::Csom {
            message: info.error_message,
            error_type: info.error_type_name,
            correlation_id: info.trace_correlation_id,
            error_code: info.error_code,
        }
    }
}
