use reqwest::StatusCode;
use spocli::CommandError;

fn odata_parts(err: CommandError) -> (Option<String>, String) {
    match err {
        CommandError::OData { code, message } => (code, message),
        other => panic!("expected OData error, got {:?}", other),
    }
}

#[test]
fn test_verbose_odata_error_shape() {
    let body = r#"{
        "odata.error": {
            "code": "-2147024891, System.UnauthorizedAccessException",
            "message": {"lang": "en-US", "value": "Access denied."}
        }
    }"#;

    let (code, message) = odata_parts(CommandError::from_odata_body(StatusCode::FORBIDDEN, body));
    assert_eq!(message, "Access denied.");
    assert!(code.unwrap().contains("UnauthorizedAccessException"));
}

#[test]
fn test_nometadata_error_shape() {
    let body = r#"{"error": {"code": "-1, InvalidClientQueryException", "message": {"value": "Invalid request."}}}"#;

    let (code, message) =
        odata_parts(CommandError::from_odata_body(StatusCode::BAD_REQUEST, body));
    assert_eq!(message, "Invalid request.");
    assert_eq!(code.as_deref(), Some("-1, InvalidClientQueryException"));
}

#[test]
fn test_flat_message_error_shape() {
    // Some endpoints put the message string directly under error.message
    let body = r#"{"error": {"message": "The site design does not exist."}}"#;

    let (code, message) = odata_parts(CommandError::from_odata_body(StatusCode::NOT_FOUND, body));
    assert_eq!(message, "The site design does not exist.");
    assert!(code.is_none());
}

#[test]
fn test_string_error_shape() {
    let body = r#"{"error": "invalid_grant"}"#;

    let (code, message) =
        odata_parts(CommandError::from_odata_body(StatusCode::BAD_REQUEST, body));
    assert_eq!(message, "invalid_grant");
    assert!(code.is_none());
}

#[test]
fn test_identity_platform_error_description() {
    let body = r#"{"error_description": "AADSTS70008: The refresh token has expired."}"#;

    let (_, message) = odata_parts(CommandError::from_odata_body(StatusCode::UNAUTHORIZED, body));
    assert!(message.starts_with("AADSTS70008"));
}

#[test]
fn test_unrecognized_body_keeps_raw_text() {
    let err = CommandError::from_odata_body(
        StatusCode::SERVICE_UNAVAILABLE,
        "<html>Service unavailable</html>",
    );

    let text = err.to_string();
    assert!(text.contains("503"));
    assert!(text.contains("<html>Service unavailable</html>"));
}

#[test]
fn test_empty_body_reports_status_only() {
    let err = CommandError::from_odata_body(StatusCode::INTERNAL_SERVER_ERROR, "");
    assert_eq!(err.to_string(), "Request failed with status 500 Internal Server Error");
}
