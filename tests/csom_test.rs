use std::time::Duration;

use spocli::CommandError;
use spocli::sharepoint::csom::{envelope, parse_response, payload, polling_interval, xml_escape};
use spocli::types::SpoOperation;

#[test]
fn test_xml_escape_markup_characters() {
    assert_eq!(
        xml_escape("<Tag attr=\"a & b\">'x'</Tag>"),
        "&lt;Tag attr=&quot;a &amp; b&quot;&gt;&apos;x&apos;&lt;/Tag&gt;"
    );

    // Plain text passes through untouched
    assert_eq!(xml_escape("SPSite marketing"), "SPSite marketing");
}

#[test]
fn test_xml_escape_identity_newlines() {
    // Object identities carry literal newlines that must become character
    // references inside an XML attribute
    let identity = "5d0e589d-4bbd\n5000-9184-7e1a547eef30|908bed80";
    assert_eq!(
        xml_escape(identity),
        "5d0e589d-4bbd&#xA;5000-9184-7e1a547eef30|908bed80"
    );

    assert_eq!(xml_escape("a\r\nb"), "a&#xD;&#xA;b");
}

#[test]
fn test_envelope_wraps_actions_and_paths() {
    let xml = envelope(
        "<Query Id=\"4\" ObjectPathId=\"1\" />",
        "<Constructor Id=\"1\" TypeId=\"{268004ae-ef6b-4e9b-8425-127220d84719}\" />",
    );

    // Envelope attributes the service validates
    assert!(xml.starts_with("<Request "));
    assert!(xml.contains("SchemaVersion=\"15.0.0.0\""));
    assert!(xml.contains("LibraryVersion=\"16.0.0.0\""));
    assert!(xml.contains("xmlns=\"http://schemas.microsoft.com/sharepoint/clientquery/2009\""));

    // Sections in order, payload embedded verbatim
    assert!(xml.contains("<Actions><Query Id=\"4\" ObjectPathId=\"1\" /></Actions>"));
    assert!(xml.contains(
        "<ObjectPaths><Constructor Id=\"1\" \
         TypeId=\"{268004ae-ef6b-4e9b-8425-127220d84719}\" /></ObjectPaths>"
    ));
    assert!(xml.ends_with("</Request>"));
}

#[test]
fn test_parse_response_surfaces_error_info() {
    // A failed batch still comes back as HTTP 200; the failure lives in the
    // header's ErrorInfo
    let body = r#"[
        {
            "SchemaVersion": "15.0.0.0",
            "LibraryVersion": "16.0.25715.12001",
            "ErrorInfo": {
                "ErrorMessage": "A site already exists at url https://contoso.sharepoint.com/sites/classic.",
                "ErrorValue": null,
                "TraceCorrelationId": "b33a489e-009b-5000-8240-e8c58f27e9d2",
                "ErrorCode": -2147024809,
                "ErrorTypeName": "Microsoft.SharePoint.Client.ServerException"
            },
            "TraceCorrelationId": "b33a489e-009b-5000-8240-e8c58f27e9d2"
        }
    ]"#;

    let err = parse_response(body).unwrap_err();
    match err {
        CommandError::Csom {
            message,
            error_type,
            correlation_id,
            error_code,
        } => {
            assert!(message.contains("A site already exists"));
            assert_eq!(
                error_type.as_deref(),
                Some("Microsoft.SharePoint.Client.ServerException")
            );
            assert_eq!(
                correlation_id.as_deref(),
                Some("b33a489e-009b-5000-8240-e8c58f27e9d2")
            );
            assert_eq!(error_code, Some(-2147024809));
        }
        other => panic!("expected Csom error, got {:?}", other),
    }
}

#[test]
fn test_parse_response_accepts_null_error_info() {
    let body = r#"[
        {"SchemaVersion": "15.0.0.0", "ErrorInfo": null, "TraceCorrelationId": "aa"},
        4,
        {"IsComplete": true}
    ]"#;

    let values = parse_response(body).unwrap();
    assert_eq!(values.len(), 3);
}

#[test]
fn test_parse_response_rejects_non_array_body() {
    let err = parse_response("<html>Sign in to your account</html>").unwrap_err();
    assert!(
        err.to_string()
            .contains("Unexpected response from client.svc")
    );
}

#[test]
fn test_payload_returns_last_element() {
    // Callers place the query whose result they want last in <Actions>, so
    // its object is the last array element
    let body = r#"[
        {"SchemaVersion": "15.0.0.0", "ErrorInfo": null},
        7,
        {"_ObjectIdentity_": "identity|spo-op", "IsComplete": false, "PollingInterval": 15000},
        8,
        {"_ObjectIdentity_": "identity|spo-op", "IsComplete": true, "PollingInterval": 0}
    ]"#;

    let operation: SpoOperation = payload(body).unwrap();
    assert!(operation.is_complete);
    assert_eq!(operation.polling_interval, 0);
    assert_eq!(operation.object_identity, "identity|spo-op");
}

#[test]
fn test_payload_rejects_header_only_body() {
    let body = r#"[{"SchemaVersion": "15.0.0.0", "ErrorInfo": null}]"#;

    let err = payload::<SpoOperation>(body).unwrap_err();
    assert!(err.to_string().contains("no payload"));
}

#[test]
fn test_polling_interval_enforces_floor() {
    let operation = |ms: u64| SpoOperation {
        object_identity: "854d9f70|SpoOperation".to_string(),
        is_complete: false,
        polling_interval: ms,
    };

    // Zero and sub-floor intervals clamp to five seconds
    assert_eq!(polling_interval(&operation(0)), Duration::from_secs(5));
    assert_eq!(polling_interval(&operation(1_000)), Duration::from_secs(5));

    // A slower server-suggested pace is respected
    assert_eq!(polling_interval(&operation(15_000)), Duration::from_secs(15));
}
