use std::time::Duration;

use chrono::Utc;
use httpmock::prelude::*;
use serde_json::json;

use spocli::CommandError;
use spocli::sharepoint::{SpoContext, app, csom, site, sitedesign, sitescript, tenant};
use spocli::types::{CreateSiteDesignInfo, CreateSiteRequest, SpoOperation, Token};

// Helper function to create a token that will not trigger a refresh
fn test_token() -> Token {
    Token {
        access_token: "test-access-token".to_string(),
        refresh_token: "test-refresh-token".to_string(),
        scope: "https://contoso.sharepoint.com/.default offline_access".to_string(),
        expires_in: 3600,
        obtained_at: Utc::now().timestamp() as u64,
    }
}

// Helper function to create a context connected to the mock server
fn connected(server: &MockServer) -> SpoContext {
    SpoContext::new(server.url(""), test_token())
}

// Helper function to register the /_api/contextinfo mock that digest-bearing
// operations need
fn mock_contextinfo<'a>(server: &'a MockServer, digest: &str) -> httpmock::Mock<'a> {
    let body = json!({
        "FormDigestValue": digest,
        "FormDigestTimeoutSeconds": 1800,
        "WebFullUrl": server.url("")
    });
    server.mock(move |when, then| {
        when.method(POST)
            .path("/_api/contextinfo")
            .header("authorization", "Bearer test-access-token");
        then.status(200).json_body(body.clone());
    })
}

#[tokio::test]
async fn test_create_site_posts_spsitemanager_request() {
    let server = MockServer::start();

    let create_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/_api/SPSiteManager/Create")
            .header("authorization", "Bearer test-access-token")
            .header("accept", "application/json;odata=nometadata")
            .json_body(json!({
                "request": {
                    "Title": "Marketing",
                    "Url": "https://contoso.sharepoint.com/sites/marketing",
                    "Lcid": 1033,
                    "ShareByEmailEnabled": false,
                    "Classification": "",
                    "Description": "",
                    "WebTemplate": "SITEPAGEPUBLISHING#0",
                    "SiteDesignId": "96c933ac-3698-44c7-9f4a-5fd17d71af9e",
                    "Owner": "admin@contoso.onmicrosoft.com"
                }
            }));
        then.status(200).json_body(json!({
            "SiteId": "c9d55e9f-f9fa-4b1a-b8b4-b98a2c18ba29",
            "SiteStatus": 2,
            "SiteUrl": "https://contoso.sharepoint.com/sites/marketing"
        }));
    });

    let mut ctx = connected(&server);
    let request = CreateSiteRequest {
        title: "Marketing".to_string(),
        url: "https://contoso.sharepoint.com/sites/marketing".to_string(),
        lcid: 1033,
        share_by_email_enabled: false,
        classification: String::new(),
        description: String::new(),
        web_template: "SITEPAGEPUBLISHING#0".to_string(),
        site_design_id: "96c933ac-3698-44c7-9f4a-5fd17d71af9e".to_string(),
        owner: "admin@contoso.onmicrosoft.com".to_string(),
    };

    let response = site::create_site(&mut ctx, request).await.unwrap();

    // SiteStatus 2 means the site is ready
    assert_eq!(response.site_status, 2);
    assert_eq!(
        response.site_url,
        "https://contoso.sharepoint.com/sites/marketing"
    );
    create_mock.assert();
}

#[tokio::test]
async fn test_get_site_passes_payload_through() {
    let server = MockServer::start();

    let site_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/_api/site")
            .header("authorization", "Bearer test-access-token");
        then.status(200).json_body(json!({
            "Id": "c9d55e9f-f9fa-4b1a-b8b4-b98a2c18ba29",
            "Url": "https://contoso.sharepoint.com/sites/marketing",
            "ReadOnly": false
        }));
    });

    let mut ctx = connected(&server);
    let web = server.url("");
    let value = site::get_site(&mut ctx, &web).await.unwrap();

    // The shape varies with tenant features, so the payload stays raw JSON
    assert_eq!(
        value["Id"].as_str(),
        Some("c9d55e9f-f9fa-4b1a-b8b4-b98a2c18ba29")
    );
    assert_eq!(value["ReadOnly"].as_bool(), Some(false));
    site_mock.assert();
}

#[tokio::test]
async fn test_odata_error_body_is_mapped() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/_api/site");
        then.status(404).json_body(json!({
            "odata.error": {
                "code": "-2130575338, Microsoft.SharePoint.Client.ResourceNotFoundException",
                "message": {
                    "lang": "en-US",
                    "value": "File Not Found."
                }
            }
        }));
    });

    let mut ctx = connected(&server);
    let web = server.url("");
    let err = site::get_site(&mut ctx, &web).await.unwrap_err();

    match err {
        CommandError::OData { code, message } => {
            assert_eq!(message, "File Not Found.");
            assert!(code.unwrap().contains("ResourceNotFoundException"));
        }
        other => panic!("expected OData error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_throttled_requests_are_retried_a_bounded_number_of_times() {
    let server = MockServer::start();

    let throttle_mock = server.mock(|when, then| {
        when.method(GET).path("/_api/site");
        then.status(429)
            .header("Retry-After", "0")
            .json_body(json!({
                "error": {
                    "message": {
                        "value": "Too many requests. Try again later."
                    }
                }
            }));
    });

    let mut ctx = connected(&server);
    let web = server.url("");
    let err = site::get_site(&mut ctx, &web).await.unwrap_err();

    // Persistent throttling surfaces the server message after the retries
    // are used up
    assert_eq!(err.to_string(), "Too many requests. Try again later.");
    throttle_mock.assert_hits(3);
}

#[tokio::test]
async fn test_bad_gateway_responses_are_retried_a_bounded_number_of_times() {
    let server = MockServer::start();

    let gateway_mock = server.mock(|when, then| {
        when.method(GET).path("/_api/site");
        then.status(502);
    });

    let mut ctx = connected(&server);
    let web = server.url("");
    let err = site::get_site(&mut ctx, &web).await.unwrap_err();

    // A gateway that stays bad is reported by status after the retries are
    // used up
    assert_eq!(err.to_string(), "Request failed with status 502 Bad Gateway");
    gateway_mock.assert_hits(3);
}

#[tokio::test]
async fn test_form_digest_is_cached_per_web() {
    let server = MockServer::start();
    let digest_mock = mock_contextinfo(&server, "0xDIGESTVALUE,23 Aug 2026 10:00:00 -0000");

    let mut ctx = connected(&server);
    let web = server.url("");

    let first = ctx.ensure_form_digest(&web).await.unwrap();
    let second = ctx.ensure_form_digest(&web).await.unwrap();

    assert_eq!(first, "0xDIGESTVALUE,23 Aug 2026 10:00:00 -0000");
    assert_eq!(first, second);

    // One round trip serves both calls until the digest expires
    digest_mock.assert_hits(1);
}

#[test]
fn test_context_classifies_admin_connections() {
    let ctx = SpoContext::new("https://contoso-admin.sharepoint.com", test_token());
    assert!(ctx.is_tenant_admin());

    let ctx = SpoContext::new("https://contoso.sharepoint.com/sites/marketing", test_token());
    assert!(!ctx.is_tenant_admin());
}

#[tokio::test]
async fn test_failed_refresh_reports_sign_in_guidance() {
    // An expired token with no refresh token cannot be renewed
    let token = Token {
        access_token: "stale-access-token".to_string(),
        refresh_token: String::new(),
        scope: "https://contoso.sharepoint.com/.default offline_access".to_string(),
        expires_in: 3600,
        obtained_at: 0,
    };
    let mut ctx = SpoContext::new("https://contoso.sharepoint.com", token);

    let err = ctx.access_token().await.unwrap_err();
    match err {
        CommandError::Auth(message) => {
            assert!(message.contains("Run `spo login"));
        }
        other => panic!("expected auth error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_create_site_design_sends_digest_and_info() {
    let server = MockServer::start();
    let digest_mock = mock_contextinfo(&server, "0xDESIGNDIGEST");

    let design_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/_api/Microsoft.Sharepoint.Utilities.WebTemplateExtensions.SiteScriptUtility.CreateSiteDesign")
            .header("x-requestdigest", "0xDESIGNDIGEST")
            .json_body(json!({
                "info": {
                    "Title": "Marketing sites",
                    "WebTemplate": "68",
                    "SiteScriptIds": ["449c0c6d-5380-4df2-b84b-622e0ac8ec24"],
                    "Description": "Company branding",
                    "PreviewImageUrl": null,
                    "PreviewImageAltText": null,
                    "IsDefault": false
                }
            }));
        then.status(200).json_body(json!({
            "Id": "a9d1bd4d-05e4-43f6-b2ba-4f3abf2ff1aa",
            "Title": "Marketing sites",
            "WebTemplate": "68",
            "SiteScriptIds": ["449c0c6d-5380-4df2-b84b-622e0ac8ec24"],
            "Description": "Company branding",
            "PreviewImageUrl": null,
            "PreviewImageAltText": null,
            "IsDefault": false,
            "Version": 1
        }));
    });

    let mut ctx = connected(&server);
    let info = CreateSiteDesignInfo {
        title: "Marketing sites".to_string(),
        web_template: "68".to_string(),
        site_script_ids: vec!["449c0c6d-5380-4df2-b84b-622e0ac8ec24".to_string()],
        description: Some("Company branding".to_string()),
        preview_image_url: None,
        preview_image_alt_text: None,
        is_default: false,
    };

    let design = sitedesign::create_site_design(&mut ctx, &info).await.unwrap();

    assert_eq!(design.id, "a9d1bd4d-05e4-43f6-b2ba-4f3abf2ff1aa");
    assert_eq!(design.version, 1);
    digest_mock.assert();
    design_mock.assert();
}

#[tokio::test]
async fn test_apply_site_design_reports_action_outcomes() {
    let server = MockServer::start();
    let _digest_mock = mock_contextinfo(&server, "0xAPPLYDIGEST");

    let apply_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/_api/Microsoft.Sharepoint.Utilities.WebTemplateExtensions.SiteScriptUtility.ApplySiteDesign")
            .header("x-requestdigest", "0xAPPLYDIGEST")
            .json_body(json!({
                "siteDesignId": "a9d1bd4d-05e4-43f6-b2ba-4f3abf2ff1aa",
                "webUrl": "https://contoso.sharepoint.com/sites/marketing"
            }));
        then.status(200).json_body(json!({
            "value": [
                {"Title": "Apply theme", "Outcome": 0, "OutcomeText": null},
                {"Title": "Create library", "Outcome": 0, "OutcomeText": null}
            ]
        }));
    });

    let mut ctx = connected(&server);
    let outcomes = sitedesign::apply_site_design(
        &mut ctx,
        "a9d1bd4d-05e4-43f6-b2ba-4f3abf2ff1aa",
        "https://contoso.sharepoint.com/sites/marketing",
    )
    .await
    .unwrap();

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].title.as_deref(), Some("Apply theme"));
    assert_eq!(outcomes[0].outcome, Some(0));
    apply_mock.assert();
}

#[tokio::test]
async fn test_create_site_script_passes_title_as_parameter_alias() {
    let server = MockServer::start();
    let _digest_mock = mock_contextinfo(&server, "0xSCRIPTDIGEST");

    let content = r#"{"actions":[{"verb":"applyTheme","themeName":"Contoso"}],"version":1}"#;

    let script_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/_api/Microsoft.Sharepoint.Utilities.WebTemplateExtensions.SiteScriptUtility.CreateSiteScript(Title=@title)")
            .query_param("@title", "'brand-theme'")
            .header("x-requestdigest", "0xSCRIPTDIGEST")
            .body(content);
        then.status(200).json_body(json!({
            "Id": "449c0c6d-5380-4df2-b84b-622e0ac8ec24",
            "Title": "brand-theme",
            "Description": null,
            "Content": null,
            "Version": 1
        }));
    });

    let mut ctx = connected(&server);
    let script = sitescript::create_site_script(&mut ctx, "brand-theme", content.to_string())
        .await
        .unwrap();

    assert_eq!(script.id, "449c0c6d-5380-4df2-b84b-622e0ac8ec24");
    assert_eq!(script.title, "brand-theme");
    script_mock.assert();
}

#[tokio::test]
async fn test_tenant_app_catalog_url_is_discovered() {
    let server = MockServer::start();

    let settings_mock = server.mock(|when, then| {
        when.method(GET).path("/_api/SP_TenantSettings_Current");
        then.status(200).json_body(json!({
            "CorporateCatalogUrl": "https://contoso.sharepoint.com/sites/appcatalog"
        }));
    });

    let mut ctx = connected(&server);
    let catalog = app::get_tenant_app_catalog_url(&mut ctx).await.unwrap();

    assert_eq!(catalog, "https://contoso.sharepoint.com/sites/appcatalog");
    settings_mock.assert();
}

#[tokio::test]
async fn test_missing_app_catalog_fails_with_guidance() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/_api/SP_TenantSettings_Current");
        then.status(200).json_body(json!({
            "CorporateCatalogUrl": null
        }));
    });

    let mut ctx = connected(&server);
    let err = app::get_tenant_app_catalog_url(&mut ctx).await.unwrap_err();

    assert!(err.to_string().contains("app catalog is not configured"));
}

#[tokio::test]
async fn test_add_app_uploads_package_bytes() {
    let server = MockServer::start();
    let _digest_mock = mock_contextinfo(&server, "0xCATALOGDIGEST");

    let add_mock = server.mock(|when, then| {
        when.method(POST)
            .path_contains("/_api/web/tenantappcatalog/Add(overwrite=true")
            .header("x-requestdigest", "0xCATALOGDIGEST")
            .header("content-type", "application/octet-stream");
        then.status(200).json_body(json!({
            "UniqueId": "1c9fbabd-6c4c-4e5d-9111-9ae35ca7e67c"
        }));
    });

    let mut ctx = connected(&server);
    let catalog = server.url("");
    let added = app::add_app(&mut ctx, &catalog, "spfx-webparts.sppkg", b"PK\x03\x04", true)
        .await
        .unwrap();

    assert_eq!(added.unique_id, "1c9fbabd-6c4c-4e5d-9111-9ae35ca7e67c");
    add_mock.assert();
}

#[tokio::test]
async fn test_list_apps_unwraps_value_array() {
    let server = MockServer::start();

    let list_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/_api/web/tenantappcatalog/AvailableApps");
        then.status(200).json_body(json!({
            "value": [
                {
                    "ID": "1c9fbabd-6c4c-4e5d-9111-9ae35ca7e67c",
                    "Title": "spfx-webparts-client-side-solution",
                    "Deployed": true,
                    "AppCatalogVersion": "1.0.0.0",
                    "InstalledVersion": null,
                    "IsClientSideSolution": true
                },
                {
                    "ID": "7c2b6c53-35a2-4f77-9c6f-23e85a3a6a40",
                    "Title": "intranet-extensions",
                    "Deployed": false,
                    "AppCatalogVersion": null,
                    "InstalledVersion": null,
                    "IsClientSideSolution": true
                }
            ]
        }));
    });

    let mut ctx = connected(&server);
    let catalog = server.url("");
    let apps = app::list_apps(&mut ctx, &catalog).await.unwrap();

    assert_eq!(apps.len(), 2);
    assert_eq!(apps[0].title, "spfx-webparts-client-side-solution");
    assert!(apps[0].deployed);
    assert!(!apps[1].deployed);
    list_mock.assert();
}

#[tokio::test]
async fn test_deploy_app_posts_skip_feature_deployment() {
    let server = MockServer::start();
    let _digest_mock = mock_contextinfo(&server, "0xDEPLOYDIGEST");

    let deploy_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/_api/web/tenantappcatalog/AvailableApps/GetById('1c9fbabd-6c4c-4e5d-9111-9ae35ca7e67c')/deploy")
            .header("x-requestdigest", "0xDEPLOYDIGEST")
            .json_body(json!({"skipFeatureDeployment": true}));
        then.status(200);
    });

    let mut ctx = connected(&server);
    let catalog = server.url("");
    app::deploy_app(
        &mut ctx,
        &catalog,
        "1c9fbabd-6c4c-4e5d-9111-9ae35ca7e67c",
        true,
    )
    .await
    .unwrap();

    deploy_mock.assert();
}

#[tokio::test]
async fn test_get_tenant_property_maps_odata_null_to_none() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET)
            .path("/_api/web/GetStorageEntity('missing-key')");
        then.status(200).json_body(json!({"odata.null": true}));
    });

    let mut ctx = connected(&server);
    let property = tenant::get_tenant_property(&mut ctx, "missing-key")
        .await
        .unwrap();

    // SharePoint answers 200 with odata.null instead of a 404 here
    assert!(property.is_none());
}

#[tokio::test]
async fn test_get_tenant_property_returns_existing_entity() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/_api/web/GetStorageEntity('environment')");
        then.status(200).json_body(json!({
            "Value": "production",
            "Comment": null,
            "Description": "deployment ring"
        }));
    });

    let mut ctx = connected(&server);
    let property = tenant::get_tenant_property(&mut ctx, "environment")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(property.value.as_deref(), Some("production"));
    assert_eq!(property.description.as_deref(), Some("deployment ring"));
    assert!(property.comment.is_none());
}

#[tokio::test]
async fn test_list_tenant_properties_parses_embedded_index() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET)
            .path("/_api/web/AllProperties")
            .query_param("$select", "storageentitiesindex");
        // The index is a JSON document serialized into a string property
        then.status(200).json_body(json!({
            "storageentitiesindex":
                "{\"environment\":{\"Value\":\"production\",\"Comment\":null,\"Description\":\"deployment ring\"},\
                  \"support-mail\":{\"Value\":\"help@contoso.com\",\"Comment\":\"IT desk\",\"Description\":null}}"
        }));
    });

    let mut ctx = connected(&server);
    let catalog = server.url("");
    let index = tenant::list_tenant_properties(&mut ctx, &catalog)
        .await
        .unwrap();

    assert_eq!(index.len(), 2);
    assert_eq!(
        index["environment"].value.as_deref(),
        Some("production")
    );
    assert_eq!(index["support-mail"].comment.as_deref(), Some("IT desk"));
}

#[tokio::test]
async fn test_list_tenant_properties_tolerates_empty_index() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET)
            .path("/_api/web/AllProperties")
            .query_param("$select", "storageentitiesindex");
        then.status(200).json_body(json!({"storageentitiesindex": ""}));
    });

    let mut ctx = connected(&server);
    let catalog = server.url("");
    let index = tenant::list_tenant_properties(&mut ctx, &catalog)
        .await
        .unwrap();

    assert!(index.is_empty());
}

#[tokio::test]
async fn test_process_query_carries_digest_and_envelope() {
    let server = MockServer::start();
    let digest_mock = mock_contextinfo(&server, "0xCSOMDIGEST");

    let query_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/_vti_bin/client.svc/ProcessQuery")
            .header("x-requestdigest", "0xCSOMDIGEST")
            .header("content-type", "text/xml")
            .body_contains("<Identity Id=\"184\" Name=\"op-identity\" />");
        then.status(200)
            .body(r#"[{"SchemaVersion":"15.0.0.0","ErrorInfo":null}]"#);
    });

    let mut ctx = connected(&server);
    let web = server.url("");
    let xml = csom::envelope(
        "<Query Id=\"188\" ObjectPathId=\"184\" />",
        "<Identity Id=\"184\" Name=\"op-identity\" />",
    );
    let body = csom::process_query(&mut ctx, &web, xml).await.unwrap();

    // The raw body comes back for the caller to parse
    assert_eq!(body, r#"[{"SchemaVersion":"15.0.0.0","ErrorInfo":null}]"#);
    digest_mock.assert();
    query_mock.assert();
}

#[tokio::test]
async fn test_wait_for_operation_polls_until_complete() {
    let server = MockServer::start();
    let _digest_mock = mock_contextinfo(&server, "0xPOLLDIGEST");

    let poll_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/_vti_bin/client.svc/ProcessQuery")
            // the identity newline must arrive as a character reference
            .body_contains("Name=\"854d9f70|SpoOperation&#xA;RemoveSite\"");
        then.status(200).json_body(json!([
            {"SchemaVersion": "15.0.0.0", "ErrorInfo": null},
            188,
            {
                "_ObjectIdentity_": "854d9f70|SpoOperation\nRemoveSite",
                "IsComplete": true,
                "PollingInterval": 15000
            }
        ]));
    });

    let mut ctx = connected(&server);
    let web = server.url("");
    let operation = SpoOperation {
        object_identity: "854d9f70|SpoOperation\nRemoveSite".to_string(),
        is_complete: false,
        polling_interval: 5000,
    };

    csom::wait_for_operation(&mut ctx, &web, operation, Duration::from_secs(60))
        .await
        .unwrap();

    // One status round trip flipped the operation to complete
    poll_mock.assert();
}

#[tokio::test]
async fn test_wait_for_operation_gives_up_after_max_wait() {
    let mut ctx = SpoContext::new("https://contoso-admin.sharepoint.com", test_token());
    let operation = SpoOperation {
        object_identity: "854d9f70|SpoOperation".to_string(),
        is_complete: false,
        polling_interval: 5000,
    };

    let err = csom::wait_for_operation(
        &mut ctx,
        "https://contoso-admin.sharepoint.com",
        operation,
        Duration::ZERO,
    )
    .await
    .unwrap_err();

    match err {
        CommandError::OperationTimeout { seconds } => assert_eq!(seconds, 0),
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_wait_for_operation_returns_immediately_when_complete() {
    // No server is running behind this URL; completing without a request is
    // the point
    let mut ctx = SpoContext::new("https://contoso-admin.sharepoint.com", test_token());
    let operation = SpoOperation {
        object_identity: "854d9f70|SpoOperation".to_string(),
        is_complete: true,
        polling_interval: 15000,
    };

    csom::wait_for_operation(
        &mut ctx,
        "https://contoso-admin.sharepoint.com",
        operation,
        Duration::from_secs(60),
    )
    .await
    .unwrap();
}
