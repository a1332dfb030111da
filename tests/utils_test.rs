use spocli::utils::*;

#[test]
fn test_generate_code_verifier() {
    let verifier = generate_code_verifier();

    // Should be exactly 128 characters
    assert_eq!(verifier.len(), 128);

    // Should contain only alphanumeric characters
    assert!(verifier.chars().all(|c| c.is_ascii_alphanumeric()));

    // Two generated verifiers should be different
    let verifier2 = generate_code_verifier();
    assert_ne!(verifier, verifier2);
}

#[test]
fn test_generate_code_challenge() {
    let verifier = "test_verifier_123";
    let challenge = generate_code_challenge(verifier);

    // Should not be empty
    assert!(!challenge.is_empty());

    // Should be deterministic - same input produces same output
    let challenge2 = generate_code_challenge(verifier);
    assert_eq!(challenge, challenge2);

    // Different input should produce different output
    let challenge3 = generate_code_challenge("different_verifier");
    assert_ne!(challenge, challenge3);

    // Should be base64-encoded (URL-safe, no padding)
    assert!(
        challenge
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    );
}

#[test]
fn test_normalize_site_url_accepts_https() {
    let result = normalize_site_url("https://contoso.sharepoint.com/sites/marketing").unwrap();
    assert_eq!(result, "https://contoso.sharepoint.com/sites/marketing");

    // Root site without a path
    let result = normalize_site_url("https://contoso.sharepoint.com").unwrap();
    assert_eq!(result, "https://contoso.sharepoint.com");
}

#[test]
fn test_normalize_site_url_strips_trailing_slash() {
    let result = normalize_site_url("https://contoso.sharepoint.com/sites/marketing/").unwrap();
    assert_eq!(result, "https://contoso.sharepoint.com/sites/marketing");

    // Surrounding whitespace is dropped too
    let result = normalize_site_url("  https://contoso.sharepoint.com/  ").unwrap();
    assert_eq!(result, "https://contoso.sharepoint.com");
}

#[test]
fn test_normalize_site_url_rejects_invalid_input() {
    // Plain http is not accepted
    let result = normalize_site_url("http://contoso.sharepoint.com");
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("not a valid https URL"));

    // Missing scheme entirely
    assert!(normalize_site_url("contoso.sharepoint.com").is_err());

    // Scheme but no host
    let result = normalize_site_url("https://");
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("missing a host name"));
}

#[test]
fn test_admin_url_derivation() {
    // Regular site URL maps to the -admin host
    assert_eq!(
        admin_url("https://contoso.sharepoint.com/sites/marketing"),
        Some("https://contoso-admin.sharepoint.com".to_string())
    );

    // Root site URL works the same way
    assert_eq!(
        admin_url("https://contoso.sharepoint.com"),
        Some("https://contoso-admin.sharepoint.com".to_string())
    );

    // An admin URL maps to itself
    assert_eq!(
        admin_url("https://contoso-admin.sharepoint.com"),
        Some("https://contoso-admin.sharepoint.com".to_string())
    );
}

#[test]
fn test_admin_url_rejects_hosts_without_tenant_label() {
    // Single-label hosts have nothing to suffix
    assert_eq!(admin_url("https://localhost"), None);

    // IP addresses are not tenant hosts
    assert_eq!(admin_url("https://127.0.0.1"), None);

    // Non-https input is rejected outright
    assert_eq!(admin_url("http://contoso.sharepoint.com"), None);
}

#[test]
fn test_is_tenant_admin_url() {
    assert!(is_tenant_admin_url("https://contoso-admin.sharepoint.com"));
    assert!(!is_tenant_admin_url(
        "https://contoso.sharepoint.com/sites/marketing"
    ));
    assert!(!is_tenant_admin_url("https://localhost"));
    assert!(!is_tenant_admin_url("not a url"));
}

#[test]
fn test_is_guid_accepts_canonical_forms() {
    assert!(is_guid("6142d2a0-63a5-4ba0-aede-d9fefca2c767"));

    // Braced form used by CSOM identities
    assert!(is_guid("{6142d2a0-63a5-4ba0-aede-d9fefca2c767}"));

    // Uppercase hex digits
    assert!(is_guid("6142D2A0-63A5-4BA0-AEDE-D9FEFCA2C767"));

    // The nil guid is still a guid
    assert!(is_guid("00000000-0000-0000-0000-000000000000"));
}

#[test]
fn test_is_guid_rejects_malformed_values() {
    // Wrong group lengths
    assert!(!is_guid("6142d2a0-63a5-4ba0-aede-d9fefca2c7"));
    assert!(!is_guid("6142d2a0-63a5-4ba0-aede-d9fefca2c76799"));

    // Wrong group count
    assert!(!is_guid("6142d2a0-63a5-4ba0-d9fefca2c767"));

    // Non-hex characters
    assert!(!is_guid("6142d2g0-63a5-4ba0-aede-d9fefca2c767"));

    // Unbalanced braces
    assert!(!is_guid("{6142d2a0-63a5-4ba0-aede-d9fefca2c767"));

    // Not a guid at all
    assert!(!is_guid(""));
    assert!(!is_guid("sitedesign"));
}
