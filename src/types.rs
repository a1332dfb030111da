use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tabled::Tabled;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

#[derive(Debug, Clone)]
pub struct AuthRequest {
    pub code_verifier: String,
    pub token: Option<Token>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub site_url: String,
    pub tenant: String,
}

/// Response of `POST {web}/_api/contextinfo`; the digest value authorizes
/// subsequent non-idempotent REST calls against that web.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FormDigestInfo {
    pub form_digest_value: String,
    pub form_digest_timeout_seconds: u64,
    pub web_full_url: String,
}

/// First element of every `client.svc/ProcessQuery` response array.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsomHeader {
    pub error_info: Option<CsomErrorInfo>,
    pub trace_correlation_id: Option<String>,
    pub library_version: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsomErrorInfo {
    pub error_message: String,
    pub error_type_name: Option<String>,
    pub trace_correlation_id: Option<String>,
    pub error_code: Option<i64>,
}

/// Long-running tenant operation handle returned by CSOM calls such as
/// `CreateSite` and `RemoveSite`. The identity addresses the operation in
/// follow-up status queries.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SpoOperation {
    #[serde(rename = "_ObjectIdentity_")]
    pub object_identity: String,
    pub is_complete: bool,
    pub polling_interval: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CsomChildItems<T> {
    #[serde(rename = "_Child_Items_")]
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SiteProperties {
    pub title: String,
    pub url: String,
    pub status: Option<String>,
    pub template: Option<String>,
    pub storage_maximum_level: Option<i64>,
    pub storage_warning_level: Option<i64>,
    pub storage_usage: Option<i64>,
    pub sharing_capability: Option<i64>,
    pub webs_count: Option<i64>,
    pub lock_state: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateSiteEnvelope {
    pub request: CreateSiteRequest,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateSiteRequest {
    pub title: String,
    pub url: String,
    pub lcid: u32,
    pub share_by_email_enabled: bool,
    pub classification: String,
    pub description: String,
    pub web_template: String,
    pub site_design_id: String,
    pub owner: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateSiteResponse {
    pub site_id: String,
    pub site_status: i64,
    pub site_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValueResponse<T> {
    pub value: Vec<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SiteDesign {
    pub id: String,
    pub title: String,
    pub web_template: String,
    pub site_script_ids: Vec<String>,
    pub description: Option<String>,
    pub preview_image_url: Option<String>,
    pub preview_image_alt_text: Option<String>,
    pub is_default: bool,
    pub version: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateSiteDesignInfo {
    pub title: String,
    pub web_template: String,
    pub site_script_ids: Vec<String>,
    pub description: Option<String>,
    pub preview_image_url: Option<String>,
    pub preview_image_alt_text: Option<String>,
    pub is_default: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SiteDesignActionOutcome {
    pub title: Option<String>,
    pub outcome: Option<i64>,
    pub outcome_text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SiteScript {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub version: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AppMetadata {
    #[serde(rename = "ID")]
    pub id: String,
    pub title: String,
    pub deployed: bool,
    pub app_catalog_version: Option<String>,
    pub installed_version: Option<String>,
    pub is_client_side_solution: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AddedApp {
    pub unique_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TenantSettings {
    pub corporate_catalog_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TenantProperty {
    pub value: Option<String>,
    pub comment: Option<String>,
    pub description: Option<String>,
}

/// `GET {web}/_api/web/AllProperties?$select=storageentitiesindex`; the index
/// is a JSON map serialized into a string property.
#[derive(Debug, Clone, Deserialize)]
pub struct WebAllProperties {
    #[serde(rename = "storageentitiesindex")]
    pub storage_entities_index: Option<String>,
}

pub type TenantPropertyIndex = HashMap<String, TenantProperty>;

#[derive(Tabled)]
pub struct AppTableRow {
    pub id: String,
    pub title: String,
    pub deployed: bool,
    pub version: String,
}

#[derive(Tabled)]
pub struct SiteTableRow {
    pub url: String,
    pub title: String,
    pub template: String,
    pub status: String,
}

#[derive(Tabled)]
pub struct SiteDesignTableRow {
    pub id: String,
    pub title: String,
    pub web_template: String,
    pub is_default: bool,
    pub version: i64,
}

#[derive(Tabled)]
pub struct SiteScriptTableRow {
    pub id: String,
    pub title: String,
    pub version: i64,
}

#[derive(Tabled)]
pub struct TenantPropertyTableRow {
    pub key: String,
    pub value: String,
    pub description: String,
}
