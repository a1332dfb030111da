use serde_json::json;

use crate::{
    error::Result,
    sharepoint::{SpoContext, request},
    types::{CreateSiteDesignInfo, SiteDesign, SiteDesignActionOutcome, ValueResponse},
};

fn utility_url(site_url: &str, operation: &str) -> String {
    format!(
        "{}/_api/Microsoft.Sharepoint.Utilities.WebTemplateExtensions.SiteScriptUtility.{}",
        site_url, operation
    )
}

/// Maps a site design target template name to the value
/// `CreateSiteDesign` expects.
pub fn web_template_value(name: &str) -> Option<&'static str> {
    match name {
        "TeamSite" => Some("64"),
        "CommunicationSite" => Some("68"),
        _ => None,
    }
}

/// Registers a new site design in the tenant.
///
/// The design references previously registered site scripts by id and is
/// offered on the site creation page for the chosen web template. Answers
/// with the stored design, including its server-assigned id and version.
pub async fn create_site_design(
    ctx: &mut SpoContext,
    info: &CreateSiteDesignInfo,
) -> Result<SiteDesign> {
    let site = ctx.site_url().to_string();
    let url = utility_url(&site, "CreateSiteDesign");
    let digest = ctx.ensure_form_digest(&site).await?;
    let token = ctx.access_token().await?;
    request::post_json(&token, &url, Some(&digest), &json!({ "info": info })).await
}

/// Lists the site designs registered in the tenant.
pub async fn get_site_designs(ctx: &mut SpoContext) -> Result<Vec<SiteDesign>> {
    let site = ctx.site_url().to_string();
    let url = utility_url(&site, "GetSiteDesigns");
    let digest = ctx.ensure_form_digest(&site).await?;
    let token = ctx.access_token().await?;
    let response: ValueResponse<SiteDesign> =
        request::post_empty(&token, &url, Some(&digest)).await?;
    Ok(response.value)
}

/// Fetches a single site design by id, including the script ids it
/// references.
pub async fn get_site_design(ctx: &mut SpoContext, id: &str) -> Result<SiteDesign> {
    let site = ctx.site_url().to_string();
    let url = utility_url(&site, "GetSiteDesignMetadata");
    let digest = ctx.ensure_form_digest(&site).await?;
    let token = ctx.access_token().await?;
    request::post_json(&token, &url, Some(&digest), &json!({ "id": id })).await
}

/// Removes a site design from the tenant. Site scripts referenced by the
/// design stay registered.
pub async fn delete_site_design(ctx: &mut SpoContext, id: &str) -> Result<()> {
    let site = ctx.site_url().to_string();
    let url = utility_url(&site, "DeleteSiteDesign");
    let digest = ctx.ensure_form_digest(&site).await?;
    let token = ctx.access_token().await?;
    request::post_json_unit(&token, &url, Some(&digest), &json!({ "id": id })).await
}

/// Applies a site design to an existing site and reports the outcome of
/// each script action that ran.
pub async fn apply_site_design(
    ctx: &mut SpoContext,
    site_design_id: &str,
    web_url: &str,
) -> Result<Vec<SiteDesignActionOutcome>> {
    let site = ctx.site_url().to_string();
    let url = utility_url(&site, "ApplySiteDesign");
    let digest = ctx.ensure_form_digest(&site).await?;
    let token = ctx.access_token().await?;
    let response: ValueResponse<SiteDesignActionOutcome> = request::post_json(
        &token,
        &url,
        Some(&digest),
        &json!({ "siteDesignId": site_design_id, "webUrl": web_url }),
    )
    .await?;
    Ok(response.value)
}
