use reqwest::Url;
use serde_json::json;

use crate::{
    error::{CommandError, Result},
    sharepoint::{SpoContext, request},
    types::{SiteScript, ValueResponse},
};

fn utility_url(site_url: &str, operation: &str) -> String {
    format!(
        "{}/_api/Microsoft.Sharepoint.Utilities.WebTemplateExtensions.SiteScriptUtility.{}",
        site_url, operation
    )
}

/// Registers a new site script in the tenant.
///
/// The script `content` is the serialized JSON document of script actions
/// and is posted as the raw request body; the title travels as an OData
/// parameter alias in the query string so it survives URL encoding.
pub async fn create_site_script(
    ctx: &mut SpoContext,
    title: &str,
    content: String,
) -> Result<SiteScript> {
    let site = ctx.site_url().to_string();
    let mut url = Url::parse(&utility_url(&site, "CreateSiteScript(Title=@title)"))
        .map_err(|e| CommandError::Usage(format!("Invalid site URL {}: {}", site, e)))?;
    url.query_pairs_mut()
        .append_pair("@title", &format!("'{}'", title.replace('\'', "''")));

    let digest = ctx.ensure_form_digest(&site).await?;
    let token = ctx.access_token().await?;
    request::post_text(&token, url.as_str(), Some(&digest), content).await
}

/// Lists the site scripts registered in the tenant. The returned entries
/// carry metadata only; fetch a single script to get its content.
pub async fn get_site_scripts(ctx: &mut SpoContext) -> Result<Vec<SiteScript>> {
    let site = ctx.site_url().to_string();
    let url = utility_url(&site, "GetSiteScripts");
    let digest = ctx.ensure_form_digest(&site).await?;
    let token = ctx.access_token().await?;
    let response: ValueResponse<SiteScript> =
        request::post_empty(&token, &url, Some(&digest)).await?;
    Ok(response.value)
}

/// Fetches a single site script by id, including its JSON content.
pub async fn get_site_script(ctx: &mut SpoContext, id: &str) -> Result<SiteScript> {
    let site = ctx.site_url().to_string();
    let url = utility_url(&site, "GetSiteScriptMetadata");
    let digest = ctx.ensure_form_digest(&site).await?;
    let token = ctx.access_token().await?;
    request::post_json(&token, &url, Some(&digest), &json!({ "id": id })).await
}

/// Removes a site script from the tenant. Site designs that still
/// reference the script will fail to apply afterwards.
pub async fn delete_site_script(ctx: &mut SpoContext, id: &str) -> Result<()> {
    let site = ctx.site_url().to_string();
    let url = utility_url(&site, "DeleteSiteScript");
    let digest = ctx.ensure_form_digest(&site).await?;
    let token = ctx.access_token().await?;
    request::post_json_unit(&token, &url, Some(&digest), &json!({ "id": id })).await
}
