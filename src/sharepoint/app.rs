use serde_json::json;

use crate::{
    error::{CommandError, Result},
    sharepoint::{SpoContext, request},
    types::{AddedApp, AppMetadata, TenantSettings, ValueResponse},
};

/// Discovers the tenant app catalog site through the
/// `SP_TenantSettings_Current` endpoint of the connected site.
///
/// Fails with guidance when no catalog is provisioned in the tenant, since
/// every app operation below needs one.
pub async fn get_tenant_app_catalog_url(ctx: &mut SpoContext) -> Result<String> {
    let token = ctx.access_token().await?;
    let url = format!("{}/_api/SP_TenantSettings_Current", ctx.site_url());
    let settings: TenantSettings = request::get_json(&token, &url).await?;

    match settings.corporate_catalog_url {
        Some(catalog) if !catalog.is_empty() => Ok(catalog),
        _ => Err(CommandError::Usage(String::from(
            "Tenant app catalog is not configured. Provision one in the SharePoint admin center first.",
        ))),
    }
}

/// Uploads a `.sppkg` package into the tenant app catalog.
///
/// The file bytes go up as the raw request body; `name` becomes the file
/// name in the catalog's app library. With `overwrite` unset the catalog
/// rejects a package that already exists.
pub async fn add_app(
    ctx: &mut SpoContext,
    catalog_url: &str,
    name: &str,
    bytes: &[u8],
    overwrite: bool,
) -> Result<AddedApp> {
    let digest = ctx.ensure_form_digest(catalog_url).await?;
    let token = ctx.access_token().await?;
    let url = format!(
        "{}/_api/web/tenantappcatalog/Add(overwrite={}, url='{}')",
        catalog_url,
        overwrite,
        name.replace('\'', "''")
    );
    request::post_binary(&token, &url, Some(&digest), bytes).await
}

/// Lists the apps available in the tenant app catalog.
pub async fn list_apps(ctx: &mut SpoContext, catalog_url: &str) -> Result<Vec<AppMetadata>> {
    let token = ctx.access_token().await?;
    let url = format!("{}/_api/web/tenantappcatalog/AvailableApps", catalog_url);
    let response: ValueResponse<AppMetadata> = request::get_json(&token, &url).await?;
    Ok(response.value)
}

/// Fetches a single app from the tenant app catalog by its id.
pub async fn get_app(ctx: &mut SpoContext, catalog_url: &str, id: &str) -> Result<AppMetadata> {
    let token = ctx.access_token().await?;
    let url = format!(
        "{}/_api/web/tenantappcatalog/AvailableApps/GetById('{}')",
        catalog_url, id
    );
    request::get_json(&token, &url).await
}

/// Deploys an app in the tenant app catalog, making it installable on
/// sites. With `skip_feature_deployment` the app is made available
/// tenant-wide without per-site installation, provided the package allows
/// it.
pub async fn deploy_app(
    ctx: &mut SpoContext,
    catalog_url: &str,
    id: &str,
    skip_feature_deployment: bool,
) -> Result<()> {
    let digest = ctx.ensure_form_digest(catalog_url).await?;
    let token = ctx.access_token().await?;
    let url = format!(
        "{}/_api/web/tenantappcatalog/AvailableApps/GetById('{}')/deploy",
        catalog_url, id
    );
    request::post_json_unit(
        &token,
        &url,
        Some(&digest),
        &json!({ "skipFeatureDeployment": skip_feature_deployment }),
    )
    .await
}

/// Removes an app from the tenant app catalog.
pub async fn remove_app(ctx: &mut SpoContext, catalog_url: &str, id: &str) -> Result<()> {
    let digest = ctx.ensure_form_digest(catalog_url).await?;
    let token = ctx.access_token().await?;
    let url = format!(
        "{}/_api/web/tenantappcatalog/AvailableApps/GetById('{}')/remove",
        catalog_url, id
    );
    request::post_unit(&token, &url, Some(&digest)).await
}
