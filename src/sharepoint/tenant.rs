use serde_json::Value;

use crate::{
    error::Result,
    sharepoint::{SpoContext, csom, request},
    types::{TenantProperty, TenantPropertyIndex, WebAllProperties},
};

/// Lists all tenant properties (storage entities).
///
/// The entities live serialized as one JSON document inside the
/// `storageentitiesindex` web property of the app catalog root web; an
/// absent or empty index means no properties have been set yet.
pub async fn list_tenant_properties(
    ctx: &mut SpoContext,
    catalog_url: &str,
) -> Result<TenantPropertyIndex> {
    let token = ctx.access_token().await?;
    let url = format!(
        "{}/_api/web/AllProperties?$select=storageentitiesindex",
        catalog_url
    );
    let properties: WebAllProperties = request::get_json(&token, &url).await?;

    match properties.storage_entities_index {
        Some(index) if !index.is_empty() => Ok(serde_json::from_str(&index)?),
        _ => Ok(TenantPropertyIndex::new()),
    }
}

/// Reads a single tenant property by key through the connected site.
///
/// SharePoint answers with `{"odata.null": true}` instead of a 404 when
/// the key does not exist, which is mapped to `None` here.
pub async fn get_tenant_property(
    ctx: &mut SpoContext,
    key: &str,
) -> Result<Option<TenantProperty>> {
    let token = ctx.access_token().await?;
    let url = format!(
        "{}/_api/web/GetStorageEntity('{}')",
        ctx.site_url(),
        key.replace('\'', "''")
    );
    let value: Value = request::get_json(&token, &url).await?;

    if value.get("odata.null").and_then(Value::as_bool) == Some(true) {
        return Ok(None);
    }

    Ok(Some(serde_json::from_value(value)?))
}

/// Sets a tenant property, creating or overwriting it.
///
/// Writes go through the tenant administration CSOM API: the batch walks
/// `Tenant.GetSiteByUrl(appCatalog).RootWeb` and invokes
/// `SetStorageEntity` on it. The operation completes synchronously; a
/// batch without `ErrorInfo` in its response header is success.
pub async fn set_tenant_property(
    ctx: &mut SpoContext,
    catalog_url: &str,
    key: &str,
    value: &str,
    description: Option<&str>,
    comment: Option<&str>,
) -> Result<()> {
    let admin_url = ctx.admin_url()?;

    let xml = csom::envelope(
        &format!(
            "<ObjectPath Id=\"24\" ObjectPathId=\"23\" /><ObjectPath Id=\"26\" ObjectPathId=\"25\" />\
             <ObjectPath Id=\"28\" ObjectPathId=\"27\" /><Method Name=\"SetStorageEntity\" Id=\"29\" \
             ObjectPathId=\"27\"><Parameters><Parameter Type=\"String\">{key}</Parameter>\
             <Parameter Type=\"String\">{value}</Parameter>\
             <Parameter Type=\"String\">{description}</Parameter>\
             <Parameter Type=\"String\">{comment}</Parameter></Parameters></Method>",
            key = csom::xml_escape(key),
            value = csom::xml_escape(value),
            description = csom::xml_escape(description.unwrap_or_default()),
            comment = csom::xml_escape(comment.unwrap_or_default()),
        ),
        &format!(
            "<Constructor Id=\"23\" TypeId=\"{tenant}\" /><Method Id=\"25\" ParentId=\"23\" \
             Name=\"GetSiteByUrl\"><Parameters><Parameter Type=\"String\">{catalog}</Parameter>\
             </Parameters></Method><Property Id=\"27\" ParentId=\"25\" Name=\"RootWeb\" />",
            tenant = csom::TENANT_TYPE_ID,
            catalog = csom::xml_escape(catalog_url),
        ),
    );

    let body = csom::process_query(ctx, &admin_url, xml).await?;
    csom::parse_response(&body)?;
    Ok(())
}

/// Removes a tenant property by key, through the same
/// `Tenant.GetSiteByUrl(appCatalog).RootWeb` walk as
/// [`set_tenant_property`]. Removing a key that does not exist succeeds.
pub async fn remove_tenant_property(
    ctx: &mut SpoContext,
    catalog_url: &str,
    key: &str,
) -> Result<()> {
    let admin_url = ctx.admin_url()?;

    let xml = csom::envelope(
        &format!(
            "<ObjectPath Id=\"24\" ObjectPathId=\"23\" /><ObjectPath Id=\"26\" ObjectPathId=\"25\" />\
             <ObjectPath Id=\"28\" ObjectPathId=\"27\" /><Method Name=\"RemoveStorageEntity\" Id=\"29\" \
             ObjectPathId=\"27\"><Parameters><Parameter Type=\"String\">{key}</Parameter>\
             </Parameters></Method>",
            key = csom::xml_escape(key),
        ),
        &format!(
            "<Constructor Id=\"23\" TypeId=\"{tenant}\" /><Method Id=\"25\" ParentId=\"23\" \
             Name=\"GetSiteByUrl\"><Parameters><Parameter Type=\"String\">{catalog}</Parameter>\
             </Parameters></Method><Property Id=\"27\" ParentId=\"25\" Name=\"RootWeb\" />",
            tenant = csom::TENANT_TYPE_ID,
            catalog = csom::xml_escape(catalog_url),
        ),
    );

    let body = csom::process_query(ctx, &admin_url, xml).await?;
    csom::parse_response(&body)?;
    Ok(())
}
