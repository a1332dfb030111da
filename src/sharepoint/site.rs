use serde_json::Value;

use crate::{
    error::Result,
    sharepoint::{SpoContext, csom, request},
    types::{
        CreateSiteEnvelope, CreateSiteRequest, CreateSiteResponse, CsomChildItems, SiteProperties,
        SpoOperation,
    },
};

/// CSOM type id of the `SiteCreationProperties` parameter passed to
/// `Tenant.CreateSite`.
const SITE_CREATION_PROPERTIES_TYPE_ID: &str = "{11f84fff-b8cf-47b6-8b50-34e692656606}";

/// CSOM type id of the `SPOSitePropertiesEnumerableFilter` parameter passed
/// to `Tenant.GetSitePropertiesFromSharePointByFilters`.
const SITE_FILTER_TYPE_ID: &str = "{b92aeee2-c92c-4b67-abcc-024e471bc140}";

/// Parameters for a classic site collection, fed into `Tenant.CreateSite`.
pub struct ClassicSiteOptions {
    pub url: String,
    pub title: String,
    pub owner: String,
    pub template: String,
    pub time_zone: i32,
    pub lcid: u32,
    pub storage_quota: i64,
    pub storage_quota_warning: i64,
    pub resource_quota: f64,
    pub resource_quota_warning: f64,
}

/// Property updates for a classic site collection. Only set fields are
/// written; `apply` with no field set is rejected at the command layer.
#[derive(Default)]
pub struct ClassicSiteUpdates {
    pub title: Option<String>,
    pub sharing: Option<String>,
    pub storage_quota: Option<i64>,
    pub storage_quota_warning: Option<i64>,
    pub resource_quota: Option<f64>,
    pub resource_quota_warning: Option<f64>,
    pub allow_self_service_upgrade: Option<bool>,
    pub lock_state: Option<String>,
    pub no_script: Option<bool>,
}

impl ClassicSiteUpdates {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.sharing.is_none()
            && self.storage_quota.is_none()
            && self.storage_quota_warning.is_none()
            && self.resource_quota.is_none()
            && self.resource_quota_warning.is_none()
            && self.allow_self_service_upgrade.is_none()
            && self.lock_state.is_none()
            && self.no_script.is_none()
    }
}

/// Maps a sharing capability name to its CSOM enum value.
pub fn sharing_capability_value(name: &str) -> Option<u8> {
    match name {
        "Disabled" => Some(0),
        "ExternalUserSharingOnly" => Some(1),
        "ExternalUserAndGuestSharing" => Some(2),
        "ExistingExternalUserSharingOnly" => Some(3),
        _ => None,
    }
}

/// Creates a modern (team or communication) site collection through the
/// `SPSiteManager` REST endpoint of the connected site.
///
/// Unlike classic site creation this endpoint is synchronous from the
/// caller's point of view: the response carries a `SiteStatus` that tells
/// whether the site is already usable (2), still provisioning (1) or
/// failed (3).
pub async fn create_site(
    ctx: &mut SpoContext,
    request_body: CreateSiteRequest,
) -> Result<CreateSiteResponse> {
    let token = ctx.access_token().await?;
    let url = format!("{}/_api/SPSiteManager/Create", ctx.site_url());
    request::post_json(
        &token,
        &url,
        None,
        &CreateSiteEnvelope {
            request: request_body,
        },
    )
    .await
}

/// Fetches the site collection properties of `site_url` via `/_api/site`.
///
/// The endpoint's shape varies with tenant features, so the payload is
/// passed through as raw JSON instead of a fixed DTO.
pub async fn get_site(ctx: &mut SpoContext, site_url: &str) -> Result<Value> {
    let token = ctx.access_token().await?;
    let url = format!("{}/_api/site", site_url);
    request::get_json(&token, &url).await
}

/// Provisions a classic site collection through the tenant administration
/// CSOM API.
///
/// `Tenant.CreateSite` queues the creation server-side and answers with a
/// deferred operation handle; pass that to
/// [`csom::wait_for_operation`](super::csom::wait_for_operation) to block
/// until the site exists.
pub async fn create_classic_site(
    ctx: &mut SpoContext,
    options: &ClassicSiteOptions,
) -> Result<SpoOperation> {
    let admin_url = ctx.admin_url()?;

    let properties = format!(
        "<Property Name=\"CompatibilityLevel\" Type=\"Int32\">0</Property>\
         <Property Name=\"Lcid\" Type=\"UInt32\">{lcid}</Property>\
         <Property Name=\"Owner\" Type=\"String\">{owner}</Property>\
         <Property Name=\"StorageMaximumLevel\" Type=\"Int64\">{storage_quota}</Property>\
         <Property Name=\"StorageWarningLevel\" Type=\"Int64\">{storage_warning}</Property>\
         <Property Name=\"Template\" Type=\"String\">{template}</Property>\
         <Property Name=\"TimeZoneId\" Type=\"Int32\">{time_zone}</Property>\
         <Property Name=\"Title\" Type=\"String\">{title}</Property>\
         <Property Name=\"Url\" Type=\"String\">{url}</Property>\
         <Property Name=\"UserCodeMaximumLevel\" Type=\"Double\">{resource_quota}</Property>\
         <Property Name=\"UserCodeWarningLevel\" Type=\"Double\">{resource_warning}</Property>",
        lcid = options.lcid,
        owner = csom::xml_escape(&options.owner),
        storage_quota = options.storage_quota,
        storage_warning = options.storage_quota_warning,
        template = csom::xml_escape(&options.template),
        time_zone = options.time_zone,
        title = csom::xml_escape(&options.title),
        url = csom::xml_escape(&options.url),
        resource_quota = options.resource_quota,
        resource_warning = options.resource_quota_warning,
    );

    let xml = csom::envelope(
        "<ObjectPath Id=\"4\" ObjectPathId=\"3\" /><ObjectPath Id=\"6\" ObjectPathId=\"5\" />\
         <Query Id=\"7\" ObjectPathId=\"3\"><Query SelectAllProperties=\"true\"><Properties />\
         </Query></Query><Query Id=\"8\" ObjectPathId=\"5\"><Query SelectAllProperties=\"false\">\
         <Properties><Property Name=\"PollingInterval\" ScalarProperty=\"true\" />\
         <Property Name=\"IsComplete\" ScalarProperty=\"true\" /></Properties></Query></Query>",
        &format!(
            "<Constructor Id=\"3\" TypeId=\"{tenant}\" /><Method Id=\"5\" ParentId=\"3\" \
             Name=\"CreateSite\"><Parameters><Parameter TypeId=\"{creation}\">{properties}\
             </Parameter></Parameters></Method>",
            tenant = csom::TENANT_TYPE_ID,
            creation = SITE_CREATION_PROPERTIES_TYPE_ID,
        ),
    );

    let body = csom::process_query(ctx, &admin_url, xml).await?;
    csom::payload(&body)
}

/// Updates properties of a classic site collection.
///
/// The batch resolves the site through `Tenant.GetSitePropertiesByUrl`,
/// applies one `SetProperty` per requested change and commits with
/// `Update`, which again answers with a deferred operation handle.
pub async fn update_classic_site(
    ctx: &mut SpoContext,
    site_url: &str,
    updates: &ClassicSiteUpdates,
) -> Result<SpoOperation> {
    let admin_url = ctx.admin_url()?;

    let mut actions =
        String::from("<ObjectPath Id=\"2\" ObjectPathId=\"1\" /><ObjectPath Id=\"4\" ObjectPathId=\"3\" />");
    let mut id = 5u32;
    let mut set_property = |name: &str, value_type: &str, value: String| {
        actions.push_str(&format!(
            "<SetProperty Id=\"{id}\" ObjectPathId=\"3\" Name=\"{name}\">\
             <Parameter Type=\"{value_type}\">{value}</Parameter></SetProperty>"
        ));
        id += 1;
    };

    if let Some(title) = &updates.title {
        set_property("Title", "String", csom::xml_escape(title));
    }
    if let Some(sharing) = &updates.sharing {
        if let Some(value) = sharing_capability_value(sharing) {
            set_property("SharingCapability", "Enum", value.to_string());
        }
    }
    if let Some(quota) = updates.storage_quota {
        set_property("StorageMaximumLevel", "Int64", quota.to_string());
    }
    if let Some(warning) = updates.storage_quota_warning {
        set_property("StorageWarningLevel", "Int64", warning.to_string());
    }
    if let Some(quota) = updates.resource_quota {
        set_property("UserCodeMaximumLevel", "Double", quota.to_string());
    }
    if let Some(warning) = updates.resource_quota_warning {
        set_property("UserCodeWarningLevel", "Double", warning.to_string());
    }
    if let Some(allow) = updates.allow_self_service_upgrade {
        set_property("AllowSelfServiceUpgrade", "Boolean", allow.to_string());
    }
    if let Some(lock_state) = &updates.lock_state {
        set_property("LockState", "String", csom::xml_escape(lock_state));
    }
    if let Some(no_script) = updates.no_script {
        let value = if no_script { 2 } else { 1 };
        set_property("DenyAddAndCustomizePages", "Enum", value.to_string());
    }

    actions.push_str(&format!(
        "<ObjectPath Id=\"{id}\" ObjectPathId=\"5\" />",
    ));
    id += 1;
    actions.push_str(&format!(
        "<Query Id=\"{id}\" ObjectPathId=\"5\"><Query SelectAllProperties=\"false\"><Properties>\
         <Property Name=\"PollingInterval\" ScalarProperty=\"true\" />\
         <Property Name=\"IsComplete\" ScalarProperty=\"true\" /></Properties></Query></Query>",
    ));

    let object_paths = format!(
        "<Constructor Id=\"1\" TypeId=\"{tenant}\" /><Method Id=\"3\" ParentId=\"1\" \
         Name=\"GetSitePropertiesByUrl\"><Parameters><Parameter Type=\"String\">{url}</Parameter>\
         <Parameter Type=\"Boolean\">true</Parameter></Parameters></Method>\
         <Method Id=\"5\" ParentId=\"3\" Name=\"Update\" />",
        tenant = csom::TENANT_TYPE_ID,
        url = csom::xml_escape(site_url),
    );

    let xml = csom::envelope(&actions, &object_paths);
    let body = csom::process_query(ctx, &admin_url, xml).await?;
    csom::payload(&body)
}

/// Lists classic site collections in the tenant, optionally narrowed by an
/// URL substring filter and a web template name.
pub async fn list_classic_sites(
    ctx: &mut SpoContext,
    filter: Option<&str>,
    template: Option<&str>,
) -> Result<Vec<SiteProperties>> {
    let admin_url = ctx.admin_url()?;

    let filter_property = match filter {
        Some(filter) => format!(
            "<Property Name=\"Filter\" Type=\"String\">{}</Property>",
            csom::xml_escape(filter)
        ),
        None => String::from("<Property Name=\"Filter\" Type=\"Null\" />"),
    };
    let template_property = match template {
        Some(template) => format!(
            "<Property Name=\"Template\" Type=\"String\">{}</Property>",
            csom::xml_escape(template)
        ),
        None => String::from("<Property Name=\"Template\" Type=\"Null\" />"),
    };

    let xml = csom::envelope(
        "<ObjectPath Id=\"2\" ObjectPathId=\"1\" /><ObjectPath Id=\"4\" ObjectPathId=\"3\" />\
         <Query Id=\"5\" ObjectPathId=\"3\"><Query SelectAllProperties=\"true\"><Properties />\
         </Query><ChildItemQuery SelectAllProperties=\"true\"><Properties /></ChildItemQuery>\
         </Query>",
        &format!(
            "<Constructor Id=\"1\" TypeId=\"{tenant}\" /><Method Id=\"3\" ParentId=\"1\" \
             Name=\"GetSitePropertiesFromSharePointByFilters\"><Parameters>\
             <Parameter TypeId=\"{filter_type}\">{filter_property}\
             <Property Name=\"IncludeDetail\" Type=\"Boolean\">true</Property>\
             <Property Name=\"IncludePersonalSite\" Type=\"Enum\">0</Property>\
             <Property Name=\"StartIndex\" Type=\"String\">0</Property>{template_property}\
             </Parameter></Parameters></Method>",
            tenant = csom::TENANT_TYPE_ID,
            filter_type = SITE_FILTER_TYPE_ID,
        ),
    );

    let body = csom::process_query(ctx, &admin_url, xml).await?;
    let enumerable: CsomChildItems<SiteProperties> = csom::payload(&body)?;
    Ok(enumerable.items)
}

/// Deletes a classic site collection through `Tenant.RemoveSite`, which
/// moves it to the tenant recycle bin and answers with a deferred
/// operation handle.
pub async fn remove_classic_site(ctx: &mut SpoContext, site_url: &str) -> Result<SpoOperation> {
    let admin_url = ctx.admin_url()?;

    let xml = csom::envelope(
        "<ObjectPath Id=\"4\" ObjectPathId=\"3\" /><ObjectPath Id=\"6\" ObjectPathId=\"5\" />\
         <Query Id=\"7\" ObjectPathId=\"5\"><Query SelectAllProperties=\"false\"><Properties>\
         <Property Name=\"PollingInterval\" ScalarProperty=\"true\" />\
         <Property Name=\"IsComplete\" ScalarProperty=\"true\" /></Properties></Query></Query>",
        &format!(
            "<Constructor Id=\"3\" TypeId=\"{tenant}\" /><Method Id=\"5\" ParentId=\"3\" \
             Name=\"RemoveSite\"><Parameters><Parameter Type=\"String\">{url}</Parameter>\
             </Parameters></Method>",
            tenant = csom::TENANT_TYPE_ID,
            url = csom::xml_escape(site_url),
        ),
    );

    let body = csom::process_query(ctx, &admin_url, xml).await?;
    csom::payload(&body)
}
