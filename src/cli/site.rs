use std::time::Duration;

use tabled::Table;

use crate::{
    cli, config, error, info,
    sharepoint::{
        self, SpoContext, csom,
        site::{ClassicSiteOptions, ClassicSiteUpdates},
    },
    success,
    types::{CreateSiteRequest, SiteTableRow, SpoOperation},
    utils, warning,
};

// Built-in site designs offered for communication sites.
const DESIGN_TOPIC: &str = "96c933ac-3698-44c7-9f4a-5fd17d71af9e";
const DESIGN_SHOWCASE: &str = "6142d2a0-63a5-4ba0-aede-d9fefca2c767";
const DESIGN_BLANK: &str = "f6cc5403-0d63-442e-96c0-285923709ffc";

const NIL_GUID: &str = "00000000-0000-0000-0000-000000000000";

pub struct SiteAddArgs {
    pub site_type: String,
    pub url: String,
    pub title: String,
    pub owner: String,
    pub description: Option<String>,
    pub classification: Option<String>,
    pub lcid: u32,
    pub share_by_email: bool,
    pub site_design: Option<String>,
    pub site_design_id: Option<String>,
}

pub struct ClassicAddArgs {
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
    pub wait: bool,
}

pub struct ClassicSetArgs {
    pub url: String,
    pub title: Option<String>,
    pub sharing: Option<String>,
    pub storage_quota: Option<i64>,
    pub storage_quota_warning: Option<i64>,
    pub resource_quota: Option<f64>,
    pub resource_quota_warning: Option<f64>,
    pub allow_self_service_upgrade: Option<bool>,
    pub lock_state: Option<String>,
    pub no_script: Option<bool>,
    pub wait: bool,
}

pub async fn add(args: SiteAddArgs) {
    let url = match utils::normalize_site_url(&args.url) {
        Ok(url) => url,
        Err(e) => error!("{}", e),
    };

    let (web_template, site_design_id) = match args.site_type.as_str() {
        "TeamSite" => (String::from("STS#3"), String::from(NIL_GUID)),
        "CommunicationSite" => {
            let design_id = if let Some(id) = args.site_design_id {
                if !utils::is_guid(&id) {
                    error!("{} is not a valid site design id (GUID).", id);
                }
                id
            } else {
                match args.site_design.as_deref() {
                    None | Some("Topic") => String::from(DESIGN_TOPIC),
                    Some("Showcase") => String::from(DESIGN_SHOWCASE),
                    Some("Blank") => String::from(DESIGN_BLANK),
                    Some(other) => error!(
                        "{} is not a built-in site design. Allowed values: Topic, Showcase, Blank.",
                        other
                    ),
                }
            };
            (String::from("SITEPAGEPUBLISHING#0"), design_id)
        }
        other => error!(
            "{} is not a supported site type. Allowed values: TeamSite, CommunicationSite.",
            other
        ),
    };

    let request = CreateSiteRequest {
        title: args.title,
        url: url.clone(),
        lcid: args.lcid,
        share_by_email_enabled: args.share_by_email,
        classification: args.classification.unwrap_or_default(),
        description: args.description.unwrap_or_default(),
        web_template,
        site_design_id,
        owner: args.owner,
    };

    let mut ctx = cli::load_context().await;
    let pb = cli::spinner(&format!("Creating site {}...", url));
    match sharepoint::site::create_site(&mut ctx, request).await {
        Ok(response) => {
            pb.finish_and_clear();
            match response.site_status {
                2 => success!("Created site {}", response.site_url),
                1 => warning!(
                    "Site {} is still provisioning. It will become available shortly.",
                    response.site_url
                ),
                status => error!("Site creation failed with status {}.", status),
            }
        }
        Err(e) => {
            pb.finish_and_clear();
            error!("Failed to create site: {}", e);
        }
    }
}

pub async fn get(url: Option<String>) {
    let mut ctx = cli::load_context().await;
    let site_url = match url {
        Some(url) => match utils::normalize_site_url(&url) {
            Ok(url) => url,
            Err(e) => error!("{}", e),
        },
        None => ctx.site_url().to_string(),
    };

    match sharepoint::site::get_site(&mut ctx, &site_url).await {
        Ok(site) => cli::print_json(&site),
        Err(e) => error!("Failed to get site: {}", e),
    }
}

pub async fn classic_add(args: ClassicAddArgs) {
    let url = match utils::normalize_site_url(&args.url) {
        Ok(url) => url,
        Err(e) => error!("{}", e),
    };

    let options = ClassicSiteOptions {
        url: url.clone(),
        title: args.title,
        owner: args.owner,
        template: args.template,
        time_zone: args.time_zone,
        lcid: args.lcid,
        storage_quota: args.storage_quota,
        storage_quota_warning: args.storage_quota_warning,
        resource_quota: args.resource_quota,
        resource_quota_warning: args.resource_quota_warning,
    };

    let mut ctx = cli::load_context().await;
    let operation = match sharepoint::site::create_classic_site(&mut ctx, &options).await {
        Ok(operation) => operation,
        Err(e) => error!("Failed to create site collection: {}", e),
    };

    if args.wait {
        wait_for_completion(&mut ctx, operation, "Provisioning site collection...").await;
        success!("Created site collection {}", url);
    } else if operation.is_complete {
        success!("Created site collection {}", url);
    } else {
        info!("Site collection {} is being provisioned.", url);
    }
}

pub async fn classic_set(args: ClassicSetArgs) {
    let url = match utils::normalize_site_url(&args.url) {
        Ok(url) => url,
        Err(e) => error!("{}", e),
    };

    if let Some(sharing) = &args.sharing {
        if sharepoint::site::sharing_capability_value(sharing).is_none() {
            error!(
                "{} is not a valid sharing capability. Allowed values: Disabled, \
                 ExternalUserSharingOnly, ExternalUserAndGuestSharing, \
                 ExistingExternalUserSharingOnly.",
                sharing
            );
        }
    }
    if let Some(lock_state) = &args.lock_state {
        if lock_state != "Unlock" && lock_state != "NoAccess" {
            error!(
                "{} is not a valid lock state. Allowed values: Unlock, NoAccess.",
                lock_state
            );
        }
    }

    let updates = ClassicSiteUpdates {
        title: args.title,
        sharing: args.sharing,
        storage_quota: args.storage_quota,
        storage_quota_warning: args.storage_quota_warning,
        resource_quota: args.resource_quota,
        resource_quota_warning: args.resource_quota_warning,
        allow_self_service_upgrade: args.allow_self_service_upgrade,
        lock_state: args.lock_state,
        no_script: args.no_script,
    };
    if updates.is_empty() {
        error!("Specify at least one property to set.");
    }

    let mut ctx = cli::load_context().await;
    let operation = match sharepoint::site::update_classic_site(&mut ctx, &url, &updates).await {
        Ok(operation) => operation,
        Err(e) => error!("Failed to update site collection: {}", e),
    };

    if args.wait {
        wait_for_completion(&mut ctx, operation, "Applying site collection properties...").await;
    }
    success!("Updated site collection {}", url);
}

pub async fn classic_list(filter: Option<String>, template: Option<String>) {
    let mut ctx = cli::load_context().await;

    let pb = cli::spinner("Retrieving site collections...");
    match sharepoint::site::list_classic_sites(&mut ctx, filter.as_deref(), template.as_deref())
        .await
    {
        Ok(sites) => {
            pb.finish_and_clear();
            if sites.is_empty() {
                info!("No site collections found.");
                return;
            }

            let rows: Vec<SiteTableRow> = sites
                .into_iter()
                .map(|s| SiteTableRow {
                    url: s.url,
                    title: s.title,
                    template: s.template.unwrap_or_default(),
                    status: s.status.unwrap_or_default(),
                })
                .collect();

            let table = Table::new(rows);
            println!("{}", table);
        }
        Err(e) => {
            pb.finish_and_clear();
            error!("Failed to list site collections: {}", e);
        }
    }
}

pub async fn classic_remove(url: String, wait: bool, confirm: bool) {
    let url = match utils::normalize_site_url(&url) {
        Ok(url) => url,
        Err(e) => error!("{}", e),
    };

    if !confirm && !cli::confirmed(&format!("Remove the site collection {}?", url)) {
        info!("Aborted.");
        return;
    }

    let mut ctx = cli::load_context().await;
    let operation = match sharepoint::site::remove_classic_site(&mut ctx, &url).await {
        Ok(operation) => operation,
        Err(e) => error!("Failed to remove site collection: {}", e),
    };

    if wait {
        wait_for_completion(&mut ctx, operation, "Removing site collection...").await;
    }
    success!("Removed site collection {}", url);
}

/// Blocks on a deferred tenant operation with a spinner, bounded by the
/// configured operation timeout.
async fn wait_for_completion(ctx: &mut SpoContext, operation: SpoOperation, message: &str) {
    if operation.is_complete {
        return;
    }

    let admin_url = match ctx.admin_url() {
        Ok(admin_url) => admin_url,
        Err(e) => error!("{}", e),
    };

    let pb = cli::spinner(message);
    let timeout = Duration::from_secs(config::operation_timeout_secs());
    match csom::wait_for_operation(ctx, &admin_url, operation, timeout).await {
        Ok(()) => pb.finish_and_clear(),
        Err(e) => {
            pb.finish_and_clear();
            error!("{}", e);
        }
    }
}
