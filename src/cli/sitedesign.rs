use tabled::Table;

use crate::{
    cli, error, info, sharepoint, success,
    types::{CreateSiteDesignInfo, SiteDesignTableRow},
    utils,
};

pub struct SiteDesignAddArgs {
    pub title: String,
    pub web_template: String,
    pub site_scripts: Vec<String>,
    pub description: Option<String>,
    pub preview_image_url: Option<String>,
    pub preview_image_alt_text: Option<String>,
    pub is_default: bool,
}

pub async fn add(args: SiteDesignAddArgs) {
    let web_template = match sharepoint::sitedesign::web_template_value(&args.web_template) {
        Some(value) => value.to_string(),
        None => error!(
            "{} is not a valid web template. Allowed values: TeamSite, CommunicationSite.",
            args.web_template
        ),
    };
    for id in &args.site_scripts {
        if !utils::is_guid(id) {
            error!("{} is not a valid site script id (GUID).", id);
        }
    }

    let info = CreateSiteDesignInfo {
        title: args.title,
        web_template,
        site_script_ids: args.site_scripts,
        description: args.description,
        preview_image_url: args.preview_image_url,
        preview_image_alt_text: args.preview_image_alt_text,
        is_default: args.is_default,
    };

    let mut ctx = cli::load_context().await;
    match sharepoint::sitedesign::create_site_design(&mut ctx, &info).await {
        Ok(design) => cli::print_json(&design),
        Err(e) => error!("Failed to create site design: {}", e),
    }
}

pub async fn list() {
    let mut ctx = cli::load_context().await;
    match sharepoint::sitedesign::get_site_designs(&mut ctx).await {
        Ok(designs) => {
            if designs.is_empty() {
                info!("No site designs registered in the tenant.");
                return;
            }

            let rows: Vec<SiteDesignTableRow> = designs
                .into_iter()
                .map(|d| SiteDesignTableRow {
                    id: d.id,
                    title: d.title,
                    web_template: d.web_template,
                    is_default: d.is_default,
                    version: d.version,
                })
                .collect();

            let table = Table::new(rows);
            println!("{}", table);
        }
        Err(e) => error!("Failed to list site designs: {}", e),
    }
}

pub async fn get(id: String) {
    if !utils::is_guid(&id) {
        error!("{} is not a valid site design id (GUID).", id);
    }

    let mut ctx = cli::load_context().await;
    match sharepoint::sitedesign::get_site_design(&mut ctx, &id).await {
        Ok(design) => cli::print_json(&design),
        Err(e) => error!("Failed to get site design: {}", e),
    }
}

pub async fn remove(id: String, confirm: bool) {
    if !utils::is_guid(&id) {
        error!("{} is not a valid site design id (GUID).", id);
    }

    if !confirm && !cli::confirmed(&format!("Remove site design {}?", id)) {
        info!("Aborted.");
        return;
    }

    let mut ctx = cli::load_context().await;
    match sharepoint::sitedesign::delete_site_design(&mut ctx, &id).await {
        Ok(()) => success!("Removed site design {}.", id),
        Err(e) => error!("Failed to remove site design: {}", e),
    }
}

pub async fn apply(id: String, web_url: String) {
    if !utils::is_guid(&id) {
        error!("{} is not a valid site design id (GUID).", id);
    }
    let web_url = match utils::normalize_site_url(&web_url) {
        Ok(url) => url,
        Err(e) => error!("{}", e),
    };

    let mut ctx = cli::load_context().await;
    let pb = cli::spinner("Applying site design...");
    match sharepoint::sitedesign::apply_site_design(&mut ctx, &id, &web_url).await {
        Ok(outcomes) => {
            pb.finish_and_clear();
            for outcome in &outcomes {
                let title = outcome.title.as_deref().unwrap_or("(action)");
                match outcome.outcome_text.as_deref() {
                    Some(text) if !text.is_empty() => println!("{}: {}", title, text),
                    _ => println!("{}", title),
                }
            }
            success!("Applied site design {} to {}", id, web_url);
        }
        Err(e) => {
            pb.finish_and_clear();
            error!("Failed to apply site design: {}", e);
        }
    }
}
