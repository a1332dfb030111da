use std::path::Path;

use tabled::Table;

use crate::{
    cli, error, info, sharepoint, success,
    types::SiteScriptTableRow,
    utils,
};

pub async fn add(title: String, content_path: String) {
    let path = Path::new(&content_path);
    if !path.is_file() {
        error!("File not found: {}", content_path);
    }

    let content = match async_fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) => error!("Failed to read {}: {}", content_path, e),
    };
    // fail on malformed script documents before they reach the tenant
    if let Err(e) = serde_json::from_str::<serde_json::Value>(&content) {
        error!("{} does not contain valid JSON: {}", content_path, e);
    }

    let mut ctx = cli::load_context().await;
    match sharepoint::sitescript::create_site_script(&mut ctx, &title, content).await {
        Ok(script) => cli::print_json(&script),
        Err(e) => error!("Failed to create site script: {}", e),
    }
}

pub async fn list() {
    let mut ctx = cli::load_context().await;
    match sharepoint::sitescript::get_site_scripts(&mut ctx).await {
        Ok(scripts) => {
            if scripts.is_empty() {
                info!("No site scripts registered in the tenant.");
                return;
            }

            let rows: Vec<SiteScriptTableRow> = scripts
                .into_iter()
                .map(|s| SiteScriptTableRow {
                    id: s.id,
                    title: s.title,
                    version: s.version,
                })
                .collect();

            let table = Table::new(rows);
            println!("{}", table);
        }
        Err(e) => error!("Failed to list site scripts: {}", e),
    }
}

pub async fn get(id: String) {
    if !utils::is_guid(&id) {
        error!("{} is not a valid site script id (GUID).", id);
    }

    let mut ctx = cli::load_context().await;
    match sharepoint::sitescript::get_site_script(&mut ctx, &id).await {
        Ok(script) => cli::print_json(&script),
        Err(e) => error!("Failed to get site script: {}", e),
    }
}

pub async fn remove(id: String, confirm: bool) {
    if !utils::is_guid(&id) {
        error!("{} is not a valid site script id (GUID).", id);
    }

    if !confirm && !cli::confirmed(&format!("Remove site script {}?", id)) {
        info!("Aborted.");
        return;
    }

    let mut ctx = cli::load_context().await;
    match sharepoint::sitescript::delete_site_script(&mut ctx, &id).await {
        Ok(()) => success!("Removed site script {}.", id),
        Err(e) => error!("Failed to remove site script: {}", e),
    }
}
