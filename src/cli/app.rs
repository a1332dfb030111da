use std::path::Path;

use tabled::Table;

use crate::{
    cli, error, info, sharepoint, success,
    types::AppTableRow,
    utils,
};

pub async fn add(file_path: String, overwrite: bool) {
    let path = Path::new(&file_path);
    if !path.is_file() {
        error!("File not found: {}", file_path);
    }
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name.to_string(),
        None => error!("Cannot determine a file name from {}", file_path),
    };

    let bytes = match async_fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) => error!("Failed to read {}: {}", file_path, e),
    };

    let mut ctx = cli::load_context().await;
    let catalog = match sharepoint::app::get_tenant_app_catalog_url(&mut ctx).await {
        Ok(catalog) => catalog,
        Err(e) => error!("{}", e),
    };

    let pb = cli::spinner(&format!("Uploading {} to the tenant app catalog...", name));
    match sharepoint::app::add_app(&mut ctx, &catalog, &name, &bytes, overwrite).await {
        Ok(app) => {
            pb.finish_and_clear();
            success!("Added {} to the tenant app catalog with id {}.", name, app.unique_id);
        }
        Err(e) => {
            pb.finish_and_clear();
            error!("Failed to add app: {}", e);
        }
    }
}

pub async fn deploy(id: String, skip_feature_deployment: bool) {
    if !utils::is_guid(&id) {
        error!("{} is not a valid app id (GUID).", id);
    }

    let mut ctx = cli::load_context().await;
    let catalog = match sharepoint::app::get_tenant_app_catalog_url(&mut ctx).await {
        Ok(catalog) => catalog,
        Err(e) => error!("{}", e),
    };

    match sharepoint::app::deploy_app(&mut ctx, &catalog, &id, skip_feature_deployment).await {
        Ok(()) => success!("Deployed app {}.", id),
        Err(e) => error!("Failed to deploy app: {}", e),
    }
}

pub async fn get(id: String) {
    if !utils::is_guid(&id) {
        error!("{} is not a valid app id (GUID).", id);
    }

    let mut ctx = cli::load_context().await;
    let catalog = match sharepoint::app::get_tenant_app_catalog_url(&mut ctx).await {
        Ok(catalog) => catalog,
        Err(e) => error!("{}", e),
    };

    match sharepoint::app::get_app(&mut ctx, &catalog, &id).await {
        Ok(app) => cli::print_json(&app),
        Err(e) => error!("Failed to get app: {}", e),
    }
}

pub async fn list() {
    let mut ctx = cli::load_context().await;
    let catalog = match sharepoint::app::get_tenant_app_catalog_url(&mut ctx).await {
        Ok(catalog) => catalog,
        Err(e) => error!("{}", e),
    };

    match sharepoint::app::list_apps(&mut ctx, &catalog).await {
        Ok(apps) => {
            if apps.is_empty() {
                info!("No apps in the tenant app catalog.");
                return;
            }

            let rows: Vec<AppTableRow> = apps
                .into_iter()
                .map(|a| AppTableRow {
                    id: a.id,
                    title: a.title,
                    deployed: a.deployed,
                    version: a.app_catalog_version.unwrap_or_default(),
                })
                .collect();

            let table = Table::new(rows);
            println!("{}", table);
        }
        Err(e) => error!("Failed to list apps: {}", e),
    }
}

pub async fn remove(id: String, confirm: bool) {
    if !utils::is_guid(&id) {
        error!("{} is not a valid app id (GUID).", id);
    }

    if !confirm && !cli::confirmed(&format!("Remove app {} from the tenant app catalog?", id)) {
        info!("Aborted.");
        return;
    }

    let mut ctx = cli::load_context().await;
    let catalog = match sharepoint::app::get_tenant_app_catalog_url(&mut ctx).await {
        Ok(catalog) => catalog,
        Err(e) => error!("{}", e),
    };

    match sharepoint::app::remove_app(&mut ctx, &catalog, &id).await {
        Ok(()) => success!("Removed app {} from the tenant app catalog.", id),
        Err(e) => error!("Failed to remove app: {}", e),
    }
}
