use tabled::Table;

use crate::{cli, error, info, sharepoint, success, types::TenantPropertyTableRow};

pub async fn list() {
    let mut ctx = cli::load_context().await;
    let catalog = match sharepoint::app::get_tenant_app_catalog_url(&mut ctx).await {
        Ok(catalog) => catalog,
        Err(e) => error!("{}", e),
    };

    match sharepoint::tenant::list_tenant_properties(&mut ctx, &catalog).await {
        Ok(properties) => {
            if properties.is_empty() {
                info!("No tenant properties set.");
                return;
            }

            let mut rows: Vec<TenantPropertyTableRow> = properties
                .into_iter()
                .map(|(key, property)| TenantPropertyTableRow {
                    key,
                    value: property.value.unwrap_or_default(),
                    description: property.description.unwrap_or_default(),
                })
                .collect();
            rows.sort_by(|a, b| a.key.cmp(&b.key));

            let table = Table::new(rows);
            println!("{}", table);
        }
        Err(e) => error!("Failed to list tenant properties: {}", e),
    }
}

pub async fn get(key: String) {
    let mut ctx = cli::load_context().await;
    match sharepoint::tenant::get_tenant_property(&mut ctx, &key).await {
        Ok(Some(property)) => cli::print_json(&property),
        Ok(None) => info!("Tenant property {} not found.", key),
        Err(e) => error!("Failed to get tenant property: {}", e),
    }
}

pub async fn set(key: String, value: String, description: Option<String>, comment: Option<String>) {
    let mut ctx = cli::load_context().await;
    let catalog = match sharepoint::app::get_tenant_app_catalog_url(&mut ctx).await {
        Ok(catalog) => catalog,
        Err(e) => error!("{}", e),
    };

    match sharepoint::tenant::set_tenant_property(
        &mut ctx,
        &catalog,
        &key,
        &value,
        description.as_deref(),
        comment.as_deref(),
    )
    .await
    {
        Ok(()) => success!("Set tenant property {}.", key),
        Err(e) => error!("Failed to set tenant property: {}", e),
    }
}

pub async fn remove(key: String, confirm: bool) {
    if !confirm && !cli::confirmed(&format!("Remove tenant property {}?", key)) {
        info!("Aborted.");
        return;
    }

    let mut ctx = cli::load_context().await;
    let catalog = match sharepoint::app::get_tenant_app_catalog_url(&mut ctx).await {
        Ok(catalog) => catalog,
        Err(e) => error!("{}", e),
    };

    match sharepoint::tenant::remove_tenant_property(&mut ctx, &catalog, &key).await {
        Ok(()) => success!("Removed tenant property {}.", key),
        Err(e) => error!("Failed to remove tenant property: {}", e),
    }
}
