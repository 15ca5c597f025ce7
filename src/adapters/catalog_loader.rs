use std::fs;

use tracing::info;

use crate::domain::config::CatalogConfig;
use crate::domain::{CatalogPolicy, DomainError, DriverCatalog};

/// Embedded full-stack driver catalog JSON.
const COMPLETE_CATALOG_JSON: &str = include_str!("../../resources/driver_catalog_complete.json");

/// Embedded single-package driver catalog JSON.
const MINIMAL_CATALOG_JSON: &str = include_str!("../../resources/driver_catalog_minimal.json");

/// Parse one of the built-in catalogs.
pub fn builtin_catalog(policy: CatalogPolicy) -> Result<DriverCatalog, DomainError> {
    let json = match policy {
        CatalogPolicy::Complete => COMPLETE_CATALOG_JSON,
        CatalogPolicy::Minimal => MINIMAL_CATALOG_JSON,
    };
    DriverCatalog::from_json(json)
}

/// Load the catalog selected by the configuration.
///
/// An external file replaces the built-in table entirely.
pub fn load_catalog(config: &CatalogConfig) -> Result<DriverCatalog, DomainError> {
    let catalog = match &config.path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(|e| {
                DomainError::Catalog(format!("Failed to read {}: {}", path.display(), e))
            })?;
            let catalog = DriverCatalog::from_json(&content)?;
            info!(path = ?path, entries = catalog.len(), "Loaded external driver catalog");
            catalog
        }
        None => {
            let catalog = builtin_catalog(config.policy)?;
            info!(policy = %config.policy, entries = catalog.len(), "Loaded built-in driver catalog");
            catalog
        }
    };
    Ok(catalog)
}
