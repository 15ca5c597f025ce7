use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::driver::DriverMapping;
use super::error::DomainError;
use super::hardware::HardwareRecord;

/// Which built-in driver table is active.
///
/// The two tables group packages differently and are never merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogPolicy {
    /// Full driver stack including 32-bit and DKMS variants.
    #[default]
    Complete,
    /// One package per driver, no 32-bit or DKMS variants.
    Minimal,
}

impl std::fmt::Display for CatalogPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogPolicy::Complete => write!(f, "complete"),
            CatalogPolicy::Minimal => write!(f, "minimal"),
        }
    }
}

impl std::str::FromStr for CatalogPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "complete" => Ok(CatalogPolicy::Complete),
            "minimal" => Ok(CatalogPolicy::Minimal),
            other => Err(DomainError::Config(format!(
                "unknown catalog policy '{}' (expected 'complete' or 'minimal')",
                other
            ))),
        }
    }
}

/// Serialized catalog file layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    pub version: u32,
    pub drivers: Vec<DriverMapping>,
}

/// Ordered, read-only driver mapping table.
#[derive(Debug, Clone)]
pub struct DriverCatalog {
    version: u32,
    entries: Vec<DriverMapping>,
}

impl DriverCatalog {
    /// Build a catalog from entries, rejecting duplicates.
    ///
    /// Two entries with the same category, vendor filter and package spec are
    /// a configuration error.
    pub fn new(version: u32, entries: Vec<DriverMapping>) -> Result<Self, DomainError> {
        if version == 0 {
            return Err(DomainError::Catalog("catalog version must be >= 1".to_string()));
        }
        if entries.is_empty() {
            return Err(DomainError::Catalog("catalog has no driver entries".to_string()));
        }

        let mut seen = HashSet::new();
        for entry in &entries {
            let key = (
                entry.category,
                entry.vendor_filter.as_deref(),
                entry.package_spec.as_str(),
            );
            if !seen.insert(key) {
                return Err(DomainError::Catalog(format!(
                    "duplicate entry for {} ({}) package '{}'",
                    entry.category,
                    entry.vendor_filter.as_deref().unwrap_or("any vendor"),
                    entry.package_spec
                )));
            }
        }

        Ok(Self { version, entries })
    }

    /// Parse and validate a JSON catalog.
    pub fn from_json(json: &str) -> Result<Self, DomainError> {
        let file: CatalogFile = serde_json::from_str(json)
            .map_err(|e| DomainError::Catalog(format!("Failed to parse driver catalog: {}", e)))?;
        Self::new(file.version, file.drivers)
    }

    /// All entries whose category and vendor filter match the hardware,
    /// in declaration order.
    pub fn matches<'a>(
        &'a self,
        hardware: &'a HardwareRecord,
    ) -> impl Iterator<Item = &'a DriverMapping> + 'a {
        self.entries.iter().filter(move |entry| entry.matches(hardware))
    }

    pub fn entries(&self) -> &[DriverMapping] {
        &self.entries
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
