use serde::{Deserialize, Serialize};

use super::error::{describe_exit_status, DomainError};
use super::hardware::{HardwareCategory, HardwareRecord};

/// One or more package names installed and queried as a single unit.
///
/// Whitespace is normalized on parse, so `"a  b"` and `"a b"` are the same
/// package identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PackageSpec(String);

impl PackageSpec {
    /// Parse a whitespace-separated package list.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let names: Vec<&str> = raw.split_whitespace().collect();
        if names.is_empty() {
            return Err(DomainError::InvalidPackageSpec(format!(
                "'{}' names no packages",
                raw
            )));
        }
        Ok(Self(names.join(" ")))
    }

    /// Package names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.split(' ')
    }

    /// The first package name, used for version queries.
    pub fn primary(&self) -> &str {
        self.names().next().unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PackageSpec {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PackageSpec> for String {
    fn from(spec: PackageSpec) -> Self {
        spec.0
    }
}

impl std::fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Catalog entry mapping a hardware category (and optional vendor) to a
/// driver package spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverMapping {
    pub category: HardwareCategory,
    /// Substring the hardware vendor must contain. `None` matches any vendor.
    #[serde(default)]
    pub vendor_filter: Option<String>,
    pub package_spec: PackageSpec,
    pub display_name: String,
    pub description: String,
    #[serde(default)]
    pub requires_restart: bool,
    #[serde(default)]
    pub is_recommended: bool,
}

impl DriverMapping {
    /// Check whether this entry applies to a hardware record.
    pub fn matches(&self, hardware: &HardwareRecord) -> bool {
        self.category == hardware.category
            && self
                .vendor_filter
                .as_deref()
                .map_or(true, |filter| hardware.vendor.contains(filter))
    }
}

/// Installed version state of a candidate at resolution time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "version", rename_all = "snake_case")]
pub enum InstalledVersion {
    /// Installed with the reported version string.
    Installed(String),
    /// Installed, or the query degraded, but no version is known.
    Unknown,
    /// At least one package of the spec is missing.
    NotInstalled,
}

impl std::fmt::Display for InstalledVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstalledVersion::Installed(version) => f.write_str(version),
            InstalledVersion::Unknown => write!(f, "unknown"),
            InstalledVersion::NotInstalled => write!(f, "Not installed"),
        }
    }
}

/// A driver that matched the detected hardware, with install state attached.
///
/// The install state is a snapshot taken during resolution and is only
/// updated locally after a successful install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverCandidate {
    pub display_name: String,
    pub package_spec: PackageSpec,
    pub description: String,
    pub category: HardwareCategory,
    pub is_installed: bool,
    pub installed_version: InstalledVersion,
    pub requires_restart: bool,
    pub is_recommended: bool,
}

impl DriverCandidate {
    /// Build a candidate from a catalog entry and queried install state.
    pub fn from_mapping(
        mapping: &DriverMapping,
        is_installed: bool,
        installed_version: InstalledVersion,
    ) -> Self {
        Self {
            display_name: mapping.display_name.clone(),
            package_spec: mapping.package_spec.clone(),
            description: mapping.description.clone(),
            category: mapping.category,
            is_installed,
            installed_version,
            requires_restart: mapping.requires_restart,
            is_recommended: mapping.is_recommended,
        }
    }
}

/// Warning raised when the post-install regeneration step fails.
///
/// The package itself installed correctly, so this never turns an install
/// into a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostInstallWarning {
    pub command: String,
    pub exit_status: Option<i32>,
    pub reason: String,
}

impl std::fmt::Display for PostInstallWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "`{}` failed ({}): {}",
            self.command,
            describe_exit_status(&self.exit_status),
            self.reason
        )
    }
}

/// Result of a successful install call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstallOutcome {
    /// The candidate was already installed; nothing was run.
    AlreadyInstalled,
    /// The package manager installed the spec.
    Installed {
        restart_required: bool,
        warning: Option<PostInstallWarning>,
    },
}
