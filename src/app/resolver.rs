use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::domain::{
    DomainError, DriverCandidate, DriverCatalog, DriverMapping, HardwareRecord, InstalledVersion,
    PackageSpec,
};
use crate::ports::PackageManager;

/// Match scanned hardware against the catalog and attach install state.
///
/// Candidates come out in first-encounter order: hardware in scan order, then
/// catalog order within each record. A package spec appears at most once; the
/// first mapping seen for it wins. Failed package queries degrade the affected
/// candidate and never abort the pass.
pub fn resolve(
    hardware: &[HardwareRecord],
    catalog: &DriverCatalog,
    package_manager: &dyn PackageManager,
) -> Vec<DriverCandidate> {
    let mut seen: HashSet<&PackageSpec> = HashSet::new();
    let mut candidates = Vec::new();

    for record in hardware {
        for mapping in catalog.matches(record) {
            if !seen.insert(&mapping.package_spec) {
                debug!(
                    package = %mapping.package_spec,
                    bus_id = %record.bus_id,
                    "Skipping duplicate driver match"
                );
                continue;
            }
            candidates.push(build_candidate(mapping, package_manager));
        }
    }

    info!(
        devices = hardware.len(),
        candidates = candidates.len(),
        "Driver resolution complete"
    );
    candidates
}

fn build_candidate(mapping: &DriverMapping, package_manager: &dyn PackageManager) -> DriverCandidate {
    let spec = &mapping.package_spec;

    let (is_installed, installed_version) = match spec_installed(spec, package_manager) {
        Ok(true) => {
            let version = match package_manager.installed_version(spec.primary()) {
                Ok(version) => InstalledVersion::Installed(version),
                Err(e) => {
                    warn!(package = %spec, error = %e, "Version query degraded");
                    InstalledVersion::Unknown
                }
            };
            (true, version)
        }
        Ok(false) => (false, InstalledVersion::NotInstalled),
        Err(e) => {
            warn!(package = %spec, error = %e, "Installed-state query degraded");
            (false, InstalledVersion::Unknown)
        }
    };

    DriverCandidate::from_mapping(mapping, is_installed, installed_version)
}

/// A spec counts as installed only when every one of its packages is.
fn spec_installed(spec: &PackageSpec, package_manager: &dyn PackageManager) -> Result<bool, DomainError> {
    for name in spec.names() {
        if !package_manager.is_installed(name)? {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DriverMapping, HardwareCategory};
    use crate::testing::{record, FakePackageManager};

    fn mapping(category: HardwareCategory, spec: &str, name: &str) -> DriverMapping {
        DriverMapping {
            category,
            vendor_filter: None,
            package_spec: PackageSpec::parse(spec).unwrap(),
            display_name: name.to_string(),
            description: String::new(),
            requires_restart: false,
            is_recommended: true,
        }
    }

    fn specs(candidates: &[DriverCandidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.package_spec.as_str()).collect()
    }

    fn gpu_catalog() -> DriverCatalog {
        DriverCatalog::new(
            1,
            vec![
                mapping(HardwareCategory::GpuNvidia, "nvidia", "NVIDIA"),
                mapping(HardwareCategory::GpuAmd, "mesa", "Mesa (AMD)"),
                mapping(HardwareCategory::GpuAmd, "vulkan-radeon", "RADV"),
                mapping(HardwareCategory::GpuIntel, "mesa", "Mesa (Intel)"),
                mapping(HardwareCategory::GpuIntel, "vulkan-intel", "ANV"),
                mapping(HardwareCategory::Audio, "sof-firmware", "SOF"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_same_category_twice_yields_one_candidate() {
        let catalog =
            DriverCatalog::new(1, vec![mapping(HardwareCategory::GpuNvidia, "foo", "Foo")]).unwrap();
        let hardware = vec![
            record(HardwareCategory::GpuNvidia, "NVIDIA", "01:00.0"),
            record(HardwareCategory::GpuNvidia, "NVIDIA", "02:00.0"),
        ];

        let candidates = resolve(&hardware, &catalog, &FakePackageManager::new());
        assert_eq!(specs(&candidates), vec!["foo"]);
    }

    #[test]
    fn test_first_seen_wins_and_order_is_encounter_order() {
        let hardware = vec![
            record(HardwareCategory::GpuIntel, "Intel", "00:02.0"),
            record(HardwareCategory::Audio, "Intel Corporation", "00:1f.3"),
            record(HardwareCategory::GpuAmd, "AMD", "03:00.0"),
        ];

        let candidates = resolve(&hardware, &gpu_catalog(), &FakePackageManager::new());
        assert_eq!(
            specs(&candidates),
            vec!["mesa", "vulkan-intel", "sof-firmware", "vulkan-radeon"]
        );
        // Metadata from the first matching row is kept.
        assert_eq!(candidates[0].display_name, "Mesa (Intel)");
        assert_eq!(candidates[0].category, HardwareCategory::GpuIntel);
    }

    #[test]
    fn test_unmatched_category_contributes_nothing() {
        let hardware = vec![
            record(HardwareCategory::Unknown, "Unknown", "0b:00.0"),
            record(HardwareCategory::Network, "Unknown", "02:00.0"),
        ];
        let pm = FakePackageManager::new();
        assert!(resolve(&hardware, &gpu_catalog(), &pm).is_empty());
        assert!(pm.queries().is_empty());
    }

    #[test]
    fn test_partial_install_counts_as_not_installed() {
        let catalog = DriverCatalog::new(
            1,
            vec![mapping(HardwareCategory::GpuAmd, "a b", "Pair")],
        )
        .unwrap();
        let pm = FakePackageManager::new().with_installed("a", "1.0-1");
        let hardware = vec![record(HardwareCategory::GpuAmd, "AMD", "03:00.0")];

        let candidates = resolve(&hardware, &catalog, &pm);
        assert!(!candidates[0].is_installed);
        assert_eq!(candidates[0].installed_version, InstalledVersion::NotInstalled);
    }

    #[test]
    fn test_installed_spec_reports_primary_version() {
        let catalog = DriverCatalog::new(
            1,
            vec![mapping(HardwareCategory::GpuAmd, "mesa lib32-mesa", "Mesa")],
        )
        .unwrap();
        let pm = FakePackageManager::new()
            .with_installed("mesa", "1:24.1.1-1")
            .with_installed("lib32-mesa", "1:24.1.1-2");
        let hardware = vec![record(HardwareCategory::GpuAmd, "AMD", "03:00.0")];

        let candidates = resolve(&hardware, &catalog, &pm);
        assert!(candidates[0].is_installed);
        assert_eq!(
            candidates[0].installed_version,
            InstalledVersion::Installed("1:24.1.1-1".to_string())
        );
    }

    #[test]
    fn test_query_failures_degrade_single_candidate() {
        let pm = FakePackageManager::new()
            .with_installed("vulkan-intel", "24.1-1")
            .with_broken_version("vulkan-intel")
            .with_broken_query("sof-firmware")
            .with_installed("mesa", "24.1-1");
        let hardware = vec![
            record(HardwareCategory::GpuIntel, "Intel", "00:02.0"),
            record(HardwareCategory::Audio, "Intel Corporation", "00:1f.3"),
        ];

        let candidates = resolve(&hardware, &gpu_catalog(), &pm);
        assert_eq!(candidates.len(), 3);

        assert!(candidates[0].is_installed);
        assert!(candidates[1].is_installed);
        assert_eq!(candidates[1].installed_version, InstalledVersion::Unknown);
        assert!(!candidates[2].is_installed);
        assert_eq!(candidates[2].installed_version, InstalledVersion::Unknown);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let hardware = vec![
            record(HardwareCategory::GpuAmd, "AMD", "03:00.0"),
            record(HardwareCategory::GpuIntel, "Intel", "00:02.0"),
            record(HardwareCategory::GpuNvidia, "NVIDIA", "01:00.0"),
            record(HardwareCategory::Audio, "Intel Corporation", "00:1f.3"),
        ];
        let catalog = gpu_catalog();
        let pm = FakePackageManager::new().with_installed("mesa", "24.1-1");

        let first = resolve(&hardware, &catalog, &pm);
        let second = resolve(&hardware, &catalog, &pm);
        assert_eq!(first, second);

        let unique: HashSet<_> = first.iter().map(|c| &c.package_spec).collect();
        assert_eq!(unique.len(), first.len());
    }

    #[test]
    fn test_empty_hardware_gives_no_candidates() {
        assert!(resolve(&[], &gpu_catalog(), &FakePackageManager::new()).is_empty());
    }
}
