//! Plain-text rendering of scan and resolution results.

use crate::domain::{DriverCandidate, DriverMapping, HardwareRecord, InstallOutcome};

pub const NO_HARDWARE: &str = "No hardware detected or scan failed.";
pub const NOTHING_NEEDED: &str = "No additional drivers needed.";

fn status(candidate: &DriverCandidate) -> &'static str {
    if candidate.is_installed {
        "installed"
    } else {
        "available"
    }
}

fn flags(requires_restart: bool, is_recommended: bool) -> String {
    let mut flags = Vec::new();
    if is_recommended {
        flags.push("recommended");
    }
    if requires_restart {
        flags.push("restart");
    }
    flags.join(",")
}

pub fn candidate_table(candidates: &[DriverCandidate]) -> String {
    let mut out = format!(
        "{:<3} {:<28} {:<44} {:<10} {:<16} {}\n",
        "#", "DRIVER", "PACKAGES", "STATUS", "VERSION", "FLAGS"
    );
    for (index, c) in candidates.iter().enumerate() {
        out.push_str(&format!(
            "{:<3} {:<28} {:<44} {:<10} {:<16} {}\n",
            index + 1,
            c.display_name,
            c.package_spec.to_string(),
            status(c),
            c.installed_version.to_string(),
            flags(c.requires_restart, c.is_recommended)
        ));
    }
    out
}

pub fn hardware_table(hardware: &[HardwareRecord]) -> String {
    let mut out = format!("{:<10} {:<11} {:<24} {}\n", "BUS", "CATEGORY", "VENDOR", "DEVICE");
    for record in hardware {
        out.push_str(&format!(
            "{:<10} {:<11} {:<24} {}\n",
            record.bus_id,
            record.category.to_string(),
            record.vendor, record.device_description
        ));
    }
    out
}

pub fn catalog_table(entries: &[DriverMapping]) -> String {
    let mut out = format!(
        "{:<11} {:<10} {:<44} {}\n",
        "CATEGORY", "VENDOR", "PACKAGES", "FLAGS"
    );
    for entry in entries {
        out.push_str(&format!(
            "{:<11} {:<10} {:<44} {}\n",
            entry.category.to_string(),
            entry.vendor_filter.as_deref().unwrap_or("*"),
            entry.package_spec.to_string(),
            flags(entry.requires_restart, entry.is_recommended)
        ));
    }
    out
}

/// One-line summary of a single install.
pub fn outcome_line(display_name: &str, outcome: &InstallOutcome) -> String {
    match outcome {
        InstallOutcome::AlreadyInstalled => format!("{}: already installed", display_name),
        InstallOutcome::Installed {
            restart_required: true,
            ..
        } => format!("{}: installed (restart required)", display_name),
        InstallOutcome::Installed { .. } => format!("{}: installed", display_name),
    }
}
