use tracing::{info, warn};

use crate::domain::{
    DomainError, DriverCandidate, InstallOutcome, InstalledVersion, PostInstallWarning,
};
use crate::ports::{ModuleRegenerator, PackageManager, PrivilegeProbe};

/// Installs resolved driver candidates.
///
/// Holds no state of its own; every call works only on the candidate it is
/// handed.
pub struct Installer<'a> {
    package_manager: &'a dyn PackageManager,
    privilege: &'a dyn PrivilegeProbe,
    regenerator: &'a dyn ModuleRegenerator,
}

impl<'a> Installer<'a> {
    pub fn new(
        package_manager: &'a dyn PackageManager,
        privilege: &'a dyn PrivilegeProbe,
        regenerator: &'a dyn ModuleRegenerator,
    ) -> Self {
        Self {
            package_manager,
            privilege,
            regenerator,
        }
    }

    /// Install one candidate.
    ///
    /// On success the candidate is marked installed in place. On failure it
    /// is left untouched.
    pub fn install(&self, candidate: &mut DriverCandidate) -> Result<InstallOutcome, DomainError> {
        if !self.privilege.is_elevated() {
            return Err(DomainError::PrivilegeFailure {
                package_spec: candidate.package_spec.to_string(),
                euid: self.privilege.effective_uid(),
            });
        }

        if candidate.is_installed {
            info!(package = %candidate.package_spec, "Driver is already installed");
            return Ok(InstallOutcome::AlreadyInstalled);
        }

        info!(
            driver = %candidate.display_name,
            package = %candidate.package_spec,
            "Installing driver"
        );

        // A stale index may still resolve the package.
        if let Err(e) = self.package_manager.refresh_index() {
            warn!(error = %e, "Package index refresh failed, continuing with current index");
        }

        self.package_manager.install(&candidate.package_spec)?;

        candidate.is_installed = true;
        candidate.installed_version = InstalledVersion::Unknown;
        info!(package = %candidate.package_spec, "Driver installed");

        let warning = if candidate.requires_restart {
            self.regenerate()
        } else {
            None
        };

        Ok(InstallOutcome::Installed {
            restart_required: candidate.requires_restart,
            warning,
        })
    }

    fn regenerate(&self) -> Option<PostInstallWarning> {
        let err = self.regenerator.regenerate().err()?;
        let exit_status = match &err {
            DomainError::CommandFailed { exit_status, .. } => *exit_status,
            _ => None,
        };
        let warning = PostInstallWarning {
            command: self.regenerator.command_line(),
            exit_status,
            reason: err.to_string(),
        };
        warn!(warning = %warning, "Post-install regeneration failed");
        Some(warning)
    }
}
