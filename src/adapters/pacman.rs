use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::config::TimeoutConfig;
use crate::domain::{DomainError, PackageSpec};
use crate::ports::{CommandRequest, CommandRunner, PackageManager};

/// Flags for a non-interactive install that skips up-to-date packages and
/// overwrites conflicting files.
const INSTALL_FLAGS: &[&str] = &["-S", "--noconfirm", "--needed", "--overwrite", "*"];

/// Arch Linux package manager adapter.
pub struct PacmanPackageManager {
    runner: Arc<dyn CommandRunner>,
    program: String,
    timeouts: TimeoutConfig,
}

impl PacmanPackageManager {
    pub fn new(runner: Arc<dyn CommandRunner>, program: impl Into<String>, timeouts: TimeoutConfig) -> Self {
        Self {
            runner,
            program: program.into(),
            timeouts,
        }
    }

    fn query(&self, name: &str) -> CommandRequest {
        CommandRequest::new(self.program.clone())
            .args(["-Q", name])
            .timeout(self.timeouts.query())
    }

    fn degraded(name: &str, err: DomainError) -> DomainError {
        DomainError::QueryDegraded {
            package: name.to_string(),
            reason: err.to_string(),
        }
    }
}

impl PackageManager for PacmanPackageManager {
    fn is_installed(&self, name: &str) -> Result<bool, DomainError> {
        let output = self
            .runner
            .run(&self.query(name))
            .map_err(|e| Self::degraded(name, e))?;
        debug!(package = name, installed = output.success(), "Queried package");
        Ok(output.success())
    }

    fn installed_version(&self, name: &str) -> Result<String, DomainError> {
        let request = self.query(name);
        let output = self
            .runner
            .run(&request)
            .map_err(|e| Self::degraded(name, e))?;

        if !output.success() {
            return Err(Self::degraded(
                name,
                DomainError::CommandFailed {
                    command: request.to_string(),
                    exit_status: output.exit_code,
                },
            ));
        }

        // `pacman -Q` prints "<name> <version>".
        output
            .stdout
            .lines()
            .next()
            .and_then(|line| line.split_whitespace().nth(1))
            .map(str::to_string)
            .ok_or_else(|| DomainError::QueryDegraded {
                package: name.to_string(),
                reason: format!("no version in output of `{}`", request),
            })
    }

    fn refresh_index(&self) -> Result<(), DomainError> {
        let request = CommandRequest::new(self.program.clone())
            .arg("-Sy")
            .timeout(self.timeouts.refresh())
            .inherit_output();

        info!(command = %request, "Refreshing package index");
        let output = self.runner.run(&request)?;
        if !output.success() {
            return Err(DomainError::CommandFailed {
                command: request.to_string(),
                exit_status: output.exit_code,
            });
        }
        Ok(())
    }

    fn install(&self, spec: &PackageSpec) -> Result<(), DomainError> {
        let request = CommandRequest::new(self.program.clone())
            .args(INSTALL_FLAGS.iter().copied())
            .args(spec.names())
            .timeout(self.timeouts.install())
            .inherit_output();

        info!(command = %request, "Installing packages");
        let output = self.runner.run(&request)?;
        if !output.success() {
            return Err(DomainError::InstallFailure {
                package_spec: spec.to_string(),
                command: request.to_string(),
                exit_status: output.exit_code,
            });
        }
        Ok(())
    }
}
