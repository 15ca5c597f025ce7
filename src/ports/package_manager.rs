use crate::domain::{DomainError, PackageSpec};

/// Port for the system package manager.
///
/// Exactly the verbs sysdrivers needs: installed-state and version queries,
/// index refresh and install.
pub trait PackageManager: Send + Sync {
    /// Check whether a single package is installed.
    ///
    /// A package that is simply absent is `Ok(false)`. Errors mean the query
    /// itself could not be answered (`DomainError::QueryDegraded`).
    fn is_installed(&self, name: &str) -> Result<bool, DomainError>;

    /// Installed version of a single package.
    fn installed_version(&self, name: &str) -> Result<String, DomainError>;

    /// Refresh the remote package index.
    fn refresh_index(&self) -> Result<(), DomainError>;

    /// Install every package of the spec, non-interactively, skipping
    /// packages that are already up to date and overwriting conflicting files.
    fn install(&self, spec: &PackageSpec) -> Result<(), DomainError>;
}
