use crate::domain::DomainError;

/// Port for the post-install kernel module / initramfs regeneration step.
pub trait ModuleRegenerator: Send + Sync {
    /// Regenerate boot images after a kernel-module driver was installed.
    fn regenerate(&self) -> Result<(), DomainError>;

    /// Command line used, for reporting.
    fn command_line(&self) -> String;
}
