use nix::unistd::geteuid;

use crate::ports::PrivilegeProbe;

/// Reads the effective uid of the running process.
#[derive(Debug, Default, Clone, Copy)]
pub struct EffectiveUidProbe;

impl PrivilegeProbe for EffectiveUidProbe {
    fn effective_uid(&self) -> u32 {
        geteuid().as_raw()
    }
}
