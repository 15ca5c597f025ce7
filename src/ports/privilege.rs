/// Port for the effective privilege of the running process.
pub trait PrivilegeProbe: Send + Sync {
    /// Effective user id of the current process.
    fn effective_uid(&self) -> u32;

    /// Whether the process may perform mutating package operations.
    fn is_elevated(&self) -> bool {
        self.effective_uid() == 0
    }
}
