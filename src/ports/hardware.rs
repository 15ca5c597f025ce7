use crate::domain::{DomainError, HardwareRecord};

/// Port for PCI bus enumeration.
///
/// Implementations list the devices on the bus and classify them.
pub trait HardwareScanner: Send + Sync {
    /// Scan the bus for supported hardware, in bus listing order.
    ///
    /// Fails with `DomainError::ScanFailure` only when the enumeration
    /// itself cannot run. A listing without recognizable devices yields an
    /// empty vector.
    fn scan(&self) -> Result<Vec<HardwareRecord>, DomainError>;
}
