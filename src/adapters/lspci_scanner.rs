use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::domain::hardware::parse_bus_listing;
use crate::domain::{DomainError, HardwareRecord};
use crate::ports::{CommandRequest, CommandRunner, HardwareScanner};

/// PCI bus scanner backed by `lspci`.
///
/// Nothing is cached: each call re-enumerates the bus.
pub struct LspciScanner {
    runner: Arc<dyn CommandRunner>,
    program: String,
    timeout: Duration,
}

impl LspciScanner {
    pub fn new(runner: Arc<dyn CommandRunner>, program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            runner,
            program: program.into(),
            timeout,
        }
    }
}

impl HardwareScanner for LspciScanner {
    fn scan(&self) -> Result<Vec<HardwareRecord>, DomainError> {
        let request = CommandRequest::new(self.program.clone()).timeout(self.timeout);

        let output = self.runner.run(&request).map_err(|e| DomainError::ScanFailure {
            command: request.to_string(),
            reason: e.to_string(),
        })?;

        if !output.success() {
            // Partial listings are still useful; lspci prints what it can.
            warn!(
                command = %request,
                exit_code = ?output.exit_code,
                stderr = %output.stderr.trim(),
                "Bus enumeration exited unsuccessfully"
            );
        }

        let records = parse_bus_listing(&output.stdout);
        for record in &records {
            debug!(
                bus_id = %record.bus_id,
                category = %record.category,
                vendor = %record.vendor,
                "Detected device"
            );
        }
        info!(devices = records.len(), "Hardware scan complete");

        Ok(records)
    }
}
