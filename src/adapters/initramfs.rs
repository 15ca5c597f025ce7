use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::domain::DomainError;
use crate::ports::{CommandRequest, CommandRunner, ModuleRegenerator};

/// Regenerates initramfs images (`mkinitcpio -P` by default).
pub struct InitramfsRegenerator {
    runner: Arc<dyn CommandRunner>,
    argv: Vec<String>,
    timeout: Duration,
}

impl InitramfsRegenerator {
    pub fn new(runner: Arc<dyn CommandRunner>, argv: Vec<String>, timeout: Duration) -> Self {
        Self {
            runner,
            argv,
            timeout,
        }
    }
}

impl ModuleRegenerator for InitramfsRegenerator {
    fn regenerate(&self) -> Result<(), DomainError> {
        let request = CommandRequest::from_argv(&self.argv)
            .ok_or_else(|| DomainError::Config("regenerate command is empty".to_string()))?
            .timeout(self.timeout)
            .inherit_output();

        info!(command = %request, "Regenerating initramfs");
        let output = self.runner.run(&request)?;
        if !output.success() {
            return Err(DomainError::CommandFailed {
                command: request.to_string(),
                exit_status: output.exit_code,
            });
        }
        Ok(())
    }

    fn command_line(&self) -> String {
        self.argv.join(" ")
    }
}
