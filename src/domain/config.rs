use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::catalog::CatalogPolicy;

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level for the log file: "trace", "debug", "info", "warn", "error".
    pub level: String,
    /// Level for console output on stderr.
    pub console_level: String,
    /// Enable file logging with rotation.
    pub file_logging: bool,
    /// Maximum number of log files to keep.
    pub max_files: u32,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console_level: "warn".to_string(),
            file_logging: true,
            max_files: 7,
        }
    }
}

/// Driver catalog selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Built-in table to use when no external file is given.
    pub policy: CatalogPolicy,
    /// External JSON catalog replacing the built-in table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// External programs invoked by sysdrivers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandsConfig {
    /// PCI bus enumeration program.
    pub bus_scan: String,
    /// Package manager program.
    pub package_manager: String,
    /// Kernel module / initramfs regeneration command line.
    pub regenerate: Vec<String>,
    /// Reboot command line.
    pub reboot: Vec<String>,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            bus_scan: "lspci".to_string(),
            package_manager: "pacman".to_string(),
            regenerate: vec!["mkinitcpio".to_string(), "-P".to_string()],
            reboot: vec!["systemctl".to_string(), "reboot".to_string()],
        }
    }
}

/// Upper bounds for external commands, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub scan_secs: u64,
    pub query_secs: u64,
    pub refresh_secs: u64,
    pub install_secs: u64,
    pub regenerate_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            scan_secs: 30,
            query_secs: 15,
            refresh_secs: 600,
            install_secs: 3600,
            regenerate_secs: 600,
        }
    }
}

impl TimeoutConfig {
    pub fn scan(&self) -> Duration {
        Duration::from_secs(self.scan_secs)
    }

    pub fn query(&self) -> Duration {
        Duration::from_secs(self.query_secs)
    }

    pub fn refresh(&self) -> Duration {
        Duration::from_secs(self.refresh_secs)
    }

    pub fn install(&self) -> Duration {
        Duration::from_secs(self.install_secs)
    }

    pub fn regenerate(&self) -> Duration {
        Duration::from_secs(self.regenerate_secs)
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub catalog: CatalogConfig,
    pub commands: CommandsConfig,
    pub timeouts: TimeoutConfig,
}

impl AppConfig {
    /// Create a new AppConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }
}
