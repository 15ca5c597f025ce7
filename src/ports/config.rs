use std::path::PathBuf;

use crate::domain::{AppConfig, DomainError};

/// Where `AppConfig` lives between runs.
pub trait ConfigStore: Send + Sync {
    /// Read the TOML file, writing a default one first when it is missing.
    fn load(&self) -> Result<AppConfig, DomainError>;

    fn save(&self, config: &AppConfig) -> Result<(), DomainError>;

    /// `config.toml`, by default under `~/.config/sysdrivers/`.
    fn config_path(&self) -> PathBuf;

    /// Directory holding the config file.
    fn data_dir(&self) -> PathBuf;

    /// Rotated log files. Lives under the XDG data dir, not next to the
    /// config, so an explicit `--config` does not move the logs.
    fn logs_dir(&self) -> PathBuf;
}
