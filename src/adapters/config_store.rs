use std::fs;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::domain::{AppConfig, DomainError};
use crate::ports::ConfigStore;

const APP_DIR: &str = "sysdrivers";

/// TOML-based configuration store.
pub struct TomlConfigStore {
    data_dir: PathBuf,
    config_path: PathBuf,
}

impl TomlConfigStore {
    /// Create a store rooted in the user's configuration directory
    /// (`~/.config/sysdrivers/`).
    pub fn new() -> Result<Self, DomainError> {
        let data_dir = Self::get_data_dir()?;

        // Ensure the data directory exists
        fs::create_dir_all(&data_dir)?;

        info!(data_dir = ?data_dir, "ConfigStore initialized");

        Ok(Self {
            config_path: data_dir.join("config.toml"),
            data_dir,
        })
    }

    /// Create a store reading an explicit configuration file.
    pub fn with_path(config_path: PathBuf) -> Result<Self, DomainError> {
        let data_dir = match config_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => std::env::current_dir()?,
        };

        info!(config_path = ?config_path, "ConfigStore initialized with explicit path");

        Ok(Self {
            data_dir,
            config_path,
        })
    }

    fn get_data_dir() -> Result<PathBuf, DomainError> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR))
            .ok_or_else(|| {
                DomainError::Config("Could not find configuration directory".to_string())
            })
    }

    /// Log directory: `~/.local/share/sysdrivers/logs/`, falling back to the
    /// data directory.
    fn get_logs_dir(&self) -> PathBuf {
        dirs::data_dir()
            .map(|p| p.join(APP_DIR).join("logs"))
            .unwrap_or_else(|| self.data_dir.join("logs"))
    }
}

impl ConfigStore for TomlConfigStore {
    fn load(&self) -> Result<AppConfig, DomainError> {
        let config_path = self.config_path();

        if config_path.exists() {
            debug!(path = ?config_path, "Loading configuration");
            let content = fs::read_to_string(&config_path)?;
            let config: AppConfig = toml::from_str(&content)?;
            info!(path = ?config_path, "Configuration loaded");
            Ok(config)
        } else {
            info!(path = ?config_path, "Configuration file not found, creating default");
            let config = AppConfig::new();
            self.save(&config)?;
            Ok(config)
        }
    }

    fn save(&self, config: &AppConfig) -> Result<(), DomainError> {
        let config_path = self.config_path();

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(config)?;
        fs::write(&config_path, content)?;

        info!(path = ?config_path, "Configuration saved");
        Ok(())
    }

    fn config_path(&self) -> PathBuf {
        self.config_path.clone()
    }

    fn data_dir(&self) -> PathBuf {
        self.data_dir.clone()
    }

    fn logs_dir(&self) -> PathBuf {
        self.get_logs_dir()
    }
}
