use thiserror::Error;

/// Domain-level errors for sysdrivers.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Driver catalog error: {0}")]
    Catalog(String),

    #[error("Invalid package spec: {0}")]
    InvalidPackageSpec(String),

    #[error("Failed to launch `{command}`: {reason}")]
    CommandLaunch { command: String, reason: String },

    #[error("`{command}` did not finish within {timeout_secs}s and was terminated")]
    CommandTimeout { command: String, timeout_secs: u64 },

    #[error("`{command}` failed with {}", describe_exit_status(.exit_status))]
    CommandFailed {
        command: String,
        exit_status: Option<i32>,
    },

    #[error("Hardware scan failed (`{command}`): {reason}")]
    ScanFailure { command: String, reason: String },

    #[error("Package query degraded for {package}: {reason}")]
    QueryDegraded { package: String, reason: String },

    #[error(
        "Root privileges are required to install {package_spec} (effective uid {euid}); \
         re-run with sudo or pkexec"
    )]
    PrivilegeFailure { package_spec: String, euid: u32 },

    #[error(
        "Failed to install {package_spec}: `{command}` exited with {}. \
         Likely causes: package not found, network issue, stale package index, or file conflicts",
        describe_exit_status(.exit_status)
    )]
    InstallFailure {
        package_spec: String,
        command: String,
        exit_status: Option<i32>,
    },

    #[error("No driver candidate matches '{0}'")]
    CandidateNotFound(String),
}

/// Render an optional process exit code for user-facing messages.
///
/// `None` means the process was terminated by a signal.
pub fn describe_exit_status(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit status {}", code),
        None => "termination by signal".to_string(),
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for DomainError {
    fn from(err: toml::de::Error) -> Self {
        DomainError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for DomainError {
    fn from(err: toml::ser::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}
