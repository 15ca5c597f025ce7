pub mod command;
pub mod config;
pub mod hardware;
pub mod package_manager;
pub mod privilege;
pub mod regeneration;

pub use command::{CommandOutput, CommandRequest, CommandRunner, OutputMode};
pub use config::ConfigStore;
pub use hardware::HardwareScanner;
pub use package_manager::PackageManager;
pub use privilege::PrivilegeProbe;
pub use regeneration::ModuleRegenerator;
