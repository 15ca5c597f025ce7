pub mod catalog;
pub mod config;
pub mod driver;
pub mod error;
pub mod hardware;

pub use catalog::{CatalogPolicy, DriverCatalog};
pub use config::AppConfig;
pub use driver::{
    DriverCandidate, DriverMapping, InstallOutcome, InstalledVersion, PackageSpec,
    PostInstallWarning,
};
pub use error::DomainError;
pub use hardware::{HardwareCategory, HardwareRecord};
