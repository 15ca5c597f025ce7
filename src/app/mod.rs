pub mod controller;
pub mod installer;
pub mod resolver;

pub use controller::{AppController, InstallReport, LaunchOptions, Services};
pub use installer::Installer;
pub use resolver::resolve;
