pub mod catalog_loader;
pub mod config_store;
pub mod initramfs;
pub mod lspci_scanner;
pub mod pacman;
pub mod privilege;
pub mod system_runner;

pub use catalog_loader::load_catalog;
pub use config_store::TomlConfigStore;
pub use initramfs::InitramfsRegenerator;
pub use lspci_scanner::LspciScanner;
pub use pacman::PacmanPackageManager;
pub use privilege::EffectiveUidProbe;
pub use system_runner::SystemCommandRunner;
