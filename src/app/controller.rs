use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use crate::adapters::{
    load_catalog, EffectiveUidProbe, InitramfsRegenerator, LspciScanner, PacmanPackageManager,
    SystemCommandRunner, TomlConfigStore,
};
use crate::app::installer::Installer;
use crate::app::resolver::resolve;
use crate::domain::{
    AppConfig, CatalogPolicy, DomainError, DriverCandidate, DriverCatalog, HardwareRecord,
    InstallOutcome, PackageSpec,
};
use crate::infrastructure::init_logging;
use crate::ports::{
    CommandRequest, CommandRunner, ConfigStore, HardwareScanner, ModuleRegenerator,
    PackageManager, PrivilegeProbe,
};

/// Startup options coming from the command line.
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    /// Explicit configuration file instead of the default location.
    pub config_path: Option<PathBuf>,
    /// Overrides `catalog.policy` from the configuration.
    pub catalog_policy: Option<CatalogPolicy>,
    /// Debug-level console logging.
    pub verbose: bool,
}

/// The collaborators the controller drives.
pub struct Services {
    pub scanner: Box<dyn HardwareScanner>,
    pub package_manager: Box<dyn PackageManager>,
    pub privilege: Box<dyn PrivilegeProbe>,
    pub regenerator: Box<dyn ModuleRegenerator>,
    pub runner: Arc<dyn CommandRunner>,
}

impl Services {
    /// Real system adapters sharing one command runner.
    pub fn system(config: &AppConfig) -> Result<Self, DomainError> {
        let runner: Arc<dyn CommandRunner> = Arc::new(SystemCommandRunner::new()?);

        Ok(Self {
            scanner: Box::new(LspciScanner::new(
                runner.clone(),
                config.commands.bus_scan.clone(),
                config.timeouts.scan(),
            )),
            package_manager: Box::new(PacmanPackageManager::new(
                runner.clone(),
                config.commands.package_manager.clone(),
                config.timeouts.clone(),
            )),
            privilege: Box::new(EffectiveUidProbe),
            regenerator: Box::new(InitramfsRegenerator::new(
                runner.clone(),
                config.commands.regenerate.clone(),
                config.timeouts.regenerate(),
            )),
            runner,
        })
    }
}

/// Result of one install within a batch.
#[derive(Debug)]
pub struct InstallReport {
    pub display_name: String,
    pub package_spec: PackageSpec,
    pub result: Result<InstallOutcome, DomainError>,
}

/// Application controller owning the presentation state: the last scan and
/// the current candidate list.
///
/// Refresh and install take `&mut self`, so at most one of them runs at a
/// time.
pub struct AppController {
    config: AppConfig,
    config_store: Box<dyn ConfigStore>,
    catalog: DriverCatalog,
    services: Services,
    hardware: Vec<HardwareRecord>,
    candidates: Vec<DriverCandidate>,
    _log_guard: Option<WorkerGuard>,
}

impl AppController {
    /// Initialize the application controller.
    /// This sets up configuration, logging, the driver catalog and the
    /// system adapters.
    pub fn new(options: LaunchOptions) -> Result<Self, DomainError> {
        // Step 1: Initialize config store
        let config_store = match options.config_path {
            Some(path) => TomlConfigStore::with_path(path)?,
            None => TomlConfigStore::new()?,
        };

        // Step 2: Load configuration
        let mut config = config_store.load()?;
        if let Some(policy) = options.catalog_policy {
            config.catalog.policy = policy;
        }

        // Step 3: Initialize logging
        let log_guard = init_logging(&config_store.logs_dir(), &config.logging, options.verbose)?;

        info!("sysdrivers starting up");

        // Step 4: Load the driver catalog and wire the system adapters
        let catalog = load_catalog(&config.catalog)?;
        let services = Services::system(&config)?;

        info!(
            catalog_policy = %config.catalog.policy,
            catalog_entries = catalog.len(),
            "AppController initialized"
        );

        let mut controller =
            Self::with_services(config, Box::new(config_store), catalog, services);
        controller._log_guard = log_guard;
        Ok(controller)
    }

    /// Build a controller from already constructed parts.
    pub fn with_services(
        config: AppConfig,
        config_store: Box<dyn ConfigStore>,
        catalog: DriverCatalog,
        services: Services,
    ) -> Self {
        Self {
            config,
            config_store,
            catalog,
            services,
            hardware: Vec::new(),
            candidates: Vec::new(),
            _log_guard: None,
        }
    }

    /// Get the current configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn catalog(&self) -> &DriverCatalog {
        &self.catalog
    }

    /// Hardware found by the last refresh.
    pub fn hardware(&self) -> &[HardwareRecord] {
        &self.hardware
    }

    /// Candidates from the last refresh, with local install updates applied.
    pub fn candidates(&self) -> &[DriverCandidate] {
        &self.candidates
    }

    /// Scan the bus without resolving drivers.
    pub fn scan_hardware(&self) -> Result<Vec<HardwareRecord>, DomainError> {
        self.services.scanner.scan()
    }

    /// Rescan hardware and rebuild the candidate list.
    ///
    /// On scan failure both lists are cleared.
    pub fn refresh(&mut self) -> Result<&[DriverCandidate], DomainError> {
        self.hardware.clear();
        self.candidates.clear();

        self.hardware = self.services.scanner.scan()?;
        self.candidates = resolve(
            &self.hardware,
            &self.catalog,
            self.services.package_manager.as_ref(),
        );
        Ok(&self.candidates)
    }

    /// Locate a candidate by exact package spec, or by one of its package
    /// names (first candidate in list order).
    pub fn find_candidate(&self, query: &str) -> Result<usize, DomainError> {
        if let Ok(spec) = PackageSpec::parse(query) {
            if let Some(index) = self.candidates.iter().position(|c| c.package_spec == spec) {
                return Ok(index);
            }
        }
        let name = query.trim();
        self.candidates
            .iter()
            .position(|c| c.package_spec.names().any(|n| n == name))
            .ok_or_else(|| DomainError::CandidateNotFound(query.to_string()))
    }

    /// Install the candidate at `index`.
    pub fn install_at(&mut self, index: usize) -> Result<InstallOutcome, DomainError> {
        let candidate = self
            .candidates
            .get_mut(index)
            .ok_or_else(|| DomainError::CandidateNotFound(format!("#{}", index)))?;

        let installer = Installer::new(
            self.services.package_manager.as_ref(),
            self.services.privilege.as_ref(),
            self.services.regenerator.as_ref(),
        );
        installer.install(candidate)
    }

    /// Install several candidates. A failure is recorded and the batch goes on.
    pub fn install_batch(&mut self, indices: &[usize]) -> Vec<InstallReport> {
        let mut reports = Vec::with_capacity(indices.len());
        for &index in indices {
            let Some(candidate) = self.candidates.get(index) else {
                continue;
            };
            let display_name = candidate.display_name.clone();
            let package_spec = candidate.package_spec.clone();

            let result = self.install_at(index);
            if let Err(e) = &result {
                warn!(package = %package_spec, error = %e, "Install failed, continuing with batch");
            }
            reports.push(InstallReport {
                display_name,
                package_spec,
                result,
            });
        }
        reports
    }

    /// Indices of recommended candidates that are not installed yet.
    pub fn pending_recommended(&self) -> Vec<usize> {
        self.candidates
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_recommended && !c.is_installed)
            .map(|(index, _)| index)
            .collect()
    }

    /// Run the configured reboot command.
    pub fn reboot(&self) -> Result<(), DomainError> {
        let request = CommandRequest::from_argv(&self.config.commands.reboot)
            .ok_or_else(|| DomainError::Config("reboot command is empty".to_string()))?;
        info!(command = %request, "Rebooting");
        let output = self.services.runner.run(&request)?;
        if !output.success() {
            return Err(DomainError::CommandFailed {
                command: request.to_string(),
                exit_status: output.exit_code,
            });
        }
        Ok(())
    }

    /// Get the data directory path.
    pub fn data_dir(&self) -> String {
        self.config_store.data_dir().to_string_lossy().to_string()
    }

    /// Get the logs directory path.
    pub fn logs_dir(&self) -> String {
        self.config_store.logs_dir().to_string_lossy().to_string()
    }

    /// Get the config file path.
    pub fn config_path(&self) -> String {
        self.config_store.config_path().to_string_lossy().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HardwareCategory, InstalledVersion};
    use crate::testing::{exit, record, ControllerFixture, FakePackageManager, FakeScanner};

    fn amd_and_audio() -> Vec<HardwareRecord> {
        vec![
            record(HardwareCategory::GpuAmd, "AMD", "03:00.0"),
            record(HardwareCategory::Audio, "Advanced Micro Devices, Inc.", "03:00.1"),
        ]
    }

    #[test]
    fn test_refresh_builds_candidates() {
        let pm = FakePackageManager::new()
            .with_installed("mesa", "1:24.1.1-1")
            .with_installed("lib32-mesa", "1:24.1.1-1");
        let mut f = ControllerFixture::new(Ok(amd_and_audio()), pm, 0);

        let candidates = f.controller.refresh().unwrap();
        let specs: Vec<&str> = candidates.iter().map(|c| c.package_spec.as_str()).collect();
        assert_eq!(
            specs,
            vec![
                "mesa lib32-mesa",
                "vulkan-radeon lib32-vulkan-radeon",
                "xf86-video-amdgpu",
                "sof-firmware alsa-firmware alsa-ucm-conf"
            ]
        );
        assert!(candidates[0].is_installed);
        assert_eq!(f.controller.hardware().len(), 2);
    }

    #[test]
    fn test_scan_failure_clears_state() {
        let mut f = ControllerFixture::new(Ok(amd_and_audio()), FakePackageManager::new(), 0);
        f.controller.refresh().unwrap();

        f.controller.services.scanner = Box::new(FakeScanner(Err("lspci missing".to_string())));
        assert!(matches!(
            f.controller.refresh(),
            Err(DomainError::ScanFailure { .. })
        ));
        assert!(f.controller.hardware().is_empty());
        assert!(f.controller.candidates().is_empty());
    }

    #[test]
    fn test_find_candidate_by_spec_or_name() {
        let mut f = ControllerFixture::new(Ok(amd_and_audio()), FakePackageManager::new(), 0);
        f.controller.refresh().unwrap();

        assert_eq!(f.controller.find_candidate("mesa  lib32-mesa").unwrap(), 0);
        assert_eq!(f.controller.find_candidate("lib32-vulkan-radeon").unwrap(), 1);
        assert!(matches!(
            f.controller.find_candidate("nvidia"),
            Err(DomainError::CandidateNotFound(_))
        ));
    }

    #[test]
    fn test_install_updates_local_state_only() {
        let mut f = ControllerFixture::new(Ok(amd_and_audio()), FakePackageManager::new(), 0);
        f.controller.refresh().unwrap();
        let queries_before = f.package_manager.queries().len();

        let index = f.controller.find_candidate("vulkan-radeon").unwrap();
        f.controller.install_at(index).unwrap();

        let candidate = &f.controller.candidates()[index];
        assert!(candidate.is_installed);
        assert_eq!(candidate.installed_version, InstalledVersion::Unknown);
        assert_eq!(f.package_manager.queries().len(), queries_before);
    }

    #[test]
    fn test_batch_continues_after_failure() {
        let pm = FakePackageManager::new().with_failing_install("mesa lib32-mesa", 1);
        let mut f = ControllerFixture::new(Ok(amd_and_audio()), pm, 0);
        f.controller.refresh().unwrap();

        let pending = f.controller.pending_recommended();
        assert_eq!(pending, vec![0, 1, 3]);

        let reports = f.controller.install_batch(&pending);
        assert_eq!(reports.len(), 3);
        assert!(reports[0].result.is_err());
        assert!(reports[1].result.is_ok());
        assert!(reports[2].result.is_ok());
        assert_eq!(
            f.package_manager.installs(),
            vec![
                "mesa lib32-mesa",
                "vulkan-radeon lib32-vulkan-radeon",
                "sof-firmware alsa-firmware alsa-ucm-conf"
            ]
        );
        assert!(!f.controller.candidates()[0].is_installed);
    }

    #[test]
    fn test_unprivileged_install_is_rejected() {
        let mut f = ControllerFixture::new(Ok(amd_and_audio()), FakePackageManager::new(), 1000);
        f.controller.refresh().unwrap();
        assert!(matches!(
            f.controller.install_at(0),
            Err(DomainError::PrivilegeFailure { euid: 1000, .. })
        ));
        assert!(f.package_manager.installs().is_empty());
    }

    #[test]
    fn test_install_at_out_of_range() {
        let mut f = ControllerFixture::new(Ok(Vec::new()), FakePackageManager::new(), 0);
        assert!(matches!(
            f.controller.install_at(3),
            Err(DomainError::CandidateNotFound(_))
        ));
    }

    #[test]
    fn test_reboot_runs_configured_command() {
        let f = ControllerFixture::new(Ok(Vec::new()), FakePackageManager::new(), 0);
        f.runner.respond("systemctl reboot", exit(0, ""));
        f.controller.reboot().unwrap();
        assert_eq!(f.runner.command_lines(), vec!["systemctl reboot"]);
    }

    #[test]
    fn test_paths_come_from_config_store() {
        let f = ControllerFixture::new(Ok(Vec::new()), FakePackageManager::new(), 0);
        assert!(f.controller.config_path().ends_with("config.toml"));
        assert!(f.controller.logs_dir().contains("logs"));
    }
}
