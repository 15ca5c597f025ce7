//! Test doubles for the ports.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::adapters::catalog_loader::builtin_catalog;
use crate::adapters::TomlConfigStore;
use crate::app::{AppController, Services};
use crate::domain::{
    AppConfig, CatalogPolicy, DomainError, HardwareCategory, HardwareRecord, PackageSpec,
};
use crate::ports::{
    CommandOutput, CommandRequest, CommandRunner, HardwareScanner, ModuleRegenerator,
    PackageManager, PrivilegeProbe,
};

pub fn exit(code: i32, stdout: &str) -> CommandOutput {
    CommandOutput {
        exit_code: Some(code),
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

pub fn record(category: HardwareCategory, vendor: &str, bus_id: &str) -> HardwareRecord {
    HardwareRecord {
        category,
        vendor: vendor.to_string(),
        device_description: format!("{} device", vendor),
        bus_id: bus_id.to_string(),
    }
}

#[derive(Clone)]
enum Scripted {
    Output(CommandOutput),
    LaunchFailure,
    Timeout,
}

/// Command runner answering from a script keyed by the full command line.
///
/// Unscripted commands fail to launch.
#[derive(Clone, Default)]
pub struct ScriptedRunner {
    script: Arc<Mutex<HashMap<String, Scripted>>>,
    calls: Arc<Mutex<Vec<CommandRequest>>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, command_line: &str, output: CommandOutput) -> &Self {
        self.script
            .lock()
            .unwrap()
            .insert(command_line.to_string(), Scripted::Output(output));
        self
    }

    pub fn fail_launch(&self, command_line: &str) -> &Self {
        self.script
            .lock()
            .unwrap()
            .insert(command_line.to_string(), Scripted::LaunchFailure);
        self
    }

    pub fn time_out(&self, command_line: &str) -> &Self {
        self.script
            .lock()
            .unwrap()
            .insert(command_line.to_string(), Scripted::Timeout);
        self
    }

    pub fn calls(&self) -> Vec<CommandRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(ToString::to_string).collect()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, request: &CommandRequest) -> Result<CommandOutput, DomainError> {
        self.calls.lock().unwrap().push(request.clone());
        let command = request.to_string();
        let scripted = self.script.lock().unwrap().get(&command).cloned();
        match scripted {
            Some(Scripted::Output(output)) => Ok(output),
            Some(Scripted::Timeout) => Err(DomainError::CommandTimeout {
                command,
                timeout_secs: request.timeout.as_secs(),
            }),
            Some(Scripted::LaunchFailure) | None => Err(DomainError::CommandLaunch {
                command,
                reason: "not found".to_string(),
            }),
        }
    }
}

#[derive(Default)]
struct PackageState {
    versions: HashMap<String, String>,
    broken_queries: HashSet<String>,
    broken_versions: HashSet<String>,
    failing_installs: HashMap<String, i32>,
    refresh_fails: bool,
    refreshes: usize,
    installs: Vec<String>,
    queries: Vec<String>,
}

/// In-memory package manager.
#[derive(Clone, Default)]
pub struct FakePackageManager {
    state: Arc<Mutex<PackageState>>,
}

impl FakePackageManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_installed(self, name: &str, version: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .versions
            .insert(name.to_string(), version.to_string());
        self
    }

    pub fn with_broken_query(self, name: &str) -> Self {
        self.state.lock().unwrap().broken_queries.insert(name.to_string());
        self
    }

    pub fn with_broken_version(self, name: &str) -> Self {
        self.state.lock().unwrap().broken_versions.insert(name.to_string());
        self
    }

    pub fn with_failing_install(self, spec: &str, exit_status: i32) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing_installs
            .insert(spec.to_string(), exit_status);
        self
    }

    pub fn with_failing_refresh(self) -> Self {
        self.state.lock().unwrap().refresh_fails = true;
        self
    }

    pub fn installs(&self) -> Vec<String> {
        self.state.lock().unwrap().installs.clone()
    }

    pub fn refreshes(&self) -> usize {
        self.state.lock().unwrap().refreshes
    }

    pub fn queries(&self) -> Vec<String> {
        self.state.lock().unwrap().queries.clone()
    }

    /// Total number of calls of any verb.
    pub fn total_calls(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.refreshes + state.installs.len() + state.queries.len()
    }
}

impl PackageManager for FakePackageManager {
    fn is_installed(&self, name: &str) -> Result<bool, DomainError> {
        let mut state = self.state.lock().unwrap();
        state.queries.push(name.to_string());
        if state.broken_queries.contains(name) {
            return Err(DomainError::QueryDegraded {
                package: name.to_string(),
                reason: "query failed".to_string(),
            });
        }
        Ok(state.versions.contains_key(name))
    }

    fn installed_version(&self, name: &str) -> Result<String, DomainError> {
        let mut state = self.state.lock().unwrap();
        state.queries.push(name.to_string());
        if state.broken_versions.contains(name) {
            return Err(DomainError::QueryDegraded {
                package: name.to_string(),
                reason: "version query failed".to_string(),
            });
        }
        state
            .versions
            .get(name)
            .cloned()
            .ok_or_else(|| DomainError::QueryDegraded {
                package: name.to_string(),
                reason: "not installed".to_string(),
            })
    }

    fn refresh_index(&self) -> Result<(), DomainError> {
        let mut state = self.state.lock().unwrap();
        state.refreshes += 1;
        if state.refresh_fails {
            return Err(DomainError::CommandFailed {
                command: "pacman -Sy".to_string(),
                exit_status: Some(1),
            });
        }
        Ok(())
    }

    fn install(&self, spec: &PackageSpec) -> Result<(), DomainError> {
        let mut state = self.state.lock().unwrap();
        state.installs.push(spec.to_string());
        if let Some(code) = state.failing_installs.get(spec.as_str()).copied() {
            return Err(DomainError::InstallFailure {
                package_spec: spec.to_string(),
                command: format!("pacman -S {}", spec),
                exit_status: Some(code),
            });
        }
        for name in spec.names() {
            state.versions.insert(name.to_string(), "1.0-1".to_string());
        }
        Ok(())
    }
}

pub struct FakePrivilege(pub u32);

impl PrivilegeProbe for FakePrivilege {
    fn effective_uid(&self) -> u32 {
        self.0
    }
}

#[derive(Clone, Default)]
pub struct FakeRegenerator {
    fails: bool,
    calls: Arc<Mutex<usize>>,
}

impl FakeRegenerator {
    pub fn failing() -> Self {
        Self {
            fails: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl ModuleRegenerator for FakeRegenerator {
    fn regenerate(&self) -> Result<(), DomainError> {
        *self.calls.lock().unwrap() += 1;
        if self.fails {
            return Err(DomainError::CommandFailed {
                command: self.command_line(),
                exit_status: Some(1),
            });
        }
        Ok(())
    }

    fn command_line(&self) -> String {
        "mkinitcpio -P".to_string()
    }
}

pub struct FakeScanner(pub Result<Vec<HardwareRecord>, String>);

impl HardwareScanner for FakeScanner {
    fn scan(&self) -> Result<Vec<HardwareRecord>, DomainError> {
        self.0.clone().map_err(|reason| DomainError::ScanFailure {
            command: "lspci".to_string(),
            reason,
        })
    }
}

/// Controller over the complete built-in catalog, wired to fakes, with its
/// config store in a temporary directory.
pub struct ControllerFixture {
    pub controller: AppController,
    pub package_manager: FakePackageManager,
    pub runner: ScriptedRunner,
    pub regenerator: FakeRegenerator,
    _dir: tempfile::TempDir,
}

impl ControllerFixture {
    pub fn new(
        hardware: Result<Vec<HardwareRecord>, String>,
        package_manager: FakePackageManager,
        euid: u32,
    ) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = TomlConfigStore::with_path(dir.path().join("config.toml")).unwrap();
        let runner = ScriptedRunner::new();
        let regenerator = FakeRegenerator::default();
        let services = Services {
            scanner: Box::new(FakeScanner(hardware)),
            package_manager: Box::new(package_manager.clone()),
            privilege: Box::new(FakePrivilege(euid)),
            regenerator: Box::new(regenerator.clone()),
            runner: Arc::new(runner.clone()),
        };
        let controller = AppController::with_services(
            AppConfig::new(),
            Box::new(store),
            builtin_catalog(CatalogPolicy::Complete).unwrap(),
            services,
        );
        Self {
            controller,
            package_manager,
            runner,
            regenerator,
            _dir: dir,
        }
    }
}
