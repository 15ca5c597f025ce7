//! Command-line surface: argument parsing and subcommand handlers.

pub mod prompt;
pub mod render;

use std::collections::HashSet;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use crate::app::{AppController, InstallReport, LaunchOptions};
use crate::domain::{CatalogPolicy, InstallOutcome, PackageSpec};

use self::prompt::prompt_confirmation;

/// Detect PCI hardware and install matching Arch Linux driver packages.
#[derive(Debug, Parser)]
#[command(name = "sysdrivers")]
#[command(about = "Detect hardware and install matching driver packages")]
#[command(version)]
pub struct Cli {
    /// Use this configuration file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Built-in driver catalog: complete or minimal
    #[arg(long, global = true, value_name = "POLICY")]
    pub catalog: Option<CatalogPolicy>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    pub fn launch_options(&self) -> LaunchOptions {
        LaunchOptions {
            config_path: self.config.clone(),
            catalog_policy: self.catalog,
            verbose: self.verbose,
        }
    }

    /// The subcommand to run; `list` when none is given.
    pub fn subcommand(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or(Commands::List { json: false })
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Scan hardware and list matching drivers with their install state
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print the detected hardware
    Scan {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Install driver packages
    Install(InstallArgs),
    /// Print the active driver catalog
    Catalog {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration
    Config,
    /// Print configuration, data and log paths
    Paths,
}

#[derive(Debug, Clone, Args)]
pub struct InstallArgs {
    /// Package specs or package names of listed drivers
    #[arg(value_name = "PACKAGE")]
    pub packages: Vec<String>,

    /// Install every recommended driver that is not installed yet
    #[arg(long)]
    pub recommended: bool,

    /// Do not ask for confirmation
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Reboot without asking when a restart is required
    #[arg(long)]
    pub reboot: bool,

    /// Do not re-run through pkexec or sudo when not root
    #[arg(long)]
    pub no_escalate: bool,
}

impl InstallArgs {
    fn has_selection(&self) -> bool {
        self.recommended || !self.packages.is_empty()
    }
}

/// Run one subcommand against an initialized controller.
pub fn dispatch(controller: &mut AppController, command: Commands) -> Result<ExitCode> {
    match command {
        Commands::List { json } => list(controller, json),
        Commands::Scan { json } => scan(controller, json),
        Commands::Install(args) => install(controller, &args),
        Commands::Catalog { json } => catalog(controller, json),
        Commands::Config => config(controller),
        Commands::Paths => paths(controller),
    }
}

fn list(controller: &mut AppController, json: bool) -> Result<ExitCode> {
    if let Err(e) = controller.refresh() {
        warn!(error = %e, "Hardware scan failed");
        if json {
            println!("[]");
        } else {
            println!("{}", render::NO_HARDWARE);
        }
        return Ok(ExitCode::FAILURE);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(controller.candidates())?);
    } else if controller.hardware().is_empty() {
        println!("{}", render::NO_HARDWARE);
    } else if controller.candidates().is_empty() {
        println!("{}", render::NOTHING_NEEDED);
    } else {
        print!("{}", render::candidate_table(controller.candidates()));
    }
    Ok(ExitCode::SUCCESS)
}

fn scan(controller: &AppController, json: bool) -> Result<ExitCode> {
    let hardware = controller
        .scan_hardware()
        .context("Hardware scan failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&hardware)?);
    } else if hardware.is_empty() {
        println!("{}", render::NO_HARDWARE);
    } else {
        print!("{}", render::hardware_table(&hardware));
    }
    Ok(ExitCode::SUCCESS)
}

fn install(controller: &mut AppController, args: &InstallArgs) -> Result<ExitCode> {
    let run = run_install(controller, args, prompt_confirmation)?;
    info!(
        attempted = run.attempted.len(),
        failed = run.failed,
        rebooting = run.rebooted,
        "Install run finished"
    );
    Ok(exit_code(run.failed))
}

/// What an install run attempted and how it ended.
#[derive(Debug, Default)]
struct InstallRun {
    attempted: Vec<PackageSpec>,
    failed: bool,
    restart_required: bool,
    rebooted: bool,
}

fn run_install<F>(controller: &mut AppController, args: &InstallArgs, mut confirm: F) -> Result<InstallRun>
where
    F: FnMut(&str) -> Result<bool>,
{
    if !args.has_selection() {
        bail!("Name at least one package or pass --recommended");
    }

    controller.refresh().context("Hardware scan failed")?;

    let mut run = InstallRun::default();
    let mut selected = Vec::new();
    if args.recommended {
        selected.extend(controller.pending_recommended());
    }
    for query in &args.packages {
        match controller.find_candidate(query) {
            Ok(index) => selected.push(index),
            Err(e) => {
                eprintln!("{}", e);
                run.failed = true;
            }
        }
    }
    let mut seen = HashSet::new();
    selected.retain(|index| seen.insert(*index));

    if selected.is_empty() {
        if !run.failed {
            println!("{}", render::NOTHING_NEEDED);
        }
        return Ok(run);
    }

    let mut confirmed = Vec::with_capacity(selected.len());
    for index in selected {
        let candidate = &controller.candidates()[index];
        if args.yes
            || confirm(&format!(
                "Install {} ({})?",
                candidate.display_name, candidate.package_spec
            ))?
        {
            confirmed.push(index);
        }
    }

    let reports = controller.install_batch(&confirmed);
    run.attempted = reports.iter().map(|r| r.package_spec.clone()).collect();
    let summary = summarize(&reports);
    run.failed |= summary.failed;
    run.restart_required = summary.restart_required;

    if run.restart_required {
        run.rebooted = offer_reboot(controller, args, &mut confirm)?;
    }
    Ok(run)
}

#[derive(Debug, Default, PartialEq)]
struct BatchSummary {
    failed: bool,
    restart_required: bool,
}

/// Print each install result and fold them into a summary.
fn summarize(reports: &[InstallReport]) -> BatchSummary {
    let mut summary = BatchSummary::default();
    for report in reports {
        match &report.result {
            Ok(outcome) => {
                println!("{}", render::outcome_line(&report.display_name, outcome));
                if let InstallOutcome::Installed {
                    restart_required,
                    warning,
                } = outcome
                {
                    summary.restart_required |= *restart_required;
                    if let Some(warning) = warning {
                        eprintln!("warning: {}", warning);
                    }
                }
            }
            Err(e) => {
                eprintln!("{}: {}", report.display_name, e);
                summary.failed = true;
            }
        }
    }
    summary
}

fn offer_reboot<F>(controller: &AppController, args: &InstallArgs, confirm: &mut F) -> Result<bool>
where
    F: FnMut(&str) -> Result<bool>,
{
    let reboot = args.reboot
        || (!args.yes && confirm("A restart is required to complete installation. Reboot now?")?);
    if reboot {
        controller.reboot().context("Reboot failed")?;
    } else {
        println!("Restart the system to complete installation.");
    }
    Ok(reboot)
}

fn catalog(controller: &AppController, json: bool) -> Result<ExitCode> {
    let catalog = controller.catalog();
    if json {
        let file = crate::domain::catalog::CatalogFile {
            version: catalog.version(),
            drivers: catalog.entries().to_vec(),
        };
        println!("{}", serde_json::to_string_pretty(&file)?);
    } else {
        println!(
            "Catalog version {} ({}, {} entries)",
            catalog.version(),
            controller.config().catalog.policy,
            catalog.len()
        );
        print!("{}", render::catalog_table(catalog.entries()));
    }
    Ok(ExitCode::SUCCESS)
}

fn config(controller: &AppController) -> Result<ExitCode> {
    let content = toml::to_string_pretty(controller.config())
        .context("Failed to serialize configuration")?;
    print!("{}", content);
    Ok(ExitCode::SUCCESS)
}

fn paths(controller: &AppController) -> Result<ExitCode> {
    println!("config: {}", controller.config_path());
    println!("data:   {}", controller.data_dir());
    println!("logs:   {}", controller.logs_dir());
    Ok(ExitCode::SUCCESS)
}

fn exit_code(failed: bool) -> ExitCode {
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
