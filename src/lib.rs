#![forbid(unsafe_code)]

pub mod adapters;
pub mod app;
mod commands;
pub mod domain;
mod infrastructure;
pub mod ports;

#[cfg(test)]
mod testing;

use std::process::ExitCode;

use clap::Parser;

use adapters::EffectiveUidProbe;
use app::AppController;
use commands::{dispatch, Cli, Commands};
use ports::PrivilegeProbe;

/// Entry point for the `sysdrivers` binary.
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let command = cli.subcommand();

    // Installing needs root; re-run through pkexec or sudo before any state is touched
    if let Commands::Install(args) = &command {
        if !args.no_escalate && !EffectiveUidProbe.is_elevated() {
            let forwarded: Vec<_> = std::env::args_os().skip(1).collect();
            let err = infrastructure::relaunch_elevated(&forwarded);
            eprintln!("Error: {}", err);
            eprintln!("Please run with: sudo sysdrivers install ...");
            return ExitCode::FAILURE;
        }
    }

    // Initialize the application controller
    let mut controller = match AppController::new(cli.launch_options()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to initialize application: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match dispatch(&mut controller, command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
