use std::ffi::OsString;
use std::fmt::Display;
use std::os::unix::process::CommandExt;
use std::process::Command;

use crate::domain::DomainError;

/// Escalation helpers, tried in order.
pub const ESCALATION_PROGRAMS: [&str; 2] = ["pkexec", "sudo"];

/// Build the argv for re-running the current executable through `helper`.
pub fn escalation_argv(helper: &str, exe: OsString, args: &[OsString]) -> Vec<OsString> {
    let mut argv = Vec::with_capacity(args.len() + 2);
    argv.push(OsString::from(helper));
    argv.push(exe);
    argv.extend(args.iter().cloned());
    argv
}

fn helper_failed(helper: &str, err: &dyn Display) -> String {
    format!("{} failed ({}), trying the next helper", helper, err)
}

/// Replace this process with an elevated copy of itself.
///
/// Only returns when no helper could be executed.
pub fn relaunch_elevated(args: &[OsString]) -> DomainError {
    let exe = match std::env::current_exe() {
        Ok(exe) => exe.into_os_string(),
        Err(e) => return DomainError::Io(format!("Cannot locate current executable: {}", e)),
    };

    let mut reasons = Vec::new();
    for helper in ESCALATION_PROGRAMS {
        let program = match which::which(helper) {
            Ok(program) => program,
            Err(e) => {
                reasons.push(format!("{}: {}", helper, e));
                continue;
            }
        };

        let argv = escalation_argv(helper, exe.clone(), args);
        // Logging is not initialized yet; report on stderr.
        eprintln!("Root privileges required, re-running through {}", helper);
        let err = Command::new(program).args(&argv[1..]).exec();
        eprintln!("{}", helper_failed(helper, &err));
        reasons.push(format!("{}: {}", helper, err));
    }

    DomainError::CommandLaunch {
        command: ESCALATION_PROGRAMS.join(", "),
        reason: reasons.join("; "),
    }
}
