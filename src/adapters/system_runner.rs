use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::domain::DomainError;
use crate::ports::{CommandOutput, CommandRequest, CommandRunner, OutputMode};

/// Time a timed-out child gets to exit after SIGTERM before SIGKILL.
const TERM_GRACE: Duration = Duration::from_secs(5);

/// Time output pipes get to reach end of file once the child has exited.
const PIPE_GRACE: Duration = Duration::from_secs(1);

/// Runs commands as real child processes with a bounded wait.
///
/// Callers stay synchronous; a private current-thread runtime drives the
/// timed waits.
pub struct SystemCommandRunner {
    runtime: Runtime,
}

impl SystemCommandRunner {
    pub fn new() -> Result<Self, DomainError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| DomainError::Io(format!("Failed to create process runtime: {}", e)))?;
        Ok(Self { runtime })
    }

    async fn run_async(request: &CommandRequest) -> Result<CommandOutput, DomainError> {
        let command_line = request.to_string();

        let program = which::which(&request.program).map_err(|e| DomainError::CommandLaunch {
            command: command_line.clone(),
            reason: format!("'{}' not found on PATH: {}", request.program, e),
        })?;

        let mut command = Command::new(&program);
        command
            .args(&request.args)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        match request.output {
            OutputMode::Capture => {
                command.stdout(Stdio::piped()).stderr(Stdio::piped());
            }
            OutputMode::Inherit => {
                command.stdout(Stdio::inherit()).stderr(Stdio::inherit());
            }
        }

        debug!(
            command = %command_line,
            timeout_secs = request.timeout.as_secs(),
            "Running command"
        );

        let mut child = command.spawn().map_err(|e| DomainError::CommandLaunch {
            command: command_line.clone(),
            reason: e.to_string(),
        })?;
        let stdout = PipeReader::spawn(child.stdout.take());
        let stderr = PipeReader::spawn(child.stderr.take());

        // Only the child's own exit is bounded; descendants may keep the pipes open.
        let waited = timeout(request.timeout, child.wait()).await;
        match waited {
            Ok(Ok(status)) => {
                debug!(command = %command_line, exit_code = ?status.code(), "Command finished");
                Ok(CommandOutput {
                    exit_code: status.code(),
                    stdout: stdout.finish().await,
                    stderr: stderr.finish().await,
                })
            }
            Ok(Err(e)) => {
                stdout.abort();
                stderr.abort();
                Err(DomainError::CommandLaunch {
                    command: command_line,
                    reason: format!("failed to wait for process: {}", e),
                })
            }
            Err(_) => {
                warn!(
                    command = %command_line,
                    timeout_secs = request.timeout.as_secs(),
                    "Command timed out, terminating"
                );
                terminate(&mut child).await;
                stdout.abort();
                stderr.abort();
                Err(DomainError::CommandTimeout {
                    command: command_line,
                    timeout_secs: request.timeout.as_secs(),
                })
            }
        }
    }
}

impl CommandRunner for SystemCommandRunner {
    fn run(&self, request: &CommandRequest) -> Result<CommandOutput, DomainError> {
        self.runtime.block_on(Self::run_async(request))
    }
}

/// Background reader collecting one output pipe of a child.
struct PipeReader {
    buffer: Arc<Mutex<Vec<u8>>>,
    task: Option<JoinHandle<()>>,
}

impl PipeReader {
    fn spawn<R>(pipe: Option<R>) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let task = pipe.map(|mut pipe| {
            let sink = buffer.clone();
            tokio::spawn(async move {
                let mut chunk = [0u8; 4096];
                loop {
                    let n = match pipe.read(&mut chunk).await {
                        Ok(0) => break,
                        Ok(n) => n,
                        Err(e) => {
                            debug!(error = %e, "Failed to read command output");
                            break;
                        }
                    };
                    sink.lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .extend_from_slice(&chunk[..n]);
                }
            })
        });
        Self { buffer, task }
    }

    /// Wait up to `PIPE_GRACE` for end of output, then return what was read.
    async fn finish(mut self) -> String {
        if let Some(mut task) = self.task.take() {
            if timeout(PIPE_GRACE, &mut task).await.is_err() {
                debug!("Output pipe still open after exit, keeping what was read");
                task.abort();
            }
        }
        let buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        let text = String::from_utf8_lossy(&buffer).into_owned();
        text
    }

    fn abort(self) {
        if let Some(task) = self.task {
            task.abort();
        }
    }
}

/// SIGTERM first, SIGKILL if the child is still around after the grace period.
async fn terminate(child: &mut Child) {
    if let Some(pid) = child.id() {
        match signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
            Ok(()) => {
                if timeout(TERM_GRACE, child.wait()).await.is_ok() {
                    return;
                }
            }
            // Already gone; just reap it.
            Err(nix::errno::Errno::ESRCH) => {
                let _ = child.wait().await;
                return;
            }
            Err(e) => debug!(pid, error = %e, "SIGTERM failed"),
        }
    }

    if let Err(e) = child.kill().await {
        warn!(error = %e, "Failed to kill timed-out command");
    }
}
