use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Exit status plus captured output of a finished child process.
#[derive(Debug, Clone)]
pub(crate) struct CapturedOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CapturedOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// First non-empty stdout line, falling back to stderr.
    pub fn first_line(&self) -> &str {
        self.stdout
            .lines()
            .chain(self.stderr.lines())
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default()
    }

    pub fn stderr_or_stdout(&self) -> &str {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim()
        } else {
            stderr
        }
    }
}

#[derive(Debug)]
pub(crate) enum RunError {
    Spawn(std::io::Error),
    Wait(std::io::Error),
    Cancelled,
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spawn(e) => write!(f, "failed to spawn: {e}"),
            Self::Wait(e) => write!(f, "failed to collect output: {e}"),
            Self::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Run `command` to completion with stdout/stderr captured.
///
/// The child is killed if `cancel` fires first or if the returned future is
/// dropped (e.g. by an enclosing timeout).
pub(crate) async fn run_captured(
    mut command: Command,
    cancel: &CancellationToken,
) -> Result<CapturedOutput, RunError> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    if cancel.is_cancelled() {
        return Err(RunError::Cancelled);
    }
    let child = command.spawn().map_err(RunError::Spawn)?;

    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(RunError::Cancelled),
        output = child.wait_with_output() => {
            let output = output.map_err(RunError::Wait)?;
            Ok(CapturedOutput {
                status: output.status,
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
    }
}
