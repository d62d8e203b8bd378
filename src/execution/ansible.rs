use super::traits::{ExecutionFuture, ExecutionTrigger};
use super::verify::ArtifactVerifier;
use crate::config::ExecutionConfig;
use crate::error::ExecutionError;
use crate::runtime::process::{CapturedOutput, RunError, run_captured};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Runs `ansible-playbook` against the working copy.
///
/// Tool availability is checked before the first run and cached once it
/// succeeds, so a missing installation is reported per cycle until fixed.
pub struct AnsibleTrigger {
    settings: ExecutionConfig,
    verifier: Option<ArtifactVerifier>,
    tools_verified: AtomicBool,
}

impl AnsibleTrigger {
    pub fn new(settings: ExecutionConfig) -> Self {
        let verifier = settings.verify.as_ref().map(ArtifactVerifier::from_config);
        Self {
            settings,
            verifier,
            tools_verified: AtomicBool::new(false),
        }
    }

    /// Absolute path of the playbook inside `working_copy`.
    pub fn entry_point(&self, working_copy: &Path) -> PathBuf {
        working_copy
            .join(&self.settings.playbook_dir)
            .join(&self.settings.playbook)
    }

    /// Inline host lists (containing a comma) pass through; paths resolve
    /// against the working copy.
    fn inventory_arg(&self, working_copy: &Path) -> OsString {
        let inventory = self.settings.inventory.trim();
        if inventory.contains(',') || Path::new(inventory).is_absolute() {
            OsString::from(inventory)
        } else {
            working_copy.join(inventory).into_os_string()
        }
    }

    pub(crate) fn playbook_args(&self, working_copy: &Path) -> Vec<OsString> {
        let mut args = vec![OsString::from("-i"), self.inventory_arg(working_copy)];
        if let Some(connection) = self.settings.connection.as_deref().filter(|c| !c.is_empty()) {
            args.push("--connection".into());
            args.push(connection.into());
        }
        args.extend(self.settings.extra_args.iter().map(OsString::from));
        args.push(self.entry_point(working_copy).into_os_string());
        args
    }

    async fn check_tool(&self, tool: &str, cancel: &CancellationToken) -> Result<(), ExecutionError> {
        let mut command = Command::new(tool);
        command.arg("--version");

        let output = match run_captured(command, cancel).await {
            Ok(output) => output,
            Err(RunError::Cancelled) => return Err(ExecutionError::Cancelled),
            Err(error) => {
                return Err(ExecutionError::ToolUnavailable {
                    tool: tool.to_string(),
                    message: error.to_string(),
                });
            }
        };

        if !output.success() {
            return Err(ExecutionError::ToolUnavailable {
                tool: tool.to_string(),
                message: format!("`{tool} --version` exited with {}", output.status),
            });
        }

        tracing::info!(tool, version = %output.first_line(), "tool verified");
        Ok(())
    }

    async fn preflight_inner(&self, cancel: &CancellationToken) -> Result<(), ExecutionError> {
        if self.tools_verified.load(Ordering::Acquire) {
            return Ok(());
        }
        self.check_tool(&self.settings.ansible_command, cancel).await?;
        self.check_tool(&self.settings.playbook_command, cancel).await?;
        self.tools_verified.store(true, Ordering::Release);
        Ok(())
    }

    async fn run_playbook(
        &self,
        working_copy: &Path,
        cancel: &CancellationToken,
    ) -> Result<CapturedOutput, ExecutionError> {
        let mut command = Command::new(&self.settings.playbook_command);
        command
            .args(self.playbook_args(working_copy))
            .current_dir(working_copy)
            .env("ANSIBLE_HOST_KEY_CHECKING", "False")
            .envs(&self.settings.env);

        match run_captured(command, cancel).await {
            Ok(output) => Ok(output),
            Err(RunError::Cancelled) => Err(ExecutionError::Cancelled),
            Err(error) => {
                // The binary vanished after preflight; check again next time.
                self.tools_verified.store(false, Ordering::Release);
                Err(ExecutionError::ToolUnavailable {
                    tool: self.settings.playbook_command.clone(),
                    message: error.to_string(),
                })
            }
        }
    }

    async fn apply_inner(
        &self,
        working_copy: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), ExecutionError> {
        self.preflight_inner(cancel).await?;

        let entry = self.entry_point(working_copy);
        match tokio::fs::try_exists(&entry).await {
            Ok(true) => {}
            Ok(false) => {
                return Err(ExecutionError::EntryPointMissing {
                    path: entry.display().to_string(),
                });
            }
            Err(source) => {
                return Err(ExecutionError::EntryPointUnreadable {
                    path: entry.display().to_string(),
                    source,
                });
            }
        }

        tracing::info!(playbook = %entry.display(), "starting playbook run");
        let started = Instant::now();
        let output = self.run_playbook(working_copy, cancel).await?;
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        if !output.success() {
            return Err(ExecutionError::apply_failed(
                output.status,
                &output.stdout,
                &output.stderr,
            ));
        }

        tracing::debug!(stdout = %output.stdout, stderr = %output.stderr, "playbook output");
        tracing::info!(duration_ms, "playbook run succeeded");

        if let Some(verifier) = &self.verifier {
            verifier.verify(cancel).await?;
        }
        Ok(())
    }
}

impl ExecutionTrigger for AnsibleTrigger {
    fn name(&self) -> &str {
        "ansible"
    }

    fn preflight<'a>(&'a self, cancel: &'a CancellationToken) -> ExecutionFuture<'a> {
        Box::pin(self.preflight_inner(cancel))
    }

    fn apply<'a>(
        &'a self,
        working_copy: &'a Path,
        cancel: &'a CancellationToken,
    ) -> ExecutionFuture<'a> {
        Box::pin(self.apply_inner(working_copy, cancel))
    }
}
