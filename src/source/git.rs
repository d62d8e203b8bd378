use super::auth::RemoteCredentials;
use super::retry::RetryPolicy;
use super::traits::{Revision, SourceTracker, SyncFuture, SyncOutcome};
use crate::config::Config;
use crate::error::SourceError;
use crate::runtime::process::{CapturedOutput, RunError, run_captured};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Tracks one branch of a remote repository through the `git` CLI.
pub struct GitSourceTracker {
    remote: RemoteCredentials,
    branch: String,
    path: PathBuf,
    git_command: String,
    retry: RetryPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkingCopy {
    Missing,
    Repository,
    NotARepository,
}

impl GitSourceTracker {
    pub(crate) fn new(
        remote: RemoteCredentials,
        branch: String,
        path: PathBuf,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            remote,
            branch,
            path,
            git_command: "git".into(),
            retry,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            RemoteCredentials::new(&config.source.url, &config.source.auth),
            config.source.branch.clone(),
            config.working_copy_path(),
            RetryPolicy::from_config(&config.reliability),
        )
    }

    pub fn remote_display(&self) -> &str {
        self.remote.display_url()
    }

    fn inspect(&self) -> WorkingCopy {
        if !self.path.exists() {
            return WorkingCopy::Missing;
        }
        if self.path.join(".git").exists() {
            return WorkingCopy::Repository;
        }
        let is_empty_dir = std::fs::read_dir(&self.path)
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(false);
        if is_empty_dir {
            WorkingCopy::Missing
        } else {
            WorkingCopy::NotARepository
        }
    }

    async fn git(
        &self,
        operation: &str,
        args: &[&str],
        cwd: Option<&Path>,
        cancel: &CancellationToken,
    ) -> Result<CapturedOutput, SourceError> {
        let mut command = Command::new(&self.git_command);
        if let Some(dir) = cwd {
            command.arg("-C").arg(dir);
        }
        command.args(args).env("GIT_TERMINAL_PROMPT", "0");

        match run_captured(command, cancel).await {
            Ok(output) => Ok(output),
            Err(RunError::Cancelled) => Err(SourceError::Cancelled),
            Err(error) => Err(SourceError::Unavailable {
                operation: operation.to_string(),
                message: format!("{} {error}", self.git_command),
            }),
        }
    }

    fn unavailable(&self, operation: &str, output: &CapturedOutput) -> SourceError {
        SourceError::Unavailable {
            operation: operation.to_string(),
            message: self.remote.redact(output.stderr_or_stdout()),
        }
    }

    fn corrupt(&self, message: impl Into<String>) -> SourceError {
        SourceError::Corrupt {
            path: self.path.display().to_string(),
            message: self.remote.redact(&message.into()),
        }
    }

    async fn head(&self, cancel: &CancellationToken) -> Result<Revision, SourceError> {
        let output = self
            .git("rev-parse", &["rev-parse", "HEAD"], Some(&self.path), cancel)
            .await?;
        let id = output.stdout.trim();
        if !output.success() || id.is_empty() || !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(self.corrupt(format!(
                "cannot resolve HEAD: {}",
                output.stderr_or_stdout()
            )));
        }
        Ok(Revision::new(id))
    }

    async fn clone_once(&self, cancel: &CancellationToken) -> Result<Revision, SourceError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.corrupt(format!("cannot create parent directory: {e}")))?;
        }

        let target = self.path.to_string_lossy();
        let output = self
            .git(
                "clone",
                &[
                    "clone",
                    "--quiet",
                    "--branch",
                    self.branch.as_str(),
                    "--single-branch",
                    self.remote.fetch_url(),
                    &*target,
                ],
                None,
                cancel,
            )
            .await?;
        if !output.success() {
            // A half-written clone would look corrupt on the next attempt.
            if self.path.join(".git").exists() {
                let _ = tokio::fs::remove_dir_all(&self.path).await;
            }
            return Err(self.unavailable("clone", &output));
        }

        // Keep credentials out of .git/config.
        let scrub = self
            .git(
                "remote",
                &["remote", "set-url", "origin", self.remote.display_url()],
                Some(&self.path),
                cancel,
            )
            .await?;
        if !scrub.success() {
            tracing::warn!(
                stderr = %scrub.stderr_or_stdout(),
                "failed to scrub credentials from origin remote"
            );
        }

        self.head(cancel).await
    }

    async fn clone_fresh(&self, cancel: &CancellationToken) -> Result<SyncOutcome, SourceError> {
        tracing::info!(
            remote = %self.remote.display_url(),
            branch = %self.branch,
            path = %self.path.display(),
            "cloning working copy"
        );
        let revision = self
            .retry
            .run("clone", cancel, |_| self.clone_once(cancel))
            .await?;
        Ok(SyncOutcome {
            revision,
            changed: true,
        })
    }

    async fn update_once(&self, cancel: &CancellationToken) -> Result<SyncOutcome, SourceError> {
        let before = self.head(cancel).await?;

        let fetch = self
            .git(
                "fetch",
                &[
                    "fetch",
                    "--quiet",
                    self.remote.fetch_url(),
                    self.branch.as_str(),
                ],
                Some(&self.path),
                cancel,
            )
            .await?;
        if !fetch.success() {
            return Err(self.unavailable("fetch", &fetch));
        }

        let merge = self
            .git(
                "merge",
                &["merge", "--ff-only", "--quiet", "FETCH_HEAD"],
                Some(&self.path),
                cancel,
            )
            .await?;
        if !merge.success() {
            return Err(self.corrupt(format!(
                "cannot fast-forward to remote {}: {}",
                self.branch,
                merge.stderr_or_stdout()
            )));
        }

        let after = self.head(cancel).await?;
        Ok(SyncOutcome {
            changed: before != after,
            revision: after,
        })
    }

    /// Throw the working copy away and clone it again.
    async fn resync(
        &self,
        reason: &SourceError,
        cancel: &CancellationToken,
    ) -> Result<SyncOutcome, SourceError> {
        tracing::warn!(
            path = %self.path.display(),
            error = %reason,
            "working copy unusable, re-cloning from scratch"
        );
        tokio::fs::remove_dir_all(&self.path)
            .await
            .map_err(|e| self.corrupt(format!("{reason}; removing it failed: {e}")))?;
        self.clone_fresh(cancel).await
    }

    async fn sync_inner(&self, cancel: &CancellationToken) -> Result<SyncOutcome, SourceError> {
        match self.inspect() {
            WorkingCopy::Missing => self.clone_fresh(cancel).await,
            WorkingCopy::NotARepository => {
                let reason = self.corrupt("no .git directory");
                self.resync(&reason, cancel).await
            }
            WorkingCopy::Repository => {
                match self
                    .retry
                    .run("update", cancel, |_| self.update_once(cancel))
                    .await
                {
                    Err(reason @ SourceError::Corrupt { .. }) => self.resync(&reason, cancel).await,
                    other => other,
                }
            }
        }
    }
}

impl SourceTracker for GitSourceTracker {
    fn name(&self) -> &str {
        "git"
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn sync<'a>(&'a self, cancel: &'a CancellationToken) -> SyncFuture<'a> {
        Box::pin(self.sync_inner(cancel))
    }
}
