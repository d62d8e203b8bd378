use crate::config::VerifyConfig;
use crate::error::ExecutionError;
use std::path::PathBuf;
use tokio::time::{self, Duration};
use tokio_util::sync::CancellationToken;

/// Post-apply smoke check: the playbook is expected to leave an artifact behind.
#[derive(Debug, Clone)]
pub struct ArtifactVerifier {
    path: PathBuf,
    contains: Option<String>,
    settle: Duration,
}

impl ArtifactVerifier {
    pub fn new(path: PathBuf, contains: Option<String>, settle: Duration) -> Self {
        Self {
            path,
            contains,
            settle,
        }
    }

    pub fn from_config(config: &VerifyConfig) -> Self {
        Self::new(
            PathBuf::from(shellexpand::tilde(&config.path).into_owned()),
            config.contains.clone(),
            Duration::from_millis(config.settle_ms),
        )
    }

    pub async fn verify(&self, cancel: &CancellationToken) -> Result<(), ExecutionError> {
        if !self.settle.is_zero() {
            tokio::select! {
                () = cancel.cancelled() => return Err(ExecutionError::Cancelled),
                () = time::sleep(self.settle) => {}
            }
        }

        let content = match tokio::fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ExecutionError::VerificationFailed(format!(
                    "expected {} was not created",
                    self.path.display()
                )));
            }
            Err(e) => {
                return Err(ExecutionError::VerificationFailed(format!(
                    "cannot read {}: {e}",
                    self.path.display()
                )));
            }
        };

        if let Some(needle) = &self.contains
            && !String::from_utf8_lossy(&content).contains(needle.as_str())
        {
            return Err(ExecutionError::VerificationFailed(format!(
                "{} does not contain {needle:?}",
                self.path.display()
            )));
        }

        tracing::info!(
            path = %self.path.display(),
            bytes = content.len(),
            "post-apply verification passed"
        );
        Ok(())
    }
}
