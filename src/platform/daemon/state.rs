use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, serde::Serialize)]
pub(super) struct DaemonStatus {
    #[serde(flatten)]
    snapshot: serde_json::Map<String, serde_json::Value>,
    written_at: String,
}

fn render_status() -> Vec<u8> {
    let mut json = crate::diagnostics::health::snapshot_json();
    if let Some(snapshot) = json.as_object().cloned() {
        let status = DaemonStatus {
            snapshot,
            written_at: Utc::now().to_rfc3339(),
        };
        json = serde_json::to_value(status).unwrap_or_else(|_| serde_json::json!({}));
    }
    serde_json::to_vec_pretty(&json).unwrap_or_else(|_| b"{}".to_vec())
}

pub(super) async fn write_status(path: &Path) {
    if let Err(error) = tokio::fs::write(path, render_status()).await {
        tracing::warn!(%error, path = %path.display(), "failed to write daemon state file");
    }
}

/// Flush the health snapshot every `every` until cancelled, then once more
/// so the file reflects the final state.
pub(super) fn spawn_state_writer(
    path: PathBuf,
    every: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Some(parent) = path.parent()
            && let Err(error) = tokio::fs::create_dir_all(parent).await
        {
            tracing::warn!(%error, "failed to create state file directory");
        }

        let mut interval = tokio::time::interval(every);
        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = interval.tick() => write_status(&path).await,
            }
        }
        write_status(&path).await;
    })
}
