use crate::error::SourceError;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use tokio_util::sync::CancellationToken;

/// Opaque identifier of a point-in-time state of the tracked branch
/// (a commit hash for git).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Revision(String);

impl Revision {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for log lines.
    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of bringing the working copy up to date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub revision: Revision,
    /// Whether the visible content differs from before this sync.
    pub changed: bool,
}

pub type SyncFuture<'a> = Pin<Box<dyn Future<Output = Result<SyncOutcome, SourceError>> + Send + 'a>>;

/// Owner of the local working copy of one remote branch.
///
/// Implementations exhaust their own retry budget before returning; the
/// engine only ever sees the final outcome of a `sync` call.
pub trait SourceTracker: Send + Sync {
    /// Human-readable tracker name (e.g. "git").
    fn name(&self) -> &str;

    /// Filesystem root of the working copy. Stable for the tracker's lifetime.
    fn path(&self) -> &Path;

    /// Create or update the working copy to match the remote branch head.
    fn sync<'a>(&'a self, cancel: &'a CancellationToken) -> SyncFuture<'a>;
}
