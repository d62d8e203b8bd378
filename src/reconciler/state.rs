use crate::error::CycleError;
use crate::source::{Revision, SyncOutcome};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Bookkeeping owned exclusively by the engine.
///
/// `last_known_revision` only moves after a successful apply of the revision
/// observed in the same cycle; it starts empty and is never reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilerState {
    last_known_revision: Option<Revision>,
    target_path: PathBuf,
}

impl ReconcilerState {
    pub(super) fn new(target_path: PathBuf) -> Self {
        Self {
            last_known_revision: None,
            target_path,
        }
    }

    pub fn last_known_revision(&self) -> Option<&Revision> {
        self.last_known_revision.as_ref()
    }

    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    /// Apply unless nothing changed and the revision was already applied.
    /// An empty state never matches, so the first successful sync always applies.
    pub fn needs_apply(&self, sync: &SyncOutcome) -> bool {
        sync.changed || self.last_known_revision.as_ref() != Some(&sync.revision)
    }

    pub(super) fn record_applied(&mut self, revision: Revision) {
        self.last_known_revision = Some(revision);
    }
}

/// Engine state machine positions, in the order a cycle visits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    Idle,
    Syncing,
    NoChange,
    Changed,
    Applying,
    RecordRevision,
    CycleFailed,
}

#[derive(Debug)]
pub enum CycleOutcome {
    /// Revision already applied and nothing changed; apply skipped.
    NoChange { revision: Revision },
    /// Apply succeeded and the revision was recorded.
    Applied { revision: Revision, changed: bool },
    /// Sync or apply failed; state untouched.
    Failed(CycleError),
    /// Shutdown requested mid-cycle; state untouched.
    Cancelled,
}

impl CycleOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoChange { .. } => "no_change",
            Self::Applied { .. } => "applied",
            Self::Failed(_) => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn revision(&self) -> Option<&Revision> {
        match self {
            Self::NoChange { revision } | Self::Applied { revision, .. } => Some(revision),
            Self::Failed(_) | Self::Cancelled => None,
        }
    }

    pub fn error(&self) -> Option<&CycleError> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }
}

/// What happened during one cycle.
#[derive(Debug)]
pub struct CycleReport {
    pub cycle: u64,
    pub phases: Vec<Phase>,
    pub outcome: CycleOutcome,
    pub duration: Duration,
}
