use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `ansiblegitops`.
///
/// Each subsystem defines its own error type. The reconciliation engine
/// matches on these to decide whether a failure is per-cycle (log, skip the
/// state update, sleep, continue) or fatal at startup; command handlers keep
/// using `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum GitopsError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Source tracking ─────────────────────────────────────────────────
    #[error("source: {0}")]
    Source(#[from] SourceError),

    // ── Execution ───────────────────────────────────────────────────────
    #[error("execution: {0}")]
    Execution(#[from] ExecutionError),

    // ── Engine cycle ────────────────────────────────────────────────────
    #[error("cycle: {0}")]
    Cycle(#[from] CycleError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GitopsError {
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Config(_) => Some(ErrorKind::ConfigInvalid),
            Self::Source(e) => Some(e.kind()),
            Self::Execution(e) => Some(e.kind()),
            Self::Cycle(e) => Some(e.kind()),
            Self::Other(_) => None,
        }
    }
}

/// Failure taxonomy shared by every stage. Rendered snake_case in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    SourceUnavailable,
    SourceCorrupt,
    ToolUnavailable,
    EntryPointMissing,
    ApplyFailed,
    VerificationFailed,
    ConfigInvalid,
    Timeout,
    Cancelled,
}

impl ErrorKind {
    /// Everything except an invalid configuration is handled per cycle.
    pub fn is_recoverable(self) -> bool {
        !matches!(self, Self::ConfigInvalid)
    }
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found (searched: {searched})")]
    NotFound { searched: String },

    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Source errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SourceError {
    /// Network or authentication failure reaching the remote.
    #[error("remote unavailable during {operation}: {message}")]
    Unavailable { operation: String, message: String },

    /// The working copy exists but is not a usable repository.
    #[error("working copy at {path} is corrupt: {message}")]
    Corrupt { path: String, message: String },

    #[error("sync cancelled")]
    Cancelled,
}

impl SourceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unavailable { .. } => ErrorKind::SourceUnavailable,
            Self::Corrupt { .. } => ErrorKind::SourceCorrupt,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

// ─── Execution errors ────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("required tool `{tool}` is not available: {message}")]
    ToolUnavailable { tool: String, message: String },

    #[error("automation entry point missing: {path}")]
    EntryPointMissing { path: String },

    #[error("cannot access automation entry point {path}: {source}")]
    EntryPointUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("playbook run failed ({status})\nstdout:\n{stdout}\nstderr:\n{stderr}")]
    ApplyFailed {
        status: String,
        stdout: String,
        stderr: String,
    },

    #[error("post-apply verification failed: {0}")]
    VerificationFailed(String),

    #[error("apply cancelled")]
    Cancelled,
}

impl ExecutionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ToolUnavailable { .. } => ErrorKind::ToolUnavailable,
            Self::EntryPointMissing { .. } | Self::EntryPointUnreadable { .. } => {
                ErrorKind::EntryPointMissing
            }
            Self::ApplyFailed { .. } => ErrorKind::ApplyFailed,
            Self::VerificationFailed(_) => ErrorKind::VerificationFailed,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }

    pub(crate) fn apply_failed(status: ExitStatus, stdout: &str, stderr: &str) -> Self {
        Self::ApplyFailed {
            status: status.to_string(),
            stdout: tail(stdout, CAPTURE_TAIL_CHARS),
            stderr: tail(stderr, CAPTURE_TAIL_CHARS),
        }
    }
}

// ─── Engine cycle errors ─────────────────────────────────────────────────────

/// Stage of a cycle a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    Sync,
    Apply,
}

#[derive(Debug, Error)]
pub enum CycleError {
    #[error("sync failed: {0}")]
    Sync(#[source] SourceError),

    #[error("apply of {revision} failed: {source}")]
    Apply {
        revision: String,
        #[source]
        source: ExecutionError,
    },

    #[error("{stage} timed out after {}s", .after.as_secs_f64())]
    Timeout { stage: Stage, after: Duration },
}

impl CycleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Sync(e) => e.kind(),
            Self::Apply { source, .. } => source.kind(),
            Self::Timeout { .. } => ErrorKind::Timeout,
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            Self::Sync(_) => Stage::Sync,
            Self::Apply { .. } => Stage::Apply,
            Self::Timeout { stage, .. } => *stage,
        }
    }
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, GitopsError>;

const CAPTURE_TAIL_CHARS: usize = 4000;

/// Keep the last `max_chars` characters of captured process output.
fn tail(output: &str, max_chars: usize) -> String {
    let trimmed = output.trim();
    let count = trimmed.chars().count();
    if count <= max_chars {
        return trimmed.to_string();
    }
    let skipped: String = trimmed.chars().skip(count - max_chars).collect();
    format!("…{skipped}")
}
