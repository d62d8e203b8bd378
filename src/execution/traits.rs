use crate::error::ExecutionError;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use tokio_util::sync::CancellationToken;

pub type ExecutionFuture<'a> = Pin<Box<dyn Future<Output = Result<(), ExecutionError>> + Send + 'a>>;

/// Runs the declarative automation against a working copy.
///
/// `apply` must be safe to repeat against unchanged content; the engine
/// re-applies a revision whenever the previous attempt for it failed.
pub trait ExecutionTrigger: Send + Sync {
    /// Human-readable trigger name (e.g. "ansible")
    fn name(&self) -> &str;

    /// Check that the external tooling is installed and reachable.
    fn preflight<'a>(&'a self, cancel: &'a CancellationToken) -> ExecutionFuture<'a> {
        let _ = cancel;
        Box::pin(async { Ok(()) })
    }

    /// Run the automation. Captured output is attached to errors only.
    fn apply<'a>(
        &'a self,
        working_copy: &'a Path,
        cancel: &'a CancellationToken,
    ) -> ExecutionFuture<'a>;
}
