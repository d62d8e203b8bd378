mod auth;
pub mod git;
pub mod retry;
pub mod traits;

pub use git::GitSourceTracker;
pub use retry::RetryPolicy;
pub use traits::{Revision, SourceTracker, SyncFuture, SyncOutcome};

use crate::config::Config;

/// Factory: the tracker for the configured remote.
pub fn create_source_tracker(config: &Config) -> Box<dyn SourceTracker> {
    Box::new(GitSourceTracker::from_config(config))
}

/// Remote URL with any embedded credentials removed, safe to print.
pub fn display_remote(raw_url: &str) -> String {
    auth::strip_userinfo(raw_url)
}
