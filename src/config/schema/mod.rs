mod core;
mod daemon;
mod execution;
mod reliability;
mod source;

pub use self::core::Config;
pub use daemon::DaemonConfig;
pub use execution::{ExecutionConfig, VerifyConfig};
pub use reliability::{BackoffGrowth, ReliabilityConfig};
pub use source::{AuthConfig, AuthKind, SourceConfig};
