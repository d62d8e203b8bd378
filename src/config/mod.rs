pub mod schema;

pub use schema::{
    AuthConfig, AuthKind, BackoffGrowth, Config, DaemonConfig, ExecutionConfig, ReliabilityConfig, SourceConfig,
    VerifyConfig,
};
