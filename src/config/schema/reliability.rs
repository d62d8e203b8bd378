use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReliabilityConfig {
    /// Attempts per sync before the cycle is reported as failed
    #[serde(default = "default_sync_attempts")]
    pub sync_attempts: u32,
    #[serde(default = "default_sync_backoff_base_secs")]
    pub sync_backoff_base_secs: u64,
    #[serde(default)]
    pub sync_backoff_growth: BackoffGrowth,
    #[serde(default = "default_sync_timeout_secs")]
    pub sync_timeout_secs: u64,
    #[serde(default = "default_apply_timeout_secs")]
    pub apply_timeout_secs: u64,
}

/// How the delay between sync attempts grows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffGrowth {
    /// `base * attempt`
    Linear,
    /// `base * 2^(attempt - 1)`
    #[default]
    Exponential,
}

fn default_sync_attempts() -> u32 {
    3
}

fn default_sync_backoff_base_secs() -> u64 {
    1
}

fn default_sync_timeout_secs() -> u64 {
    300
}

fn default_apply_timeout_secs() -> u64 {
    1800
}

impl Default for ReliabilityConfig {
    fn default() -> Self {
        Self {
            sync_attempts: default_sync_attempts(),
            sync_backoff_base_secs: default_sync_backoff_base_secs(),
            sync_backoff_growth: BackoffGrowth::default(),
            sync_timeout_secs: default_sync_timeout_secs(),
            apply_timeout_secs: default_apply_timeout_secs(),
        }
    }
}
