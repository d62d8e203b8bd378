use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Status snapshot file; relative paths resolve against the config directory
    #[serde(default)]
    pub state_file: Option<String>,
    #[serde(default = "default_status_flush_secs")]
    pub status_flush_secs: u64,
}

fn default_status_flush_secs() -> u64 {
    5
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            state_file: None,
            status_flush_secs: default_status_flush_secs(),
        }
    }
}
