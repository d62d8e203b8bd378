use super::super::{DaemonConfig, ExecutionConfig, ReliabilityConfig, SourceConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - resolved at load time, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    pub source: SourceConfig,

    pub execution: ExecutionConfig,

    #[serde(default)]
    pub reliability: ReliabilityConfig,

    #[serde(default)]
    pub daemon: DaemonConfig,
}

impl Config {
    /// Working copy location with `~` expanded, falling back to
    /// `<tmp>/ansiblegitops/repo`.
    pub fn working_copy_path(&self) -> PathBuf {
        self.source.working_copy.as_deref().map_or_else(
            || std::env::temp_dir().join("ansiblegitops").join("repo"),
            |path| PathBuf::from(shellexpand::tilde(path).into_owned()),
        )
    }

    /// Where the daemon writes its status snapshot.
    pub fn state_file_path(&self) -> PathBuf {
        let config_dir = self
            .config_path
            .parent()
            .map_or_else(|| PathBuf::from("."), PathBuf::from);
        match self.daemon.state_file.as_deref() {
            Some(path) => {
                let expanded = PathBuf::from(shellexpand::tilde(path).into_owned());
                if expanded.is_absolute() {
                    expanded
                } else {
                    config_dir.join(expanded)
                }
            }
            None => config_dir.join("daemon_state.json"),
        }
    }
}
