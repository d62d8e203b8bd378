use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Remote repository URL (https, ssh, scp-style or local path)
    pub url: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Seconds between the end of one cycle and the start of the next
    pub poll_interval_secs: u64,
    /// Local working copy; defaults to `<tmp>/ansiblegitops/repo`
    #[serde(default)]
    pub working_copy: Option<String>,
    #[serde(default)]
    pub auth: AuthConfig,
}

fn default_branch() -> String {
    "main".into()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthKind {
    #[default]
    None,
    Token,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub kind: AuthKind,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}
