use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Directory inside the working copy holding the playbooks
    pub playbook_dir: String,
    #[serde(default = "default_playbook")]
    pub playbook: String,
    /// Inline host list ("localhost,") or inventory path relative to the working copy
    pub inventory: String,
    #[serde(default)]
    pub connection: Option<String>,
    #[serde(default)]
    pub extra_args: Vec<String>,
    #[serde(default = "default_ansible_command")]
    pub ansible_command: String,
    #[serde(default = "default_playbook_command")]
    pub playbook_command: String,
    /// Extra environment passed to the playbook run
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    #[serde(default)]
    pub verify: Option<VerifyConfig>,
}

fn default_playbook() -> String {
    "site.yml".into()
}

fn default_ansible_command() -> String {
    "ansible".into()
}

fn default_playbook_command() -> String {
    "ansible-playbook".into()
}

/// Post-apply smoke check: an artifact the playbook is expected to produce.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyConfig {
    pub path: String,
    #[serde(default)]
    pub contains: Option<String>,
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

fn default_settle_ms() -> u64 {
    500
}
