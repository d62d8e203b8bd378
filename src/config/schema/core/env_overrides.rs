use super::Config;
use crate::config::schema::AuthKind;

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("ANSIBLEGITOPS_GIT_URL")
            && !url.is_empty()
        {
            self.source.url = url;
        }

        if let Ok(branch) = std::env::var("ANSIBLEGITOPS_GIT_BRANCH")
            && !branch.is_empty()
        {
            self.source.branch = branch;
        }

        if let Ok(token) = std::env::var("ANSIBLEGITOPS_GIT_TOKEN")
            && !token.is_empty()
        {
            self.source.auth.token = Some(token);
            if self.source.auth.kind == AuthKind::None {
                self.source.auth.kind = AuthKind::Token;
            }
        }

        if let Ok(interval_str) = std::env::var("ANSIBLEGITOPS_POLL_INTERVAL")
            && let Ok(interval) = interval_str.parse::<u64>()
        {
            self.source.poll_interval_secs = interval;
        }

        if let Ok(dir) = std::env::var("ANSIBLEGITOPS_PLAYBOOK_DIR")
            && !dir.is_empty()
        {
            self.execution.playbook_dir = dir;
        }

        if let Ok(inventory) = std::env::var("ANSIBLEGITOPS_INVENTORY")
            && !inventory.is_empty()
        {
            self.execution.inventory = inventory;
        }
    }
}
