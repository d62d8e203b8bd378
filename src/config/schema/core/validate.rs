use super::Config;
use super::interpolate::unresolved_placeholder;
use crate::config::schema::AuthKind;
use crate::error::ConfigError;

const SUPPORTED_SCHEMES: [&str; 5] = ["https", "http", "ssh", "git", "file"];

impl Config {
    /// Check every field and report all problems at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        let source = &self.source;
        require(&mut problems, "source.url", &source.url);
        if !source.url.trim().is_empty()
            && let Err(reason) = check_remote_url(&source.url)
        {
            problems.push(format!("source.url {reason}"));
        }
        require(&mut problems, "source.branch", &source.branch);
        if source.poll_interval_secs == 0 {
            problems.push("source.poll_interval_secs must be greater than 0".into());
        }

        if source.auth.kind == AuthKind::Token {
            require_opt(&mut problems, "source.auth.username", source.auth.username.as_deref());
            require_opt(&mut problems, "source.auth.token", source.auth.token.as_deref());
        }

        let execution = &self.execution;
        require(&mut problems, "execution.playbook_dir", &execution.playbook_dir);
        require(&mut problems, "execution.playbook", &execution.playbook);
        require(&mut problems, "execution.inventory", &execution.inventory);
        require(&mut problems, "execution.ansible_command", &execution.ansible_command);
        require(&mut problems, "execution.playbook_command", &execution.playbook_command);
        if let Some(verify) = &execution.verify {
            require(&mut problems, "execution.verify.path", &verify.path);
        }

        let reliability = &self.reliability;
        if reliability.sync_attempts == 0 {
            problems.push("reliability.sync_attempts must be at least 1".into());
        }
        if reliability.sync_timeout_secs == 0 {
            problems.push("reliability.sync_timeout_secs must be greater than 0".into());
        }
        if reliability.apply_timeout_secs == 0 {
            problems.push("reliability.apply_timeout_secs must be greater than 0".into());
        }
        if self.daemon.status_flush_secs == 0 {
            problems.push("daemon.status_flush_secs must be greater than 0".into());
        }

        for (field, value) in [
            ("source.url", Some(source.url.as_str())),
            ("source.branch", Some(source.branch.as_str())),
            ("source.auth.username", source.auth.username.as_deref()),
            ("source.auth.token", source.auth.token.as_deref()),
            ("execution.playbook_dir", Some(execution.playbook_dir.as_str())),
            ("execution.inventory", Some(execution.inventory.as_str())),
        ] {
            if let Some(placeholder) = value.and_then(unresolved_placeholder) {
                problems.push(format!("{field} references unset variable {placeholder}"));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(problems))
        }
    }
}

fn require(problems: &mut Vec<String>, field: &str, value: &str) {
    if value.trim().is_empty() {
        problems.push(format!("{field} is required"));
    }
}

fn require_opt(problems: &mut Vec<String>, field: &str, value: Option<&str>) {
    require(problems, field, value.unwrap_or_default());
}

/// Accepts scheme URLs git understands, scp-style `user@host:path`, and local paths.
fn check_remote_url(raw: &str) -> Result<(), String> {
    if raw.contains("://") {
        let parsed = url::Url::parse(raw).map_err(|e| format!("is not a valid URL: {e}"))?;
        if !SUPPORTED_SCHEMES.contains(&parsed.scheme()) {
            return Err(format!("uses unsupported scheme `{}`", parsed.scheme()));
        }
        return Ok(());
    }

    let is_scp_style = raw
        .split_once(':')
        .is_some_and(|(host, path)| !host.is_empty() && !path.is_empty() && !host.contains('/'));
    let is_local_path = raw.starts_with('/') || raw.starts_with("./") || raw.starts_with("../");

    if is_scp_style || is_local_path {
        Ok(())
    } else {
        Err("must be a URL, scp-style remote or local path".into())
    }
}
