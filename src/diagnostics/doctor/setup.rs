use crate::config::Config;
use crate::execution::AnsibleTrigger;

pub(crate) fn run_setup_checks(config: &Config) -> Vec<(bool, String)> {
    let mut checks: Vec<(bool, String)> = Vec::new();

    let config_exists = config.config_path.exists();
    checks.push((
        config_exists,
        format!(
            "Config file: {}",
            if config_exists {
                config.config_path.display().to_string()
            } else {
                format!("missing ({})", config.config_path.display())
            }
        ),
    ));

    checks.push((
        true,
        format!(
            "Remote: {} @ {}",
            crate::source::display_remote(&config.source.url),
            config.source.branch
        ),
    ));

    let working_copy = config.working_copy_path();
    if working_copy.join(".git").exists() {
        checks.push((
            true,
            format!("Working copy: {}", working_copy.display()),
        ));

        let entry = AnsibleTrigger::new(config.execution.clone()).entry_point(&working_copy);
        let entry_exists = entry.is_file();
        checks.push((
            entry_exists,
            format!(
                "Playbook: {}",
                if entry_exists {
                    entry.display().to_string()
                } else {
                    format!("missing ({})", entry.display())
                }
            ),
        ));
    } else if working_copy.exists() {
        checks.push((
            true,
            format!(
                "Working copy: {} is not a repository; it will be replaced on the next sync",
                working_copy.display()
            ),
        ));
    } else {
        checks.push((
            true,
            format!(
                "Working copy: {} (cloned on first cycle)",
                working_copy.display()
            ),
        ));
    }

    checks.push((
        true,
        format!("State file: {}", config.state_file_path().display()),
    ));

    checks
}
