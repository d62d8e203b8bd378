mod setup;


use crate::config::Config;
use crate::runtime::process::run_captured;
use anyhow::{Result, bail};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use setup::run_setup_checks;

pub async fn run(config: &Config) -> Result<()> {
    println!("◆ ansiblegitops check");
    println!();

    let setup_failures = print_checks("Setup", &run_setup_checks(config));
    let tooling_failures = print_checks("Tooling", &run_tooling_checks(config).await);

    let failures = setup_failures + tooling_failures;
    if failures == 0 {
        println!("  All checks passed.");
        Ok(())
    } else {
        bail!("{failures} check(s) failed")
    }
}

fn print_checks(title: &str, checks: &[(bool, String)]) -> u32 {
    println!("  {title}");
    println!("  {}", "─".repeat(50));
    let mut failures = 0u32;
    for (pass, msg) in checks {
        if *pass {
            println!("  ✓ {msg}");
        } else {
            failures += 1;
            println!("  ✗ {msg}");
        }
    }
    println!();
    failures
}

async fn run_tooling_checks(config: &Config) -> Vec<(bool, String)> {
    let cancel = CancellationToken::new();
    let mut checks = Vec::with_capacity(2);

    let mut git = Command::new("git");
    git.arg("--version");
    checks.push(match run_captured(git, &cancel).await {
        Ok(output) if output.success() => (true, output.first_line().to_string()),
        Ok(output) => (false, format!("git: {}", output.stderr_or_stdout())),
        Err(error) => (false, format!("git: {error}")),
    });

    let trigger = crate::execution::create_execution_trigger(config);
    checks.push(
        match crate::platform::daemon::preflight(trigger.as_ref(), &cancel).await {
            Ok(()) => (
                true,
                format!(
                    "{} and {} available",
                    config.execution.ansible_command, config.execution.playbook_command
                ),
            ),
            Err(error) => (false, format!("{error:#}")),
        },
    );

    checks
}
