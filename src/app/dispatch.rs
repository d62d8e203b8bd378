use crate::cli::commands::{Cli, Commands};
use crate::config::Config;
use crate::reconciler::CycleOutcome;
use anyhow::{Context, Result, bail};
use tracing::info;

use crate::app::status::render_status;

/// Run a single cycle and turn its outcome into a process result.
async fn run_once(config: &Config) -> Result<()> {
    let report = crate::platform::daemon::run_once(config).await;
    match report.outcome {
        CycleOutcome::Applied { revision, .. } => {
            println!("✓ applied {revision}");
            Ok(())
        }
        CycleOutcome::NoChange { revision } => {
            println!("✓ {revision} already applied");
            Ok(())
        }
        CycleOutcome::Failed(error) => {
            Err(anyhow::Error::new(error).context(format!("cycle {} failed", report.cycle)))
        }
        CycleOutcome::Cancelled => bail!("cycle interrupted before completion"),
    }
}

pub async fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    info!(config = %config.config_path.display(), "configuration loaded");

    match cli.command {
        Commands::Run => {
            info!(
                branch = %config.source.branch,
                interval_secs = config.source.poll_interval_secs,
                "starting reconciler"
            );
            crate::platform::daemon::run(&config).await
        }

        Commands::Once => run_once(&config).await,

        Commands::Check => crate::diagnostics::doctor::run(&config).await,

        Commands::Status => {
            println!("{}", render_status(&config)?);
            Ok(())
        }
    }
}
