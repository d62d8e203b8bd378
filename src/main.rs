#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::unnecessary_literal_bound,
    clippy::module_name_repetitions,
    clippy::struct_field_names
)]

use anyhow::Result;
use ansiblegitops::Cli;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

const LOG_ENV: &str = "ANSIBLEGITOPS_LOG";

fn log_level(flag: Option<Level>) -> Level {
    flag.or_else(|| {
        std::env::var(LOG_ENV)
            .ok()
            .and_then(|value| value.trim().parse().ok())
    })
    .unwrap_or(Level::INFO)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level(cli.log_level))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    ansiblegitops::app::dispatch::dispatch(cli).await
}
