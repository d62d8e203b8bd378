use crate::config::Config;
use crate::execution::ExecutionTrigger;
use crate::reconciler::{CycleReport, EngineSettings, ReconciliationEngine};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

mod state;

use state::spawn_state_writer;

/// Verify the automation tooling before any cycle runs. A failure here is
/// fatal; later cycles treat the same condition as a per-cycle error.
pub async fn preflight(trigger: &dyn ExecutionTrigger, cancel: &CancellationToken) -> Result<()> {
    trigger
        .preflight(cancel)
        .await
        .with_context(|| format!("{} preflight failed", trigger.name()))?;
    crate::diagnostics::health::mark_component_ok("execution");
    Ok(())
}

pub async fn run(config: &Config) -> Result<()> {
    let cancel = CancellationToken::new();
    let source = crate::source::create_source_tracker(config);
    let trigger = crate::execution::create_execution_trigger(config);

    preflight(trigger.as_ref(), &cancel).await?;
    crate::diagnostics::health::mark_component_ok("daemon");

    let writer_cancel = CancellationToken::new();
    let writer = spawn_state_writer(
        state_file_path(config),
        Duration::from_secs(config.daemon.status_flush_secs.max(1)),
        writer_cancel.clone(),
    );
    let signals = spawn_signal_listener(cancel.clone());

    println!("◆ ansiblegitops reconciler started");
    println!(
        "   Tracking:  {} ({})",
        redacted_remote(config),
        config.source.branch
    );
    println!("   Every:     {}s", config.source.poll_interval_secs);
    println!("   Ctrl+C to stop");

    let mut engine = ReconciliationEngine::new(source, trigger, EngineSettings::from_config(config));
    let cycles = engine.run(&cancel).await;

    crate::diagnostics::health::mark_component_error("daemon", "shutdown requested");
    signals.abort();
    writer_cancel.cancel();
    let _ = writer.await;

    tracing::info!(cycles, "daemon stopped");
    Ok(())
}

/// Run exactly one cycle. Ctrl-C interrupts it.
pub async fn run_once(config: &Config) -> CycleReport {
    let cancel = CancellationToken::new();
    let signals = spawn_signal_listener(cancel.clone());
    let mut engine = crate::reconciler::build_engine(config);
    let report = engine.run_cycle(&cancel).await;
    signals.abort();
    report
}

pub fn state_file_path(config: &Config) -> PathBuf {
    config.state_file_path()
}

fn redacted_remote(config: &Config) -> String {
    crate::source::display_remote(&config.source.url)
}

fn spawn_signal_listener(cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match shutdown_signal().await {
            Ok(()) => tracing::info!("shutdown requested"),
            Err(error) => tracing::error!(%error, "failed to listen for shutdown signals"),
        }
        cancel.cancel();
    })
}

#[cfg(unix)]
async fn shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
