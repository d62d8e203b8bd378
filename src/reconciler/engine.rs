use super::state::{CycleOutcome, CycleReport, Phase, ReconcilerState};
use crate::config::Config;
use crate::error::{CycleError, ExecutionError, SourceError, Stage};
use crate::execution::ExecutionTrigger;
use crate::source::{SourceTracker, SyncOutcome};
use std::future::Future;
use std::time::Instant;
use tokio::time::{self, Duration};
use tokio_util::sync::CancellationToken;

/// Timing knobs for the reconciliation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Pause between the end of one cycle and the start of the next.
    pub interval: Duration,
    pub sync_timeout: Option<Duration>,
    pub apply_timeout: Option<Duration>,
}

impl EngineSettings {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            sync_timeout: None,
            apply_timeout: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            interval: Duration::from_secs(config.source.poll_interval_secs),
            sync_timeout: Some(Duration::from_secs(config.reliability.sync_timeout_secs)),
            apply_timeout: Some(Duration::from_secs(config.reliability.apply_timeout_secs)),
        }
    }
}

enum Guarded<T> {
    Done(T),
    TimedOut(Duration),
    Cancelled,
}

/// Race `work` against shutdown and an optional deadline.
async fn guarded<T>(
    cancel: &CancellationToken,
    limit: Option<Duration>,
    work: impl Future<Output = T>,
) -> Guarded<T> {
    let bounded = async {
        match limit {
            Some(limit) => time::timeout(limit, work).await.map_err(|_| limit),
            None => Ok(work.await),
        }
    };

    tokio::select! {
        biased;
        () = cancel.cancelled() => Guarded::Cancelled,
        result = bounded => match result {
            Ok(value) => Guarded::Done(value),
            Err(limit) => Guarded::TimedOut(limit),
        },
    }
}

/// Drives the sync → decide → apply → record loop.
///
/// Per-cycle failures are logged and reported but never escape: the only
/// way out of [`ReconciliationEngine::run`] is cancellation.
pub struct ReconciliationEngine {
    source: Box<dyn SourceTracker>,
    trigger: Box<dyn ExecutionTrigger>,
    settings: EngineSettings,
    state: ReconcilerState,
    cycles: u64,
}

impl ReconciliationEngine {
    pub fn new(
        source: Box<dyn SourceTracker>,
        trigger: Box<dyn ExecutionTrigger>,
        settings: EngineSettings,
    ) -> Self {
        let state = ReconcilerState::new(source.path().to_path_buf());
        Self {
            source,
            trigger,
            settings,
            state,
            cycles: 0,
        }
    }

    pub fn state(&self) -> &ReconcilerState {
        &self.state
    }

    pub fn settings(&self) -> EngineSettings {
        self.settings
    }

    /// Number of cycles started so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Run exactly one cycle and report what happened.
    pub async fn run_cycle(&mut self, cancel: &CancellationToken) -> CycleReport {
        self.cycles += 1;
        let cycle = self.cycles;
        let started = Instant::now();
        let mut phases = vec![Phase::Syncing];

        tracing::info!(
            cycle,
            phase = %Phase::Syncing,
            source = self.source.name(),
            path = %self.state.target_path().display(),
            "reconciliation cycle started"
        );

        let outcome = match self.sync_stage(cancel).await {
            Ok(sync) => self.apply_stage(sync, cancel, &mut phases).await,
            Err(outcome) => outcome,
        };

        match &outcome {
            CycleOutcome::Failed(error) => {
                phases.push(Phase::CycleFailed);
                phases.push(Phase::Idle);
                tracing::error!(
                    cycle,
                    phase = %Phase::CycleFailed,
                    stage = %error.stage(),
                    error_kind = %error.kind(),
                    %error,
                    "reconciliation cycle failed"
                );
            }
            CycleOutcome::Cancelled => {
                tracing::info!(cycle, "reconciliation cycle interrupted by shutdown");
            }
            CycleOutcome::NoChange { .. } | CycleOutcome::Applied { .. } => {
                phases.push(Phase::Idle);
            }
        }

        let report = CycleReport {
            cycle,
            phases,
            outcome,
            duration: started.elapsed(),
        };
        crate::diagnostics::health::record_cycle(&report);
        report
    }

    async fn sync_stage(&self, cancel: &CancellationToken) -> Result<SyncOutcome, CycleOutcome> {
        match guarded(cancel, self.settings.sync_timeout, self.source.sync(cancel)).await {
            Guarded::Done(Ok(sync)) => {
                tracing::info!(
                    revision = %sync.revision.short(),
                    changed = sync.changed,
                    "sync completed"
                );
                Ok(sync)
            }
            Guarded::Done(Err(SourceError::Cancelled)) if cancel.is_cancelled() => {
                Err(CycleOutcome::Cancelled)
            }
            Guarded::Cancelled => Err(CycleOutcome::Cancelled),
            Guarded::Done(Err(error)) => Err(CycleOutcome::Failed(CycleError::Sync(error))),
            Guarded::TimedOut(after) => Err(CycleOutcome::Failed(CycleError::Timeout {
                stage: Stage::Sync,
                after,
            })),
        }
    }

    async fn apply_stage(
        &mut self,
        sync: SyncOutcome,
        cancel: &CancellationToken,
        phases: &mut Vec<Phase>,
    ) -> CycleOutcome {
        if !self.state.needs_apply(&sync) {
            phases.push(Phase::NoChange);
            tracing::info!(
                phase = %Phase::NoChange,
                revision = %sync.revision.short(),
                "no change; apply skipped"
            );
            return CycleOutcome::NoChange {
                revision: sync.revision,
            };
        }

        let SyncOutcome { revision, changed } = sync;
        phases.push(Phase::Changed);
        phases.push(Phase::Applying);
        tracing::info!(
            phase = %Phase::Applying,
            revision = %revision.short(),
            trigger = self.trigger.name(),
            "applying revision"
        );

        let apply = self.trigger.apply(self.state.target_path(), cancel);
        match guarded(cancel, self.settings.apply_timeout, apply).await {
            Guarded::Done(Ok(())) => {
                phases.push(Phase::RecordRevision);
                tracing::info!(
                    phase = %Phase::RecordRevision,
                    revision = %revision.short(),
                    "apply succeeded; revision recorded"
                );
                self.state.record_applied(revision.clone());
                CycleOutcome::Applied { revision, changed }
            }
            Guarded::Done(Err(ExecutionError::Cancelled)) if cancel.is_cancelled() => {
                CycleOutcome::Cancelled
            }
            Guarded::Cancelled => CycleOutcome::Cancelled,
            Guarded::Done(Err(source)) => CycleOutcome::Failed(CycleError::Apply {
                revision: revision.to_string(),
                source,
            }),
            Guarded::TimedOut(after) => CycleOutcome::Failed(CycleError::Timeout {
                stage: Stage::Apply,
                after,
            }),
        }
    }

    /// Cycle until `cancel` fires, sleeping `interval` between cycles.
    /// Returns the number of cycles that ran to completion; a cycle cut
    /// short by shutdown is not counted.
    pub async fn run(&mut self, cancel: &CancellationToken) -> u64 {
        tracing::info!(
            source = self.source.name(),
            trigger = self.trigger.name(),
            interval_secs = self.settings.interval.as_secs(),
            "reconciliation loop starting"
        );

        let mut completed = 0_u64;
        while !cancel.is_cancelled() {
            let report = self.run_cycle(cancel).await;
            if matches!(report.outcome, CycleOutcome::Cancelled) {
                break;
            }
            completed += 1;

            let sleep_ms = u64::try_from(self.settings.interval.as_millis()).unwrap_or(u64::MAX);
            tracing::info!(
                cycle = report.cycle,
                outcome = report.outcome.label(),
                duration_ms = u64::try_from(report.duration.as_millis()).unwrap_or(u64::MAX),
                sleep_ms,
                "cycle finished; sleeping"
            );

            tokio::select! {
                () = cancel.cancelled() => break,
                () = time::sleep(self.settings.interval) => {}
            }
        }

        tracing::info!(cycles = completed, "reconciliation loop stopped");
        completed
    }
}
