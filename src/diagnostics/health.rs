use crate::reconciler::{CycleOutcome, CycleReport};
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{OnceLock, RwLock};
use std::time::Instant;

#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub status: String,
    pub updated_at: String,
    pub last_ok: Option<String>,
    pub last_error: Option<String>,
}

/// Rolling summary of reconciliation cycles.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcilerStatus {
    pub cycles: u64,
    pub consecutive_failures: u64,
    pub last_cycle_at: Option<String>,
    pub last_outcome: Option<String>,
    pub last_duration_ms: Option<u64>,
    pub last_observed_revision: Option<String>,
    pub last_applied_revision: Option<String>,
    pub last_error: Option<String>,
    pub last_error_kind: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    pub pid: u32,
    pub updated_at: String,
    pub uptime_seconds: u64,
    pub components: BTreeMap<String, ComponentHealth>,
    pub reconciler: ReconcilerStatus,
}

struct HealthRegistry {
    started_at: Instant,
    components: RwLock<BTreeMap<String, ComponentHealth>>,
    reconciler: RwLock<ReconcilerStatus>,
}

static REGISTRY: OnceLock<HealthRegistry> = OnceLock::new();

fn registry() -> &'static HealthRegistry {
    REGISTRY.get_or_init(|| HealthRegistry {
        started_at: Instant::now(),
        components: RwLock::new(BTreeMap::new()),
        reconciler: RwLock::new(ReconcilerStatus::default()),
    })
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

fn upsert_component<F>(component: &str, update: F)
where
    F: FnOnce(&mut ComponentHealth),
{
    if let Ok(mut map) = registry().components.write() {
        let now = now_rfc3339();
        let entry = map
            .entry(component.to_string())
            .or_insert_with(|| ComponentHealth {
                status: "starting".into(),
                updated_at: now.clone(),
                last_ok: None,
                last_error: None,
            });
        update(entry);
        entry.updated_at = now;
    }
}

pub fn mark_component_ok(component: &str) {
    upsert_component(component, |entry| {
        entry.status = "ok".into();
        entry.last_ok = Some(now_rfc3339());
        entry.last_error = None;
    });
}

#[allow(clippy::needless_pass_by_value)]
pub fn mark_component_error(component: &str, error: impl ToString) {
    let err = error.to_string();
    upsert_component(component, move |entry| {
        entry.status = "error".into();
        entry.last_error = Some(err);
    });
}

/// Fold a finished cycle into the reconciler status block and the
/// components it touched.
pub fn record_cycle(report: &CycleReport) {
    match &report.outcome {
        CycleOutcome::NoChange { .. } => mark_component_ok("source"),
        CycleOutcome::Applied { .. } => {
            mark_component_ok("source");
            mark_component_ok("execution");
        }
        CycleOutcome::Failed(error) => {
            let component = match error.stage() {
                crate::error::Stage::Sync => "source",
                crate::error::Stage::Apply => {
                    mark_component_ok("source");
                    "execution"
                }
            };
            mark_component_error(component, error);
        }
        CycleOutcome::Cancelled => {}
    }
    match report.outcome.error() {
        Some(error) => mark_component_error("reconciler", error),
        None => mark_component_ok("reconciler"),
    }

    if let Ok(mut status) = registry().reconciler.write() {
        status.cycles = status.cycles.max(report.cycle);
        status.last_cycle_at = Some(now_rfc3339());
        status.last_outcome = Some(report.outcome.label().to_string());
        status.last_duration_ms = Some(u64::try_from(report.duration.as_millis()).unwrap_or(u64::MAX));

        if let Some(revision) = report.outcome.revision() {
            status.last_observed_revision = Some(revision.to_string());
        }

        match &report.outcome {
            CycleOutcome::Applied { revision, .. } => {
                status.last_applied_revision = Some(revision.to_string());
                status.consecutive_failures = 0;
                status.last_error = None;
                status.last_error_kind = None;
            }
            CycleOutcome::NoChange { .. } => {
                status.consecutive_failures = 0;
            }
            CycleOutcome::Failed(error) => {
                status.consecutive_failures = status.consecutive_failures.saturating_add(1);
                status.last_error = Some(error.to_string());
                status.last_error_kind = Some(error.kind().to_string());
            }
            CycleOutcome::Cancelled => {}
        }
    }
}

pub fn reconciler_status() -> ReconcilerStatus {
    registry()
        .reconciler
        .read()
        .map_or_else(|_| ReconcilerStatus::default(), |status| status.clone())
}

pub fn snapshot() -> HealthSnapshot {
    let components = registry()
        .components
        .read()
        .map_or_else(|_| BTreeMap::new(), |map| map.clone());

    HealthSnapshot {
        pid: std::process::id(),
        updated_at: now_rfc3339(),
        uptime_seconds: registry().started_at.elapsed().as_secs(),
        components,
        reconciler: reconciler_status(),
    }
}

pub fn snapshot_json() -> serde_json::Value {
    serde_json::to_value(snapshot()).unwrap_or_else(|_| {
        serde_json::json!({
            "status": "error",
            "message": "failed to serialize health snapshot"
        })
    })
}
