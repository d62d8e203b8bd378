#![cfg(unix)]

use crate::support::{self, Upstream};
use ansiblegitops::error::ErrorKind;
use ansiblegitops::execution::AnsibleTrigger;
use ansiblegitops::reconciler::{CycleOutcome, EngineSettings, ReconciliationEngine};
use ansiblegitops::source::GitSourceTracker;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn engine(tmp: &TempDir, upstream: &Upstream) -> ReconciliationEngine {
    let record = tmp.path().join("applies.log");
    let extra = format!("[execution.env]\nFAKE_RECORD = \"{}\"\n", record.display());
    let config = support::config(tmp, &upstream.url(), &tmp.path().join("bin"), &extra);
    ReconciliationEngine::new(
        Box::new(GitSourceTracker::from_config(&config)),
        Box::new(AnsibleTrigger::new(config.execution.clone())),
        EngineSettings::new(Duration::from_millis(10)),
    )
}

fn applies_recorded(tmp: &TempDir) -> usize {
    std::fs::read_to_string(tmp.path().join("applies.log"))
        .unwrap_or_default()
        .lines()
        .filter(|line| line.starts_with("args="))
        .count()
}

#[tokio::test]
async fn branch_changes_drive_playbook_runs() {
    if !support::git_available() {
        eprintln!("git not installed; skipping");
        return;
    }
    let tmp = TempDir::new().unwrap();
    support::install_fake_ansible(&tmp.path().join("bin"));
    let upstream = Upstream::create(tmp.path());
    let first = upstream.commit("ansible/site.yml", "- hosts: all\n", "initial");
    let mut engine = engine(&tmp, &upstream);
    let cancel = CancellationToken::new();

    let c1 = engine.run_cycle(&cancel).await;
    assert!(matches!(c1.outcome, CycleOutcome::Applied { .. }), "{:?}", c1.outcome);
    assert_eq!(
        engine.state().last_known_revision().map(|r| r.as_str()),
        Some(first.as_str())
    );

    let c2 = engine.run_cycle(&cancel).await;
    assert!(matches!(c2.outcome, CycleOutcome::NoChange { .. }));
    assert_eq!(applies_recorded(&tmp), 1);

    let second = upstream.commit("ansible/site.yml", "- hosts: web\n", "narrow hosts");
    let c3 = engine.run_cycle(&cancel).await;
    assert!(matches!(c3.outcome, CycleOutcome::Applied { changed: true, .. }));
    assert_eq!(
        engine.state().last_known_revision().map(|r| r.as_str()),
        Some(second.as_str())
    );
    assert_eq!(applies_recorded(&tmp), 2);
}

#[tokio::test]
async fn missing_playbook_fails_until_it_is_committed() {
    if !support::git_available() {
        return;
    }
    let tmp = TempDir::new().unwrap();
    support::install_fake_ansible(&tmp.path().join("bin"));
    let upstream = Upstream::create(tmp.path());
    upstream.commit("README.md", "infra\n", "initial");
    let mut engine = engine(&tmp, &upstream);
    let cancel = CancellationToken::new();

    let failed = engine.run_cycle(&cancel).await;
    assert_eq!(
        failed.outcome.error().map(|e| e.kind()),
        Some(ErrorKind::EntryPointMissing)
    );
    assert!(engine.state().last_known_revision().is_none());

    let fixed = upstream.commit("ansible/site.yml", "- hosts: all\n", "add playbook");
    let recovered = engine.run_cycle(&cancel).await;
    assert!(matches!(recovered.outcome, CycleOutcome::Applied { .. }));
    assert_eq!(
        engine.state().last_known_revision().map(|r| r.as_str()),
        Some(fixed.as_str())
    );
}
