#![cfg(unix)]

use crate::support;
use ansiblegitops::error::{ErrorKind, ExecutionError};
use ansiblegitops::execution::{AnsibleTrigger, ExecutionTrigger};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

struct Fixture {
    tmp: TempDir,
    working_copy: PathBuf,
    record: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        support::install_fake_ansible(&tmp.path().join("bin"));
        let working_copy = tmp.path().join("wc");
        std::fs::create_dir_all(working_copy.join("ansible")).unwrap();
        std::fs::write(working_copy.join("ansible/site.yml"), "- hosts: all\n").unwrap();
        let record = tmp.path().join("record.txt");
        Self {
            tmp,
            working_copy,
            record,
        }
    }

    fn trigger(&self, extra_toml: &str) -> AnsibleTrigger {
        let config = support::config(
            &self.tmp,
            "https://example.com/org/infra.git",
            &self.tmp.path().join("bin"),
            extra_toml,
        );
        AnsibleTrigger::new(config.execution)
    }

    fn env_table(&self, exit_code: u8, artifact: Option<&Path>) -> String {
        let mut table = format!(
            "[execution.env]\nFAKE_RECORD = \"{}\"\nFAKE_EXIT = \"{exit_code}\"\n",
            self.record.display()
        );
        if let Some(artifact) = artifact {
            table.push_str(&format!("FAKE_ARTIFACT = \"{}\"\n", artifact.display()));
        }
        table
    }

    fn recorded(&self) -> String {
        std::fs::read_to_string(&self.record).unwrap_or_default()
    }
}

#[tokio::test]
async fn preflight_accepts_installed_tools() {
    let fx = Fixture::new();
    let trigger = fx.trigger("");
    trigger.preflight(&CancellationToken::new()).await.unwrap();
    assert_eq!(trigger.name(), "ansible");
}

#[tokio::test]
async fn preflight_rejects_missing_tool() {
    let fx = Fixture::new();
    std::fs::remove_file(fx.tmp.path().join("bin/ansible")).unwrap();
    let trigger = fx.trigger("");

    let err = trigger.preflight(&CancellationToken::new()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ToolUnavailable);
    assert!(err.to_string().contains("ansible"));
}

#[tokio::test]
async fn apply_runs_playbook_from_working_copy() {
    let fx = Fixture::new();
    let trigger = fx.trigger(&fx.env_table(0, None));

    trigger
        .apply(&fx.working_copy, &CancellationToken::new())
        .await
        .unwrap();

    let recorded = fx.recorded();
    let entry = fx.working_copy.join("ansible/site.yml");
    assert!(
        recorded.contains(&format!(
            "args=-i localhost, --connection local {}",
            entry.display()
        )),
        "{recorded}"
    );
    assert!(recorded.contains("host_key_checking=False"));
    let cwd = recorded
        .lines()
        .find_map(|line| line.strip_prefix("cwd="))
        .unwrap();
    assert_eq!(
        std::fs::canonicalize(cwd).unwrap(),
        std::fs::canonicalize(&fx.working_copy).unwrap()
    );
}

#[tokio::test]
async fn missing_playbook_is_reported_without_running() {
    let fx = Fixture::new();
    std::fs::remove_file(fx.working_copy.join("ansible/site.yml")).unwrap();
    let trigger = fx.trigger(&fx.env_table(0, None));

    let err = trigger
        .apply(&fx.working_copy, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ExecutionError::EntryPointMissing { .. }));
    assert!(err.to_string().contains("site.yml"));
    assert!(fx.recorded().is_empty());
}

#[tokio::test]
async fn unreadable_playbook_path_reports_the_io_cause() {
    let fx = Fixture::new();
    let playbook_dir = fx.working_copy.join("ansible");
    std::fs::remove_dir_all(&playbook_dir).unwrap();
    std::fs::write(&playbook_dir, "not a directory").unwrap();
    let trigger = fx.trigger(&fx.env_table(0, None));

    let err = trigger
        .apply(&fx.working_copy, &CancellationToken::new())
        .await
        .unwrap_err();

    let ExecutionError::EntryPointUnreadable { path, source } = &err else {
        panic!("expected an unreadable entry point, got {err:?}");
    };
    assert!(path.ends_with("ansible/site.yml"));
    assert_ne!(source.kind(), std::io::ErrorKind::NotFound);
    assert!(err.to_string().contains("cannot access"));
    assert!(fx.recorded().is_empty());
}

#[tokio::test]
async fn failing_playbook_carries_captured_output() {
    let fx = Fixture::new();
    let trigger = fx.trigger(&fx.env_table(2, None));

    let err = trigger
        .apply(&fx.working_copy, &CancellationToken::new())
        .await
        .unwrap_err();

    match &err {
        ExecutionError::ApplyFailed {
            status,
            stdout,
            stderr,
        } => {
            assert!(status.contains('2'), "{status}");
            assert!(stdout.contains("PLAY RECAP"));
            assert!(stderr.contains("simulated task failure"));
        }
        other => panic!("expected ApplyFailed, got {other:?}"),
    }
    assert_eq!(err.kind(), ErrorKind::ApplyFailed);
}

#[tokio::test]
async fn verification_checks_the_artifact() {
    let fx = Fixture::new();
    let artifact = fx.tmp.path().join("testfile.txt");
    let verify = format!(
        "{}\n[execution.verify]\npath = \"{}\"\ncontains = \"hello\"\nsettle_ms = 0\n",
        fx.env_table(0, Some(&artifact)),
        artifact.display()
    );
    let trigger = fx.trigger(&verify);

    trigger
        .apply(&fx.working_copy, &CancellationToken::new())
        .await
        .unwrap();
    assert!(artifact.is_file());
}

#[tokio::test]
async fn verification_fails_when_artifact_is_missing() {
    let fx = Fixture::new();
    let artifact = fx.tmp.path().join("never-written.txt");
    let verify = format!(
        "{}\n[execution.verify]\npath = \"{}\"\nsettle_ms = 0\n",
        fx.env_table(0, None),
        artifact.display()
    );
    let trigger = fx.trigger(&verify);

    let err = trigger
        .apply(&fx.working_copy, &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::VerificationFailed);
    assert!(err.to_string().contains("was not created"));
}
