use crate::support::{self, Upstream};
use ansiblegitops::error::SourceError;
use ansiblegitops::source::{GitSourceTracker, SourceTracker};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn tracker_for(tmp: &TempDir, upstream_url: &str) -> GitSourceTracker {
    let config = support::config(tmp, upstream_url, &tmp.path().join("bin"), "");
    GitSourceTracker::from_config(&config)
}

#[tokio::test]
async fn first_sync_clones_and_reports_change() {
    if !support::git_available() {
        eprintln!("git not installed; skipping");
        return;
    }
    let tmp = TempDir::new().unwrap();
    let upstream = Upstream::create(tmp.path());
    let head = upstream.commit("ansible/site.yml", "- hosts: all\n", "initial");
    let tracker = tracker_for(&tmp, &upstream.url());

    let outcome = tracker.sync(&CancellationToken::new()).await.unwrap();

    assert!(outcome.changed);
    assert_eq!(outcome.revision.as_str(), head);
    assert!(tracker.path().join("ansible/site.yml").is_file());
}

#[tokio::test]
async fn resync_without_upstream_change_is_unchanged() {
    if !support::git_available() {
        return;
    }
    let tmp = TempDir::new().unwrap();
    let upstream = Upstream::create(tmp.path());
    let head = upstream.commit("ansible/site.yml", "- hosts: all\n", "initial");
    let tracker = tracker_for(&tmp, &upstream.url());
    let cancel = CancellationToken::new();

    tracker.sync(&cancel).await.unwrap();
    let again = tracker.sync(&cancel).await.unwrap();

    assert!(!again.changed);
    assert_eq!(again.revision.as_str(), head);
}

#[tokio::test]
async fn upstream_commit_is_fast_forwarded() {
    if !support::git_available() {
        return;
    }
    let tmp = TempDir::new().unwrap();
    let upstream = Upstream::create(tmp.path());
    let first = upstream.commit("ansible/site.yml", "- hosts: all\n", "initial");
    let tracker = tracker_for(&tmp, &upstream.url());
    let cancel = CancellationToken::new();
    tracker.sync(&cancel).await.unwrap();

    let second = upstream.commit("ansible/site.yml", "- hosts: web\n", "narrow hosts");
    let outcome = tracker.sync(&cancel).await.unwrap();

    assert_ne!(first, second);
    assert!(outcome.changed);
    assert_eq!(outcome.revision.as_str(), second);
    let contents = std::fs::read_to_string(tracker.path().join("ansible/site.yml")).unwrap();
    assert_eq!(contents, "- hosts: web\n");
}

#[tokio::test]
async fn rewritten_history_triggers_fresh_clone() {
    if !support::git_available() {
        return;
    }
    let tmp = TempDir::new().unwrap();
    let upstream = Upstream::create(tmp.path());
    upstream.commit("ansible/site.yml", "- hosts: all\n", "initial");
    upstream.commit("README.md", "one\n", "second");
    let tracker = tracker_for(&tmp, &upstream.url());
    let cancel = CancellationToken::new();
    tracker.sync(&cancel).await.unwrap();

    // Force-push equivalent: drop the tip and commit something else.
    support::git(&upstream.dir, &["reset", "--quiet", "--hard", "HEAD~1"]);
    let rewritten = upstream.commit("README.md", "two\n", "rewritten");

    let outcome = tracker.sync(&cancel).await.unwrap();
    assert!(outcome.changed);
    assert_eq!(outcome.revision.as_str(), rewritten);
    let readme = std::fs::read_to_string(tracker.path().join("README.md")).unwrap();
    assert_eq!(readme, "two\n");
}

#[tokio::test]
async fn junk_directory_is_replaced_by_a_clone() {
    if !support::git_available() {
        return;
    }
    let tmp = TempDir::new().unwrap();
    let upstream = Upstream::create(tmp.path());
    let head = upstream.commit("ansible/site.yml", "- hosts: all\n", "initial");
    let tracker = tracker_for(&tmp, &upstream.url());
    std::fs::create_dir_all(tracker.path()).unwrap();
    std::fs::write(tracker.path().join("leftover.txt"), "stale").unwrap();

    let outcome = tracker.sync(&CancellationToken::new()).await.unwrap();

    assert_eq!(outcome.revision.as_str(), head);
    assert!(!tracker.path().join("leftover.txt").exists());
}

#[tokio::test]
async fn unreachable_remote_is_unavailable() {
    if !support::git_available() {
        return;
    }
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("no-such-remote");
    let tracker = tracker_for(&tmp, &missing.display().to_string());

    let err = tracker.sync(&CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, SourceError::Unavailable { .. }), "{err}");
    assert!(!tracker.path().join(".git").exists());
}

#[tokio::test]
async fn cancelled_sync_reports_cancelled() {
    let tmp = TempDir::new().unwrap();
    let tracker = tracker_for(&tmp, "/nonexistent/remote.git");
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = tracker.sync(&cancel).await.unwrap_err();
    assert!(matches!(err, SourceError::Cancelled));
}
