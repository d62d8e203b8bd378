use crate::config::Config;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Snapshots older than this many flush intervals are flagged as stale.
const STALE_FLUSH_MULTIPLIER: i64 = 3;

pub fn render_status(config: &Config) -> Result<String> {
    let state_file = crate::platform::daemon::state_file_path(config);
    let mut lines = vec![
        "◆ ansiblegitops status".to_string(),
        String::new(),
        format!("Version     {}", env!("CARGO_PKG_VERSION")),
        format!("Config      {}", config.config_path.display()),
        format!("State file  {}", state_file.display()),
        String::new(),
    ];

    if !state_file.exists() {
        lines.push("✗ no status snapshot found".into());
        lines.push("› start the reconciler with `ansiblegitops run`".into());
        return Ok(lines.join("\n"));
    }

    let raw = std::fs::read_to_string(&state_file)
        .with_context(|| format!("Failed to read {}", state_file.display()))?;
    let snapshot: Value = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {}", state_file.display()))?;

    let stale_after = i64::try_from(config.daemon.status_flush_secs)
        .unwrap_or(i64::MAX)
        .saturating_mul(STALE_FLUSH_MULTIPLIER);
    lines.extend(snapshot_lines(&snapshot, Utc::now(), stale_after));
    Ok(lines.join("\n"))
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

fn u64_field(value: &Value, key: &str) -> u64 {
    value.get(key).and_then(Value::as_u64).unwrap_or(0)
}

pub(crate) fn snapshot_lines(snapshot: &Value, now: DateTime<Utc>, stale_after: i64) -> Vec<String> {
    let mut lines = Vec::new();

    let written_at = str_field(snapshot, "written_at")
        .or_else(|| str_field(snapshot, "updated_at"))
        .unwrap_or("");
    match DateTime::parse_from_rfc3339(written_at) {
        Ok(ts) => {
            let age = now.signed_duration_since(ts.with_timezone(&Utc)).num_seconds();
            if age <= stale_after {
                lines.push(format!("✓ snapshot written {age}s ago"));
            } else {
                lines.push(format!("✗ snapshot is {age}s old; is the daemon still running?"));
            }
        }
        Err(_) => lines.push(format!("✗ invalid snapshot timestamp: {written_at:?}")),
    }
    lines.push(format!(
        "  pid {} · up {}s",
        u64_field(snapshot, "pid"),
        u64_field(snapshot, "uptime_seconds")
    ));
    lines.push(String::new());

    if let Some(reconciler) = snapshot.get("reconciler") {
        lines.push("Reconciler".into());
        lines.push(format!("  cycles                {}", u64_field(reconciler, "cycles")));
        lines.push(format!(
            "  last outcome          {}",
            str_field(reconciler, "last_outcome").unwrap_or("(none yet)")
        ));
        lines.push(format!(
            "  last applied          {}",
            str_field(reconciler, "last_applied_revision").unwrap_or("(none)")
        ));
        lines.push(format!(
            "  last observed         {}",
            str_field(reconciler, "last_observed_revision").unwrap_or("(none)")
        ));
        let failures = u64_field(reconciler, "consecutive_failures");
        if failures > 0 {
            lines.push(format!("  consecutive failures  {failures}"));
            if let Some(error) = str_field(reconciler, "last_error") {
                let kind = str_field(reconciler, "last_error_kind").unwrap_or("unknown");
                lines.push(format!("  last error            [{kind}] {error}"));
            }
        }
        lines.push(String::new());
    }

    if let Some(components) = snapshot.get("components").and_then(Value::as_object) {
        lines.push("Components".into());
        for (name, component) in components {
            let status = str_field(component, "status").unwrap_or("unknown");
            let marker = if status == "ok" { "✓" } else { "✗" };
            match str_field(component, "last_error") {
                Some(error) if status != "ok" => {
                    lines.push(format!("  {marker} {name:<10} {status}: {error}"));
                }
                _ => lines.push(format!("  {marker} {name:<10} {status}")),
            }
        }
    }

    lines
}
