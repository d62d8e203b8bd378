use ansiblegitops::config::Config;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|out| out.status.success())
}

/// Run git in `dir` with a throwaway identity, panicking on failure.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let out = Command::new("git")
        .args([
            "-c",
            "user.name=ansiblegitops-tests",
            "-c",
            "user.email=tests@example.com",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .current_dir(dir)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .expect("spawn git");
    assert!(
        out.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8_lossy(&out.stdout).trim().to_string()
}

/// A non-bare upstream repository on branch `main`.
pub struct Upstream {
    pub dir: PathBuf,
}

impl Upstream {
    pub fn create(root: &Path) -> Self {
        let dir = root.join("upstream");
        std::fs::create_dir_all(&dir).unwrap();
        git(&dir, &["init", "--quiet"]);
        git(&dir, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        Self { dir }
    }

    pub fn commit(&self, file: &str, contents: &str, message: &str) -> String {
        let path = self.dir.join(file);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
        git(&self.dir, &["add", "-A"]);
        git(&self.dir, &["commit", "--quiet", "-m", message]);
        self.head()
    }

    pub fn head(&self) -> String {
        git(&self.dir, &["rev-parse", "HEAD"])
    }

    pub fn url(&self) -> String {
        self.dir.display().to_string()
    }
}

/// Build a config in-memory; `[execution]` commands point at `bin`.
pub fn config(tmp: &TempDir, url: &str, bin: &Path, extra_toml: &str) -> Config {
    let working_copy = tmp.path().join("wc");
    let toml = format!(
        r#"
[source]
url = "{url}"
branch = "main"
poll_interval_secs = 1
working_copy = "{wc}"

[execution]
playbook_dir = "ansible"
playbook = "site.yml"
inventory = "localhost,"
connection = "local"
ansible_command = "{ansible}"
playbook_command = "{playbook}"

[reliability]
sync_attempts = 1
sync_backoff_base_secs = 0

{extra_toml}
"#,
        wc = working_copy.display(),
        ansible = bin.join("ansible").display(),
        playbook = bin.join("ansible-playbook").display(),
    );
    let mut config: Config = toml::from_str(&toml).unwrap();
    config.config_path = tmp.path().join("config.toml");
    config
}

#[cfg(unix)]
const FAKE_ANSIBLE: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then
    echo "ansible [core 2.16.0]"
    exit 0
fi
exit 0
"#;

#[cfg(unix)]
const FAKE_PLAYBOOK: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then
    echo "ansible-playbook [core 2.16.0]"
    exit 0
fi
if [ -n "$FAKE_RECORD" ]; then
    echo "args=$*" >> "$FAKE_RECORD"
    echo "host_key_checking=$ANSIBLE_HOST_KEY_CHECKING" >> "$FAKE_RECORD"
    echo "cwd=$(pwd)" >> "$FAKE_RECORD"
fi
if [ -n "$FAKE_ARTIFACT" ]; then
    echo "hello from ansible" > "$FAKE_ARTIFACT"
fi
echo "PLAY RECAP"
if [ "${FAKE_EXIT:-0}" != "0" ]; then
    echo "fatal: simulated task failure" >&2
fi
exit "${FAKE_EXIT:-0}"
"#;

/// Install stand-in `ansible` / `ansible-playbook` scripts into `dir`.
#[cfg(unix)]
pub fn install_fake_ansible(dir: &Path) {
    use std::os::unix::fs::PermissionsExt;

    std::fs::create_dir_all(dir).unwrap();
    for (name, body) in [("ansible", FAKE_ANSIBLE), ("ansible-playbook", FAKE_PLAYBOOK)] {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
}
