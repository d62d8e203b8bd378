use std::sync::{LazyLock, Mutex, MutexGuard};

static ENV_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

/// Serialize tests that touch `ANSIBLEGITOPS_*` variables.
pub(super) fn lock_env() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Sets or clears one variable and restores the previous value on drop.
pub(super) struct ScopedEnv {
    key: &'static str,
    previous: Option<String>,
}

impl ScopedEnv {
    pub(super) fn set(key: &'static str, value: &str) -> Self {
        let previous = std::env::var(key).ok();
        // SAFETY: callers hold the guard from `lock_env`, so no other test
        // mutates the environment concurrently.
        unsafe {
            std::env::set_var(key, value);
        }
        Self { key, previous }
    }

    pub(super) fn clear(key: &'static str) -> Self {
        let previous = std::env::var(key).ok();
        // SAFETY: see `set`.
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, previous }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        // SAFETY: the owning test still holds the `lock_env` guard.
        unsafe {
            match &self.previous {
                Some(value) => std::env::set_var(self.key, value),
                None => std::env::remove_var(self.key),
            }
        }
    }
}

pub(super) const OVERRIDE_KEYS: [&str; 6] = [
    "ANSIBLEGITOPS_GIT_URL",
    "ANSIBLEGITOPS_GIT_BRANCH",
    "ANSIBLEGITOPS_GIT_TOKEN",
    "ANSIBLEGITOPS_POLL_INTERVAL",
    "ANSIBLEGITOPS_PLAYBOOK_DIR",
    "ANSIBLEGITOPS_INVENTORY",
];

/// Clear every override so a test starts from the file contents alone.
pub(super) fn clear_overrides() -> Vec<ScopedEnv> {
    OVERRIDE_KEYS.into_iter().map(ScopedEnv::clear).collect()
}
