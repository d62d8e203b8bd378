use super::Config;
use super::interpolate::interpolate_env;
use crate::error::ConfigError;
use directories::UserDirs;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_ENV_VAR: &str = "ANSIBLEGITOPS_CONFIG";
const CONFIG_FILE_NAME: &str = "config.toml";

impl Config {
    /// Resolve, read, interpolate, override and validate the configuration.
    ///
    /// Lookup order: explicit path, `$ANSIBLEGITOPS_CONFIG`, `./config.toml`,
    /// `~/.ansiblegitops/config.toml`.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = resolve_config_path(explicit)?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| {
            ConfigError::Load(format!("failed to read {}: {e}", path.display()))
        })?;
        let mut config = Self::parse_with(&contents, |key| std::env::var(key).ok())?;
        config.config_path = path.to_path_buf();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Substitute `${VAR}` placeholders through `lookup`, then parse TOML.
    /// Does not validate.
    pub fn parse_with<F>(contents: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let interpolated = interpolate_env(contents, lookup);
        toml::from_str(&interpolated)
            .map_err(|e| ConfigError::Load(format!("failed to parse config file: {e}")))
    }
}

fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.is_empty()
    {
        return Ok(PathBuf::from(shellexpand::tilde(&path).into_owned()));
    }

    let mut searched = Vec::new();
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return Ok(local);
    }
    searched.push(local.display().to_string());

    if let Some(home) = UserDirs::new().map(|u| u.home_dir().to_path_buf()) {
        let candidate = home.join(".ansiblegitops").join(CONFIG_FILE_NAME);
        if candidate.exists() {
            return Ok(candidate);
        }
        searched.push(candidate.display().to_string());
    }

    Err(ConfigError::NotFound {
        searched: searched.join(", "),
    })
}
