//! Runtime configuration resolved from the process environment.
//!
//! # Invariants
//! - Blank variables fall back to defaults.
//! - `log_dir`, when set, is absolute.

use crate::logging::default_log_level;
use std::path::PathBuf;
use thiserror::Error;

pub const ENV_DB_PATH: &str = "POCKETNOTE_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "POCKETNOTE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "POCKETNOTE_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "pocketnote.sqlite3";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be an absolute path, got `{value}`")]
    RelativePath { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesConfig {
    /// SQLite file holding the note store.
    pub db_path: PathBuf,
    pub log_level: String,
    /// Logging stays off when `None`.
    pub log_dir: Option<PathBuf>,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl NotesConfig {
    /// Reads configuration from `POCKETNOTE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        if let Some(dir) = read(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(dir));
        }
        config.validate()?;
        Ok(config)
    }

    /// Checks the resolved values; call again after applying overrides.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.log_dir.as_ref() {
            Some(dir) if !dir.is_absolute() => Err(ConfigError::RelativePath {
                var: ENV_LOG_DIR,
                value: dir.display().to_string(),
            }),
            _ => Ok(()),
        }
    }
}

/// Default on-device database location.
pub fn default_db_path() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::{default_db_path, ConfigError, NotesConfig, ENV_DB_PATH, ENV_LOG_DIR};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = NotesConfig::from_lookup(lookup(&[(ENV_DB_PATH, "  ")])).unwrap();
        assert_eq!(config.db_path, default_db_path());
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = NotesConfig::from_lookup(lookup(&[
            (ENV_DB_PATH, "/data/notes.sqlite3"),
            (ENV_LOG_DIR, "/data/logs"),
        ]))
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/data/notes.sqlite3"));
        assert_eq!(config.log_dir, Some(PathBuf::from("/data/logs")));
    }

    #[test]
    fn relative_log_dir_is_rejected() {
        let err = NotesConfig::from_lookup(lookup(&[(ENV_LOG_DIR, "logs")])).unwrap_err();
        assert!(matches!(err, ConfigError::RelativePath { .. }));
    }

    #[test]
    fn validate_checks_overridden_log_dir() {
        let mut config = NotesConfig::default();
        config.log_dir = Some(PathBuf::from("/var/log/pocketnote"));
        assert_eq!(config.validate(), Ok(()));

        config.log_dir = Some(PathBuf::from("logs"));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RelativePath { .. })
        ));
    }
}
