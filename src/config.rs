//! Runtime configuration resolved from command-line flags and environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// Overrides the data directory (`$HOME/.todo` otherwise).
pub const HOME_ENV: &str = "TODO_HOME";

const DATA_DIR_NAME: &str = ".todo";
const DB_FILE_NAME: &str = "tasks.json";
const LOG_DIR_NAME: &str = "logs";

pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unsupported log level `{0}`; expected trace|debug|info|warn|error")]
    LogLevel(String),
    #[error("reminder interval must be at least 1 second, got {0}")]
    Interval(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: &'static str,
}

impl Config {
    /// Resolve against the process environment.
    pub fn resolve(db: Option<PathBuf>, log_level: Option<&str>) -> Result<Self, ConfigError> {
        let todo_home = std::env::var_os(HOME_ENV).map(PathBuf::from);
        let home = std::env::var_os("HOME").map(PathBuf::from);
        Self::from_parts(db, log_level, todo_home, home)
    }

    /// Resolve from explicit values. Empty environment values count as unset.
    pub fn from_parts(
        db: Option<PathBuf>,
        log_level: Option<&str>,
        todo_home: Option<PathBuf>,
        home: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let data_dir = non_empty(todo_home)
            .or_else(|| non_empty(home).map(|h| h.join(DATA_DIR_NAME)))
            .unwrap_or_else(|| Path::new(".").join(DATA_DIR_NAME));
        let log_level = match log_level {
            Some(level) => normalize_level(level)?,
            None => default_log_level(),
        };
        Ok(Self {
            db_path: db.unwrap_or_else(|| data_dir.join(DB_FILE_NAME)),
            log_dir: data_dir.join(LOG_DIR_NAME),
            data_dir,
            log_level,
        })
    }
}

fn non_empty(path: Option<PathBuf>) -> Option<PathBuf> {
    path.filter(|p| !p.as_os_str().is_empty())
}

/// `debug` in debug builds, `info` in release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

pub fn normalize_level(level: &str) -> Result<&'static str, ConfigError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(ConfigError::LogLevel(other.to_string())),
    }
}

/// Validate the `remind --watch` sweep interval.
pub fn sweep_interval(secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::Interval(secs));
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_home_wins_over_home() {
        let cfg = Config::from_parts(
            None,
            Some("INFO"),
            Some(PathBuf::from("/srv/todo")),
            Some(PathBuf::from("/home/ana")),
        )
        .unwrap();
        assert_eq!(cfg.data_dir, PathBuf::from("/srv/todo"));
        assert_eq!(cfg.db_path, PathBuf::from("/srv/todo/tasks.json"));
        assert_eq!(cfg.log_dir, PathBuf::from("/srv/todo/logs"));
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn falls_back_to_home_then_working_directory() {
        let cfg =
            Config::from_parts(None, None, Some(PathBuf::new()), Some(PathBuf::from("/home/ana")))
                .unwrap();
        assert_eq!(cfg.data_dir, PathBuf::from("/home/ana/.todo"));
        assert_eq!(cfg.log_level, default_log_level());

        let cfg = Config::from_parts(None, None, None, None).unwrap();
        assert_eq!(cfg.data_dir, PathBuf::from("./.todo"));
    }

    #[test]
    fn explicit_db_path_is_kept() {
        let cfg = Config::from_parts(
            Some(PathBuf::from("/tmp/mine.json")),
            None,
            None,
            Some(PathBuf::from("/home/ana")),
        )
        .unwrap();
        assert_eq!(cfg.db_path, PathBuf::from("/tmp/mine.json"));
        assert_eq!(cfg.log_dir, PathBuf::from("/home/ana/.todo/logs"));
    }

    #[test]
    fn log_levels_are_normalized_or_rejected() {
        assert_eq!(normalize_level(" Warning "), Ok("warn"));
        assert_eq!(normalize_level("loud"), Err(ConfigError::LogLevel("loud".into())));
    }

    #[test]
    fn interval_must_be_positive() {
        assert_eq!(sweep_interval(0), Err(ConfigError::Interval(0)));
        assert_eq!(sweep_interval(90), Ok(Duration::from_secs(90)));
    }
}
