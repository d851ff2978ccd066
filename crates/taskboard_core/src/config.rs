//! Board session configuration.
//!
//! Plain values with defaults; nothing is read from the environment.

use crate::logging::default_log_level;
use crate::repo::task_store::DEFAULT_STORAGE_KEY;
use std::path::PathBuf;
use std::time::Duration;

/// Default period between urgency sweeps.
pub const DEFAULT_AUDIT_INTERVAL: Duration = Duration::from_secs(30 * 60);
/// File name used when a board database is placed in a directory.
pub const DEFAULT_DB_FILE_NAME: &str = "taskboard.sqlite3";

/// File logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// One of `trace|debug|info|warn|error` (case-insensitive).
    pub level: String,
    /// Absolute directory for rolling log files.
    pub log_dir: PathBuf,
}

impl LogConfig {
    /// Uses the build-mode default level.
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            level: default_log_level().to_string(),
            log_dir: log_dir.into(),
        }
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }
}

/// Everything needed to open a board session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    /// SQLite file for the board; `None` keeps the board in memory.
    pub db_path: Option<PathBuf>,
    /// Key the board document is stored under.
    pub storage_key: String,
    pub audit_interval: Duration,
    /// File logging; `None` leaves logging uninitialized.
    pub log: Option<LogConfig>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            audit_interval: DEFAULT_AUDIT_INTERVAL,
            log: None,
        }
    }
}

impl BoardConfig {
    pub fn with_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = Some(path.into());
        self
    }

    /// Places the database under `dir` using [`DEFAULT_DB_FILE_NAME`].
    pub fn with_data_dir(self, dir: impl Into<PathBuf>) -> Self {
        let path = dir.into().join(DEFAULT_DB_FILE_NAME);
        self.with_db_path(path)
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_audit_interval(mut self, interval: Duration) -> Self {
        self.audit_interval = interval;
        self
    }

    pub fn with_logging(mut self, log: LogConfig) -> Self {
        self.log = Some(log);
        self
    }
}
