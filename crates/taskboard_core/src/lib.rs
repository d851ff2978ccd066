//! Core domain logic for the task board.
//! This crate is the single source of truth for board invariants.

pub mod audit;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod scheduler;
pub mod service;

pub use audit::due_date::{audit_board, classify, AuditEntry, AuditReport, Urgency};
pub use config::{BoardConfig, LogConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::board::{Board, BoardValidationError};
pub use model::status::{Status, StatusParseError};
pub use model::task::{format_task_date, parse_task_date, DateParseError, Task, TaskId};
pub use repo::kv_repo::{KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore};
pub use repo::task_store::{StoreError, StoreResult, TaskStore, DEFAULT_STORAGE_KEY};
pub use scheduler::{AuditScheduler, BoardSnapshot, SchedulerError, UrgencySink};
pub use service::board_service::{BoardError, BoardResult, BoardService};
pub use service::reconcile::{DetachedTask, ListUpdate, VisualTask};

/// Minimal health-check API for wiring probes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
