//! Whole-board persistence over a key/value entry.
//!
//! # Responsibility
//! - Serialize the board as one JSON document under a well-known key.
//! - Read it back, falling back to the empty skeleton when absent/malformed.
//!
//! # Invariants
//! - `load()` right after `save(b)` yields a board equal to `b`.
//! - Storage transport failures are never masked as an empty board.

use crate::db::DbError;
use crate::model::board::Board;
use crate::repo::kv_repo::KeyValueStore;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Key the board document is stored under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "tasks";

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence error for board load/save.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    Serialize(serde_json::Error),
    /// Document present but not a valid board.
    MalformedPersistedState(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialize(err) => write!(f, "failed to serialize board: {err}"),
            Self::MalformedPersistedState(message) => {
                write!(f, "malformed persisted board: {message}")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialize(err) => Some(err),
            Self::MalformedPersistedState(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Owns the key/value backend and the key the board lives under.
pub struct TaskStore<S: KeyValueStore> {
    kv: S,
    key: String,
}

impl<S: KeyValueStore> TaskStore<S> {
    /// Creates a store using [`DEFAULT_STORAGE_KEY`].
    pub fn new(kv: S) -> Self {
        Self::with_key(kv, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(kv: S, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend(&self) -> &S {
        &self.kv
    }

    /// Reads the persisted board.
    ///
    /// Absent and malformed documents both yield [`Board::empty`]; only
    /// storage failures are returned as errors.
    pub fn load(&self) -> StoreResult<Board> {
        match self.try_load() {
            Ok(Some(board)) => {
                info!(
                    "event=board_load module=store status=ok source=persisted tasks={}",
                    board.len()
                );
                Ok(board)
            }
            Ok(None) => {
                info!("event=board_load module=store status=ok source=skeleton reason=absent");
                Ok(Board::empty())
            }
            Err(StoreError::MalformedPersistedState(message)) => {
                warn!(
                    "event=board_load module=store status=fallback source=skeleton reason=malformed error={message}"
                );
                Ok(Board::empty())
            }
            Err(err) => Err(err),
        }
    }

    /// Reads the persisted board, distinguishing absent from malformed.
    pub fn try_load(&self) -> StoreResult<Option<Board>> {
        let Some(raw) = self.kv.get(&self.key)? else {
            return Ok(None);
        };
        if raw.trim().is_empty() || raw.trim() == "null" {
            return Ok(None);
        }

        let board: Board = serde_json::from_str(&raw)
            .map_err(|err| StoreError::MalformedPersistedState(err.to_string()))?;
        board
            .validate()
            .map_err(|err| StoreError::MalformedPersistedState(err.to_string()))?;
        Ok(Some(board))
    }

    /// Overwrites the persisted document with the full board.
    pub fn save(&mut self, board: &Board) -> StoreResult<()> {
        let document = serde_json::to_string(board).map_err(StoreError::Serialize)?;
        self.kv.set(&self.key, &document)?;
        let [to_do, in_progress, in_review, done] = board.counts().map(|(_, count)| count);
        info!(
            "event=board_save module=store status=ok bytes={} to_do={to_do} in_progress={in_progress} in_review={in_review} done={done}",
            document.len()
        );
        Ok(())
    }

    /// Deletes the persisted document; the next load yields the skeleton.
    pub fn clear(&mut self) -> StoreResult<()> {
        self.kv.remove(&self.key)?;
        Ok(())
    }
}
