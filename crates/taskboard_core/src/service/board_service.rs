//! Board use-case service.
//!
//! # Responsibility
//! - Own the session's board and its task store (no global state).
//! - Funnel every mutation (create, edit, drag, delete) through one save.
//!
//! # Invariants
//! - Mutations are applied to a working copy; the in-memory board is only
//!   replaced after the full document was saved.
//! - A rejected mutation leaves both board and storage untouched.
//! - A task dragged out of a list stays persisted at its old place until a
//!   list claims it, so storage never holds it in neither or both lists.
//! - Position-addressed edits never fall through to a neighbouring task.

use crate::audit::due_date::{audit_board, classify, AuditReport, Urgency};
use crate::config::BoardConfig;
use crate::db::{open_db, open_db_in_memory, DbError};
use crate::logging::{init_logging, LoggingError};
use crate::model::board::Board;
use crate::model::status::{Status, StatusParseError};
use crate::model::task::{Task, TaskId};
use crate::repo::kv_repo::{KeyValueStore, SqliteKeyValueStore};
use crate::repo::task_store::{StoreError, TaskStore};
use crate::service::reconcile::{
    reconcile_board, restore_detached, DetachedTask, ListUpdate, VisualTask,
};
use chrono::{DateTime, Local, NaiveDate};
use log::{info, warn};
use mockable::{Clock, DefaultClock};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type BoardResult<T> = Result<T, BoardError>;

/// Error for board use-cases.
#[derive(Debug)]
pub enum BoardError {
    /// Position no longer exists in that list (stale render).
    IndexOutOfRange {
        status: Status,
        index: usize,
        len: usize,
    },
    /// Column name outside the closed status set.
    InvalidStatus(String),
    TaskNotFound(TaskId),
    /// Same task reported twice in one reconcile request.
    DuplicateTask(TaskId),
    EmptyText,
    Store(StoreError),
    Logging(LoggingError),
}

impl Display for BoardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IndexOutOfRange { status, index, len } => write!(
                f,
                "index {index} out of range for `{status}` with {len} task(s)"
            ),
            Self::InvalidStatus(value) => write!(f, "invalid status `{value}`"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::DuplicateTask(id) => write!(f, "task {id} reported more than once"),
            Self::EmptyText => write!(f, "task text cannot be empty"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Logging(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BoardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Logging(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for BoardError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<DbError> for BoardError {
    fn from(value: DbError) -> Self {
        Self::Store(StoreError::Db(value))
    }
}

impl From<LoggingError> for BoardError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl From<StatusParseError> for BoardError {
    fn from(value: StatusParseError) -> Self {
        Self::InvalidStatus(value.0)
    }
}

/// Session handle over one board and its persistence.
pub struct BoardService<S: KeyValueStore, C: Clock> {
    store: TaskStore<S>,
    board: Board,
    detached: Vec<DetachedTask>,
    clock: C,
}

impl<S: KeyValueStore, C: Clock> BoardService<S, C> {
    /// Loads the board from `store` (or the empty skeleton) and starts a session.
    pub fn open(store: TaskStore<S>, clock: C) -> BoardResult<Self> {
        let board = store.load()?;
        Ok(Self {
            store,
            board,
            detached: Vec::new(),
            clock,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn store(&self) -> &TaskStore<S> {
        &self.store
    }

    /// Tasks dragged out of a list whose destination has not reported yet.
    pub fn detached(&self) -> &[DetachedTask] {
        &self.detached
    }

    /// Local wall-clock "now" used for urgency.
    pub fn now(&self) -> DateTime<Local> {
        self.clock.local()
    }

    /// Appends a new task to `toDo` and persists.
    ///
    /// # Contract
    /// - `text` must be non-empty after trimming.
    /// - Returns the new task's stable id.
    pub fn create_task(&mut self, text: impl Into<String>, date: NaiveDate) -> BoardResult<TaskId> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(BoardError::EmptyText);
        }

        let task = Task::new(text, date);
        let id = task.id;
        let mut next = self.board.clone();
        next.push(Status::ToDo, task);
        self.commit("task_create", next)?;
        Ok(id)
    }

    /// Replaces the text of the task at `(status, index)` and persists.
    pub fn edit_text(
        &mut self,
        status: Status,
        index: usize,
        text: impl Into<String>,
    ) -> BoardResult<()> {
        let mut next = self.board.clone();
        checked_task_mut(&mut next, status, index)?.text = text.into();
        self.commit("task_edit_text", next)
    }

    /// Replaces the date of the task at `(status, index)` and persists.
    ///
    /// Returns the task's urgency under the new date.
    pub fn edit_date(
        &mut self,
        status: Status,
        index: usize,
        date: NaiveDate,
    ) -> BoardResult<Urgency> {
        let mut next = self.board.clone();
        checked_task_mut(&mut next, status, index)?.date = date;
        self.commit("task_edit_date", next)?;
        Ok(classify(date, &self.now()))
    }

    /// Identity-addressed variant of [`Self::edit_text`].
    pub fn edit_text_by_id(&mut self, id: TaskId, text: impl Into<String>) -> BoardResult<()> {
        let (status, index) = self.locate(id)?;
        self.edit_text(status, index, text)
    }

    /// Identity-addressed variant of [`Self::edit_date`].
    pub fn edit_date_by_id(&mut self, id: TaskId, date: NaiveDate) -> BoardResult<Urgency> {
        let (status, index) = self.locate(id)?;
        self.edit_date(status, index, date)
    }

    /// Replaces one list with its visual arrangement after a drag and persists.
    ///
    /// A task missing from the new arrangement and from every other list is
    /// held as detached until a later update places it (see [`Self::detached`]).
    pub fn reconcile(&mut self, status: Status, visual: Vec<VisualTask>) -> BoardResult<()> {
        self.reconcile_lists(vec![(status, visual)])
    }

    /// Replaces several lists at once (cross-list move) with one save.
    pub fn reconcile_lists(&mut self, updates: Vec<ListUpdate>) -> BoardResult<()> {
        let outcome =
            reconcile_board(&self.board, &self.detached, updates).inspect_err(|err| {
                warn!("event=board_reconcile module=service status=rejected error={err}");
            })?;
        let stats = outcome.stats;
        if outcome.board == self.board && outcome.detached == self.detached {
            info!(
                "event=board_reconcile module=service status=ok lists={} changed=false",
                stats.lists
            );
            return Ok(());
        }

        self.commit_with("board_reconcile", outcome.board, outcome.detached)?;
        info!(
            "event=board_reconcile module=service status=ok lists={} tasks={} moved_out={} new_ids={} detached={}",
            stats.lists,
            stats.tasks,
            stats.moved_out,
            stats.new_ids,
            self.detached.len()
        );
        Ok(())
    }

    /// Removes a task dropped onto the deletion target and persists.
    ///
    /// A detached task (its source list already reported the drag) is
    /// deleted too.
    pub fn delete_task(&mut self, id: TaskId) -> BoardResult<Task> {
        if let Some(position) = self.detached.iter().position(|entry| entry.task.id == id) {
            let mut detached = self.detached.clone();
            let removed = detached.remove(position).task;
            self.commit_with("task_delete", self.board.clone(), detached)?;
            return Ok(removed);
        }

        let mut next = self.board.clone();
        let (_, removed) = next.remove(id).ok_or(BoardError::TaskNotFound(id))?;
        self.commit("task_delete", next)?;
        Ok(removed)
    }

    /// Removes the task at `(status, index)` and persists.
    pub fn delete_at(&mut self, status: Status, index: usize) -> BoardResult<Task> {
        let id = checked_task(&self.board, status, index)?.id;
        self.delete_task(id)
    }

    /// Empties every list and persists the all-empty board.
    pub fn remove_all(&mut self) -> BoardResult<()> {
        self.commit_with("board_clear", Board::empty(), Vec::new())
    }

    /// Classifies every task against the clock's current time.
    pub fn audit(&self) -> AuditReport {
        audit_board(&self.board, &self.now())
    }

    /// Urgency of one task right now.
    pub fn urgency_of(&self, id: TaskId) -> Option<Urgency> {
        let (status, index) = self.board.locate(id)?;
        let task = self.board.task(status, index)?;
        Some(classify(task.date, &self.now()))
    }

    fn locate(&self, id: TaskId) -> BoardResult<(Status, usize)> {
        self.board.locate(id).ok_or_else(|| {
            warn!("event=task_lookup module=service status=not_found task_id={id}");
            BoardError::TaskNotFound(id)
        })
    }

    fn commit(&mut self, event: &'static str, next: Board) -> BoardResult<()> {
        let detached = self.detached.clone();
        self.commit_with(event, next, detached)
    }

    /// Saves `next` with detached tasks back in place, then swaps it in.
    fn commit_with(
        &mut self,
        event: &'static str,
        next: Board,
        detached: Vec<DetachedTask>,
    ) -> BoardResult<()> {
        let durable = restore_detached(&next, &detached);
        if let Err(err) = self.store.save(&durable) {
            warn!("event={event} module=service status=error error={err}");
            return Err(err.into());
        }
        self.board = next;
        self.detached = detached;
        info!(
            "event={event} module=service status=ok tasks={} detached={}",
            self.board.len(),
            self.detached.len()
        );
        Ok(())
    }
}

impl BoardService<SqliteKeyValueStore, DefaultClock> {
    /// Opens the SQLite-backed board described by `config`.
    ///
    /// Initializes file logging first when `config.log` is set.
    pub fn open_with_config(config: &BoardConfig) -> BoardResult<Self> {
        if let Some(log) = &config.log {
            init_logging(log)?;
        }
        let conn = match &config.db_path {
            Some(path) => open_db(path)?,
            None => open_db_in_memory()?,
        };
        let store = TaskStore::with_key(SqliteKeyValueStore::new(conn), &config.storage_key);
        Self::open(store, DefaultClock)
    }
}

fn checked_task(board: &Board, status: Status, index: usize) -> BoardResult<&Task> {
    let len = board.list(status).len();
    board
        .task(status, index)
        .ok_or_else(|| index_out_of_range(status, index, len))
}

fn checked_task_mut(board: &mut Board, status: Status, index: usize) -> BoardResult<&mut Task> {
    let len = board.list(status).len();
    board
        .task_mut(status, index)
        .ok_or_else(|| index_out_of_range(status, index, len))
}

fn index_out_of_range(status: Status, index: usize, len: usize) -> BoardError {
    warn!(
        "event=task_edit module=service status=dropped reason=index_out_of_range list={status} index={index} len={len}"
    );
    BoardError::IndexOutOfRange { status, index, len }
}
