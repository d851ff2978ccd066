//! Board aggregate: status -> ordered task list.
//!
//! # Responsibility
//! - Hold the four fixed status lists.
//! - Provide position and identity lookups used by editing and reconciling.
//!
//! # Invariants
//! - All four statuses are always present (possibly empty).
//! - `validate()` rejects boards where one id appears more than once.

use crate::model::status::Status;
use crate::model::task::{Task, TaskId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// In-memory board. Serializes to the persisted document shape
/// `{"toDo": [...], "inProgress": [...], "inReview": [...], "done": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Board {
    #[serde(default)]
    to_do: Vec<Task>,
    #[serde(default)]
    in_progress: Vec<Task>,
    #[serde(default)]
    in_review: Vec<Task>,
    #[serde(default)]
    done: Vec<Task>,
}

/// Board-level consistency failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardValidationError {
    DuplicateTaskId(TaskId),
}

impl Display for BoardValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateTaskId(id) => write!(f, "task id {id} appears more than once"),
        }
    }
}

impl Error for BoardValidationError {}

impl Board {
    /// Returns the empty four-status skeleton.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the ordered tasks of one status.
    pub fn list(&self, status: Status) -> &[Task] {
        match status {
            Status::ToDo => &self.to_do,
            Status::InProgress => &self.in_progress,
            Status::InReview => &self.in_review,
            Status::Done => &self.done,
        }
    }

    pub(crate) fn list_mut(&mut self, status: Status) -> &mut Vec<Task> {
        match status {
            Status::ToDo => &mut self.to_do,
            Status::InProgress => &mut self.in_progress,
            Status::InReview => &mut self.in_review,
            Status::Done => &mut self.done,
        }
    }

    /// Gets the task at `(status, index)`.
    pub fn task(&self, status: Status, index: usize) -> Option<&Task> {
        self.list(status).get(index)
    }

    pub(crate) fn task_mut(&mut self, status: Status, index: usize) -> Option<&mut Task> {
        self.list_mut(status).get_mut(index)
    }

    /// Finds the current position of a task by identity.
    pub fn locate(&self, id: TaskId) -> Option<(Status, usize)> {
        Status::ALL.into_iter().find_map(|status| {
            self.list(status)
                .iter()
                .position(|task| task.id == id)
                .map(|index| (status, index))
        })
    }

    /// Iterates every task as `(status, index, task)` in board order.
    pub fn iter(&self) -> impl Iterator<Item = (Status, usize, &Task)> + '_ {
        Status::ALL.into_iter().flat_map(move |status| {
            self.list(status)
                .iter()
                .enumerate()
                .map(move |(index, task)| (status, index, task))
        })
    }

    /// Total number of tasks across all statuses.
    pub fn len(&self) -> usize {
        Status::ALL.iter().map(|status| self.list(*status).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends a task to the end of a status list.
    pub fn push(&mut self, status: Status, task: Task) {
        self.list_mut(status).push(task);
    }

    /// Replaces a whole status list, returning the previous content.
    pub fn replace_list(&mut self, status: Status, tasks: Vec<Task>) -> Vec<Task> {
        std::mem::replace(self.list_mut(status), tasks)
    }

    /// Removes the task with `id` wherever it lives.
    pub fn remove(&mut self, id: TaskId) -> Option<(Status, Task)> {
        let (status, index) = self.locate(id)?;
        Some((status, self.list_mut(status).remove(index)))
    }

    /// Empties every status list.
    pub fn clear(&mut self) {
        for status in Status::ALL {
            self.list_mut(status).clear();
        }
    }

    /// Per-status task counts in board order.
    pub fn counts(&self) -> [(Status, usize); 4] {
        Status::ALL.map(|status| (status, self.list(status).len()))
    }

    /// Checks that every task id is unique across the board.
    pub fn validate(&self) -> Result<(), BoardValidationError> {
        let mut seen = HashSet::with_capacity(self.len());
        for (_, _, task) in self.iter() {
            if !seen.insert(task.id) {
                return Err(BoardValidationError::DuplicateTaskId(task.id));
            }
        }
        Ok(())
    }
}
