//! Drag-and-drop reconciliation.
//!
//! # Responsibility
//! - Turn the visual sequence of one or more lists back into board lists.
//! - Resolve which stored task each visual item is.
//!
//! # Invariants
//! - Each updated list is replaced wholesale, in visual order.
//! - A task claimed by an updated list is removed from every other list.
//! - A task dropped from every list is detached, never lost.
//! - The input board is never mutated; a new board is returned.

use crate::model::board::Board;
use crate::model::status::Status;
use crate::model::task::{new_task_id, Task, TaskId};
use chrono::NaiveDate;
use std::collections::HashSet;

use super::board_service::{BoardError, BoardResult};

/// What the rendering layer reports for one element of a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualTask {
    /// Hidden id metadata, when the element carries it.
    pub id: Option<TaskId>,
    pub text: String,
    pub date: NaiveDate,
}

impl VisualTask {
    /// An element without id metadata.
    pub fn new(text: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: None,
            text: text.into(),
            date,
        }
    }

    pub fn with_id(id: TaskId, text: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: Some(id),
            text: text.into(),
            date,
        }
    }
}

impl From<&Task> for VisualTask {
    fn from(task: &Task) -> Self {
        Self::with_id(task.id, task.text.clone(), task.date)
    }
}

/// One list's reported arrangement.
pub type ListUpdate = (Status, Vec<VisualTask>);

/// A task taken out of its list by a drag whose destination list has not
/// reported yet.
///
/// Detached tasks are invisible in the working board but are written back at
/// their old place whenever the board is saved, so storage never loses them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetachedTask {
    pub status: Status,
    pub index: usize,
    pub task: Task,
}

/// Outcome details for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct ReconcileStats {
    pub lists: usize,
    pub tasks: usize,
    pub moved_out: usize,
    pub new_ids: usize,
}

pub(crate) struct Reconciled {
    pub board: Board,
    pub detached: Vec<DetachedTask>,
    pub stats: ReconcileStats,
}

/// Applies `updates` to a copy of `board`.
///
/// If a status appears more than once, its last update wins. Items without an
/// id match an unclaimed task with equal content: first in their own list,
/// then among `detached`, then in the other lists.
pub(crate) fn reconcile_board(
    board: &Board,
    detached: &[DetachedTask],
    updates: Vec<ListUpdate>,
) -> BoardResult<Reconciled> {
    let mut latest: Vec<ListUpdate> = Vec::with_capacity(updates.len());
    for (status, items) in updates {
        latest.retain(|(existing, _)| *existing != status);
        latest.push((status, items));
    }

    let mut claimed = HashSet::new();
    for (_, items) in &latest {
        for id in items.iter().filter_map(|item| item.id) {
            if !claimed.insert(id) {
                return Err(BoardError::DuplicateTask(id));
            }
        }
    }

    // Same-list matches first so a reorder never steals a task from elsewhere.
    let mut resolved: Vec<Vec<Option<TaskId>>> = Vec::with_capacity(latest.len());
    for (status, items) in &latest {
        let mut ids = Vec::with_capacity(items.len());
        for item in items {
            let id = item
                .id
                .or_else(|| match_existing(board.list(*status), item, &claimed));
            if let Some(id) = id {
                claimed.insert(id);
            }
            ids.push(id);
        }
        resolved.push(ids);
    }

    let mut stats = ReconcileStats {
        lists: latest.len(),
        ..ReconcileStats::default()
    };
    let mut next = board.clone();
    let mut updated = HashSet::new();

    for ((status, items), ids) in latest.into_iter().zip(resolved) {
        let mut tasks = Vec::with_capacity(items.len());
        for (item, id) in items.into_iter().zip(ids) {
            let id = id.or_else(|| match_moved(board, status, detached, &item, &claimed));
            let id = match id {
                Some(id) => id,
                None => {
                    stats.new_ids += 1;
                    new_task_id()
                }
            };
            claimed.insert(id);
            tasks.push(Task::with_id(id, item.text, item.date));
        }
        stats.tasks += tasks.len();
        next.replace_list(status, tasks);
        updated.insert(status);
    }

    for status in Status::ALL.into_iter().filter(|s| !updated.contains(s)) {
        let list = next.list_mut(status);
        let before = list.len();
        list.retain(|task| !claimed.contains(&task.id));
        stats.moved_out += before - list.len();
    }

    let placed: HashSet<TaskId> = next.iter().map(|(_, _, task)| task.id).collect();
    let mut still_detached: Vec<DetachedTask> = detached
        .iter()
        .filter(|entry| !placed.contains(&entry.task.id))
        .cloned()
        .collect();
    for (status, index, task) in board.iter() {
        if !placed.contains(&task.id) {
            still_detached.push(DetachedTask {
                status,
                index,
                task: task.clone(),
            });
        }
    }

    Ok(Reconciled {
        board: next,
        detached: still_detached,
        stats,
    })
}

/// Returns `board` with every detached task put back at its old position.
pub(crate) fn restore_detached(board: &Board, detached: &[DetachedTask]) -> Board {
    let mut restored = board.clone();
    let mut ordered: Vec<&DetachedTask> = detached.iter().collect();
    ordered.sort_by_key(|entry| entry.index);
    for entry in ordered {
        let list = restored.list_mut(entry.status);
        let index = entry.index.min(list.len());
        list.insert(index, entry.task.clone());
    }
    restored
}

fn match_existing(list: &[Task], item: &VisualTask, claimed: &HashSet<TaskId>) -> Option<TaskId> {
    list.iter()
        .find(|task| !claimed.contains(&task.id) && task.has_content(&item.text, item.date))
        .map(|task| task.id)
}

fn match_moved(
    board: &Board,
    status: Status,
    detached: &[DetachedTask],
    item: &VisualTask,
    claimed: &HashSet<TaskId>,
) -> Option<TaskId> {
    let pending = detached.iter().map(|entry| &entry.task);
    let elsewhere = Status::ALL
        .into_iter()
        .filter(|other| *other != status)
        .flat_map(|other| board.list(other).iter());
    pending
        .chain(elsewhere)
        .find(|task| !claimed.contains(&task.id) && task.has_content(&item.text, item.date))
        .map(|task| task.id)
}
