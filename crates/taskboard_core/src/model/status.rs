//! Closed status set for board columns.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Column a task currently lives in.
///
/// Serialized with the exact column names used by the persisted document
/// (`toDo`, `inProgress`, `inReview`, `done`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Status {
    /// Newly created tasks land here.
    ToDo,
    InProgress,
    InReview,
    Done,
}

impl Status {
    /// All statuses in board display order.
    pub const ALL: [Status; 4] = [
        Status::ToDo,
        Status::InProgress,
        Status::InReview,
        Status::Done,
    ];

    /// Returns the persisted/rendered column name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ToDo => "toDo",
            Self::InProgress => "inProgress",
            Self::InReview => "inReview",
            Self::Done => "done",
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a column name from outside the core is not a known status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusParseError(pub String);

impl Display for StatusParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid status `{}`; expected toDo|inProgress|inReview|done",
            self.0
        )
    }
}

impl Error for StatusParseError {}

impl FromStr for Status {
    type Err = StatusParseError;

    /// Accepts the column name as rendered, optionally with the `list-`
    /// element-id prefix used by the board markup.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let name = trimmed.strip_prefix("list-").unwrap_or(trimmed);
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == name)
            .ok_or_else(|| StatusParseError(value.to_string()))
    }
}
