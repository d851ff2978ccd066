//! Task record.
//!
//! # Responsibility
//! - Define the `{ id, text, date }` record stored in each status list.
//! - Own the date wire format (ISO on write, ISO or `MM/DD/YYYY` on read).
//!
//! # Invariants
//! - `id` is stable for the task lifetime and never reused.
//! - `date` carries no time component; urgency is derived, never stored.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const ISO_DATE_FORMAT: &str = "%Y-%m-%d";
const PICKER_DATE_FORMAT: &str = "%m/%d/%Y";

/// Stable identifier carried through rendering as hidden metadata.
pub type TaskId = Uuid;

/// One card on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Records written before ids existed receive a fresh one on load.
    #[serde(default = "new_task_id")]
    pub id: TaskId,
    pub text: String,
    #[serde(with = "task_date")]
    pub date: NaiveDate,
}

impl Task {
    /// Creates a task with a generated id.
    pub fn new(text: impl Into<String>, date: NaiveDate) -> Self {
        Self::with_id(new_task_id(), text, date)
    }

    /// Creates a task with a caller-provided id.
    pub fn with_id(id: TaskId, text: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id,
            text: text.into(),
            date,
        }
    }

    /// Returns true when this task has the same user data as `text`/`date`.
    pub fn has_content(&self, text: &str, date: NaiveDate) -> bool {
        self.text == text && self.date == date
    }
}

/// Generates a fresh task id.
pub fn new_task_id() -> TaskId {
    Uuid::new_v4()
}

/// Raised when a raw date value cannot be read as a calendar date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateParseError(pub String);

impl Display for DateParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid task date `{}`; expected YYYY-MM-DD or MM/DD/YYYY",
            self.0
        )
    }
}

impl Error for DateParseError {}

/// Parses a raw date-picker or persisted value into a calendar date.
pub fn parse_task_date(value: &str) -> Result<NaiveDate, DateParseError> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, ISO_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(trimmed, PICKER_DATE_FORMAT))
        .map_err(|_| DateParseError(value.to_string()))
}

/// Formats a date the way it is persisted.
pub fn format_task_date(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

mod task_date {
    use super::{format_task_date, parse_task_date};
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_task_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_task_date(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_task_date, Task};
    use chrono::NaiveDate;

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn parse_accepts_iso_and_picker_formats() {
        assert_eq!(parse_task_date("2024-01-10").unwrap(), jan(10));
        assert_eq!(parse_task_date(" 01/10/2024 ").unwrap(), jan(10));
    }

    #[test]
    fn parse_rejects_garbage() {
        let err = parse_task_date("next tuesday").unwrap_err();
        assert!(err.to_string().contains("next tuesday"));
        assert!(parse_task_date("2024-02-30").is_err());
    }

    #[test]
    fn serializes_date_as_iso() {
        let task = Task::new("Draft report", jan(10));
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["date"], "2024-01-10");
        assert_eq!(value["text"], "Draft report");
        assert_eq!(value["id"], task.id.to_string());
    }

    #[test]
    fn legacy_record_without_id_gets_fresh_id() {
        let first: Task =
            serde_json::from_str(r#"{"text":"A","date":"01/01/2024"}"#).unwrap();
        let second: Task =
            serde_json::from_str(r#"{"text":"A","date":"01/01/2024"}"#).unwrap();
        assert_eq!(first.date, jan(1));
        assert_ne!(first.id, second.id);
    }
}
