//! Deadline rules for task dates.
//!
//! A task is due at 17:00 local time on its date. It is overdue strictly
//! after that instant, and in warning while at most two whole days remain.

use crate::model::board::Board;
use crate::model::status::Status;
use crate::model::task::TaskId;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use std::fmt::{Display, Formatter};

/// Hour of day (local) at which a task date falls due.
pub const DEADLINE_HOUR: i64 = 17;
/// Whole days before the deadline that still count as warning (inclusive).
pub const WARNING_WINDOW_DAYS: i64 = 2;

/// Presentation urgency of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Urgency {
    Normal,
    Warning,
    Overdue,
}

impl Urgency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Warning => "warning",
            Self::Overdue => "overdue",
        }
    }
}

impl Display for Urgency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Returns the local deadline instant for a task date.
pub fn deadline_of(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) + Duration::hours(DEADLINE_HOUR)
}

/// Classifies `date` relative to `now`, using `now`'s local wall clock.
///
/// The deadline equal to `now` is not overdue. The day distance is truncated
/// toward zero, so anything under three full days out is a warning.
pub fn classify<Tz: TimeZone>(date: NaiveDate, now: &DateTime<Tz>) -> Urgency {
    let deadline = deadline_of(date);
    let now = now.naive_local();

    if now > deadline {
        Urgency::Overdue
    } else if (deadline - now).num_days().abs() <= WARNING_WINDOW_DAYS {
        Urgency::Warning
    } else {
        Urgency::Normal
    }
}

/// Urgency of one task at its board position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditEntry {
    pub id: TaskId,
    pub status: Status,
    pub index: usize,
    pub urgency: Urgency,
}

/// Result of classifying every task on a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditReport {
    /// Local wall-clock time the sweep was evaluated at.
    pub evaluated_at: NaiveDateTime,
    /// Entries in board order (status, then position).
    pub entries: Vec<AuditEntry>,
}

impl AuditReport {
    pub fn urgency_of(&self, id: TaskId) -> Option<Urgency> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.urgency)
    }

    pub fn count(&self, urgency: Urgency) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.urgency == urgency)
            .count()
    }

    pub fn overdue_count(&self) -> usize {
        self.count(Urgency::Overdue)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Urgency::Warning)
    }
}

/// Classifies every task on `board` against `now`.
pub fn audit_board<Tz: TimeZone>(board: &Board, now: &DateTime<Tz>) -> AuditReport {
    let entries = board
        .iter()
        .map(|(status, index, task)| AuditEntry {
            id: task.id,
            status,
            index,
            urgency: classify(task.date, now),
        })
        .collect();

    AuditReport {
        evaluated_at: now.naive_local(),
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::{classify, deadline_of, Urgency};
    use chrono::{NaiveDate, TimeZone, Utc};

    #[test]
    fn deadline_is_five_pm_on_the_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        assert_eq!(
            deadline_of(date).to_string(),
            "2024-01-10 17:00:00".to_string()
        );
    }

    #[test]
    fn same_day_before_deadline_is_warning() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let morning = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
        assert_eq!(classify(date, &morning), Urgency::Warning);
    }

    #[test]
    fn classification_is_repeatable() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 20).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
        assert_eq!(classify(date, &now), classify(date, &now));
        assert_eq!(classify(date, &now), Urgency::Normal);
    }
}
