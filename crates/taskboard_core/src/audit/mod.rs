//! Due-date urgency classification.
//!
//! # Responsibility
//! - Classify a task date against "now" into normal/warning/overdue.
//! - Produce whole-board reports for the presentation layer.
//!
//! # Invariants
//! - Classification is pure: same inputs, same output, no side effects.
//! - Nothing in this module mutates a board.

pub mod due_date;
