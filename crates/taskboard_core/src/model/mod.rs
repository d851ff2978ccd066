//! Board domain model.
//!
//! # Responsibility
//! - Define the task record, the closed status set and the board mapping.
//! - Keep the persisted JSON shape in one place (serde attributes).
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - A task id appears in exactly one status list.
//! - List order is user priority and survives persistence unchanged.

pub mod board;
pub mod status;
pub mod task;
