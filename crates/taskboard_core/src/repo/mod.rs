//! Persistence layer for the board document.
//!
//! # Responsibility
//! - Define the key/value seam the board is persisted through.
//! - Serialize the whole board to one entry and read it back.
//!
//! # Invariants
//! - Saves replace the full document; there is no incremental write path.
//! - Absent or malformed documents read back as the empty skeleton board.

pub mod kv_repo;
pub mod task_store;
