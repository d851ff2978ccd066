//! Board use-case services.
//!
//! # Responsibility
//! - Orchestrate model mutations and persistence into session-level APIs.
//! - Keep rendering/drag-and-drop glue decoupled from storage details.

pub mod board_service;
pub mod reconcile;
