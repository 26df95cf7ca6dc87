//! Editing use-case services.
//!
//! # Responsibility
//! - Orchestrate semester mutations behind user-facing operations.
//! - Keep UI/FFI layers decoupled from storage and prompt widgets.

pub mod pending;
pub mod prompt;
pub mod settings;
pub mod workflow;
