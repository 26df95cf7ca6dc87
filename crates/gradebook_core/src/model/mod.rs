//! Semester record domain model.
//!
//! # Responsibility
//! - Define the subject, semester record and raw input value shapes.
//! - Keep the persisted JSON field names stable across versions.
//!
//! # Invariants
//! - Every subject is identified by a stable `SubjectId`.
//! - Exactly one input style per semester is authoritative, chosen by
//!   `EntryMode`; the other style's data is preserved untouched.

pub mod semester;
pub mod subject;
pub mod value;
