//! Core domain logic for the semester grade tracker.
//! This crate is the single source of truth for record invariants and
//! GPA calculation rules.

pub mod db;
pub mod diagnostics;
pub mod gpa;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use diagnostics::{DiagnosticSink, LogDiagnostics};
pub use gpa::{
    format_two_decimals, overall_gpa, overall_total_credits, semester_gpa, semester_total_credits,
    WeightedTotals,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::semester::{CreditHint, EntryMode, ManualField, SemesterKey, SemesterRecord};
pub use model::subject::{Subject, SubjectId, SubjectUpdate};
pub use model::value::InputValue;
pub use service::pending::{PendingAction, PendingChange};
pub use service::prompt::{
    ConfirmKind, ConfirmPrompt, ConfirmRequest, ConfirmResponse, Notice, Notifier, Severity,
};
pub use service::settings::WorkflowSettings;
pub use service::workflow::{ActionOutcome, BatchEditor, BatchGrades, EditingWorkflow};
pub use store::{
    default_store, BackgroundWriter, BlobError, BlobStore, DirectWriter, LoadOutcome, LoadSource,
    MemoryBlobStore, SemesterStore, SnapshotWriter, SqliteBlobStore, StoreError,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
