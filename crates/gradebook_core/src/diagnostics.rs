//! Failure reporting channel for persistence paths.
//!
//! Load and save failures never reach callers as errors; they are
//! reported here and the system keeps a usable in-memory state.

use log::error;
use std::error::Error;
use std::sync::Arc;

/// Receives load/save failures.
pub trait DiagnosticSink {
    fn log_failure(&self, context: &str, error: &dyn Error);
}

/// Default sink writing `status=error` events through `log`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDiagnostics;

impl DiagnosticSink for LogDiagnostics {
    fn log_failure(&self, context: &str, error: &dyn Error) {
        error!("event={context} module=store status=error error={error}");
    }
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for Arc<T> {
    fn log_failure(&self, context: &str, error: &dyn Error) {
        (**self).log_failure(context, error);
    }
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for &T {
    fn log_failure(&self, context: &str, error: &dyn Error) {
        (**self).log_failure(context, error);
    }
}
