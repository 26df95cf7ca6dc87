//! SQLite bootstrap for the persisted semester blob.
//!
//! # Responsibility
//! - Open and configure SQLite connections backing `SqliteBlobStore`.
//! - Apply schema migrations in deterministic order.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - No blob is read or written before migrations succeed.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while preparing or querying the blob database.
#[derive(Debug)]
pub enum DbError {
    /// The file could not be opened or configured.
    Open(rusqlite::Error),
    /// Migration to `to_version` failed and was rolled back.
    Migrate {
        to_version: u32,
        source: rusqlite::Error,
    },
    /// The file was written by a build with a newer blob schema.
    SchemaTooNew { found: u32, supported: u32 },
    /// Statement failure on an open connection.
    Query(rusqlite::Error),
}

impl DbError {
    /// Stable short code for log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Open(_) => "open",
            Self::Migrate { .. } => "migrate",
            Self::SchemaTooNew { .. } => "schema_too_new",
            Self::Query(_) => "query",
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open(err) => write!(f, "cannot open grade database: {err}"),
            Self::Migrate { to_version, source } => {
                write!(f, "blob schema migration to v{to_version} failed: {source}")
            }
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "grade database uses blob schema v{found}, this build reads up to v{supported}"
            ),
            Self::Query(err) => write!(f, "grade database query failed: {err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open(err) | Self::Query(err) => Some(err),
            Self::Migrate { source, .. } => Some(source),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Query(value)
    }
}
