//! Serialized snapshot codec with legacy-shape migration.
//!
//! # Responsibility
//! - Encode the whole store as one JSON object keyed by semester key.
//! - Decode current and legacy per-key shapes and normalize them.
//! - Load with default fallback; save with failure reporting.
//!
//! # Invariants
//! - Decode is per key: current shape first, then legacy bare subject
//!   array; anything else fails the whole decode into the defaults path.
//! - Unknown keys are dropped, missing fixed keys are seeded.
//! - Duplicate subject ids inside one record are renewed on load.

use crate::diagnostics::DiagnosticSink;
use crate::model::semester::{SemesterKey, SemesterRecord};
use crate::model::subject::{Subject, SubjectId};
use crate::store::blob::{BlobError, BlobStore};
use crate::store::catalog::default_record;
use crate::store::{default_store, SemesterStore};
use log::{info, warn};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Fixed blob-store key holding the serialized semester store.
pub const SEMESTERS_BLOB_KEY: &str = "gradeCalculatorSemesters";

/// Snapshot load/save failure.
#[derive(Debug)]
pub enum StoreError {
    Blob(BlobError),
    Decode(serde_json::Error),
    Encode(serde_json::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blob(err) => write!(f, "{err}"),
            Self::Decode(err) => write!(f, "invalid persisted semester data: {err}"),
            Self::Encode(err) => write!(f, "failed to serialize semester data: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Blob(err) => Some(err),
            Self::Decode(err) | Self::Encode(err) => Some(err),
        }
    }
}

impl From<BlobError> for StoreError {
    fn from(value: BlobError) -> Self {
        Self::Blob(value)
    }
}

/// Per-key persisted shape.
#[derive(Deserialize)]
#[serde(untagged)]
enum PersistedEntry {
    Current(SemesterRecord),
    /// Bare subject list written before the mode wrapper existed.
    Legacy(Vec<Subject>),
}

impl PersistedEntry {
    fn normalize(self) -> (SemesterRecord, bool) {
        match self {
            Self::Current(record) => (record, false),
            Self::Legacy(subjects) => (SemesterRecord::detailed(subjects), true),
        }
    }
}

/// What decode had to repair to produce a complete store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Keys stored in the legacy bare-array shape.
    pub legacy_keys: Vec<SemesterKey>,
    /// Fixed keys absent from the snapshot, seeded with defaults.
    pub seeded_keys: Vec<SemesterKey>,
    /// Keys in the snapshot that are not fixed semester keys.
    pub dropped_keys: Vec<String>,
    /// Subjects whose duplicate id was replaced.
    pub renewed_ids: usize,
}

impl MigrationReport {
    pub fn is_clean(&self) -> bool {
        self == &Self::default()
    }
}

/// Where a loaded store came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Decoded from the persisted snapshot.
    Persisted,
    /// Nothing was saved yet; defaults were seeded.
    Fresh,
    /// The snapshot or blob store failed; defaults were seeded.
    Fallback,
}

/// Result of [`load`]; always carries a usable store.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub store: SemesterStore,
    pub source: LoadSource,
    pub report: MigrationReport,
}

/// Serializes the store to its persisted JSON form.
pub fn encode(store: &SemesterStore) -> Result<String, StoreError> {
    serde_json::to_string(store).map_err(StoreError::Encode)
}

/// Parses a persisted snapshot, migrating legacy shapes per key.
pub fn decode(raw: &str) -> Result<(SemesterStore, MigrationReport), StoreError> {
    let entries: BTreeMap<String, PersistedEntry> =
        serde_json::from_str(raw).map_err(StoreError::Decode)?;

    let mut report = MigrationReport::default();
    let mut decoded: BTreeMap<SemesterKey, SemesterRecord> = BTreeMap::new();
    for (raw_key, entry) in entries {
        let Some(key) = SemesterKey::parse(&raw_key) else {
            report.dropped_keys.push(raw_key);
            continue;
        };
        let (mut record, legacy) = entry.normalize();
        if legacy {
            report.legacy_keys.push(key);
        }
        report.renewed_ids += renew_duplicate_ids(&mut record);
        decoded.insert(key, record);
    }

    let store = SemesterStore::from_fn(|key| {
        decoded.remove(&key).unwrap_or_else(|| {
            report.seeded_keys.push(key);
            default_record(key)
        })
    });
    Ok((store, report))
}

/// Loads the store from `blob`, never failing.
///
/// Missing data seeds defaults; unreadable or corrupt data is reported to
/// `sink` and also seeds defaults.
pub fn load(blob: &impl BlobStore, sink: &impl DiagnosticSink) -> LoadOutcome {
    let raw = match blob.get(SEMESTERS_BLOB_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            info!("event=store_load module=store status=ok source=fresh");
            return defaults(LoadSource::Fresh);
        }
        Err(err) => {
            sink.log_failure("store_load", &StoreError::Blob(err));
            return defaults(LoadSource::Fallback);
        }
    };

    match decode(&raw) {
        Ok((store, report)) => {
            if report.is_clean() {
                info!("event=store_load module=store status=ok source=persisted");
            } else {
                warn!(
                    "event=store_load module=store status=migrated legacy_keys={} seeded_keys={} dropped_keys={} renewed_ids={}",
                    report.legacy_keys.len(),
                    report.seeded_keys.len(),
                    report.dropped_keys.len(),
                    report.renewed_ids
                );
            }
            LoadOutcome {
                store,
                source: LoadSource::Persisted,
                report,
            }
        }
        Err(err) => {
            sink.log_failure("store_load", &err);
            defaults(LoadSource::Fallback)
        }
    }
}

/// Serializes and writes the store synchronously.
///
/// Returns whether the write succeeded; failures are reported to `sink`
/// and leave the caller's in-memory store authoritative.
pub fn save(store: &SemesterStore, blob: &impl BlobStore, sink: &impl DiagnosticSink) -> bool {
    let result = encode(store).and_then(|raw| Ok(blob.put(SEMESTERS_BLOB_KEY, &raw)?));
    match result {
        Ok(()) => true,
        Err(err) => {
            sink.log_failure("store_save", &err);
            false
        }
    }
}

fn defaults(source: LoadSource) -> LoadOutcome {
    LoadOutcome {
        store: default_store(),
        source,
        report: MigrationReport::default(),
    }
}

fn renew_duplicate_ids(record: &mut SemesterRecord) -> usize {
    let mut seen: HashSet<SubjectId> = HashSet::with_capacity(record.subjects.len());
    let mut renewed = 0;
    for subject in &mut record.subjects {
        if !seen.insert(subject.id.clone()) {
            subject.id = SubjectId::generate();
            seen.insert(subject.id.clone());
            renewed += 1;
        }
    }
    renewed
}
