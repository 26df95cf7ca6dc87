//! Semester store: the unit of persistence.
//!
//! # Responsibility
//! - Hold exactly one `SemesterRecord` per fixed `SemesterKey`.
//! - Load/save the whole mapping as one serialized blob, migrating legacy
//!   shapes on load.
//! - Order fire-and-forget snapshot writes.
//!
//! # Invariants
//! - Every fixed key is always present; records are replaced, never removed.
//! - Persistence failures degrade to defaults (load) or to in-memory only
//!   state (save); they are reported to a `DiagnosticSink`.

pub mod blob;
pub mod catalog;
pub mod snapshot;
pub mod writer;

use crate::model::semester::{SemesterKey, SemesterRecord, SEMESTER_COUNT};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

pub use blob::{BlobError, BlobResult, BlobStore, MemoryBlobStore, SqliteBlobStore};
pub use catalog::{default_catalog, default_record};
pub use snapshot::{
    decode, encode, load, save, LoadOutcome, LoadSource, MigrationReport, StoreError,
    SEMESTERS_BLOB_KEY,
};
pub use writer::{BackgroundWriter, DirectWriter, SnapshotWriter};

/// Mapping of every fixed semester key to its record.
#[derive(Debug, Clone, PartialEq)]
pub struct SemesterStore {
    records: [SemesterRecord; SEMESTER_COUNT],
}

impl SemesterStore {
    /// Builds a store by producing one record per fixed key.
    pub fn from_fn(mut record_for: impl FnMut(SemesterKey) -> SemesterRecord) -> Self {
        Self {
            records: SemesterKey::ALL.map(&mut record_for),
        }
    }

    pub fn get(&self, key: SemesterKey) -> &SemesterRecord {
        &self.records[key.index()]
    }

    pub fn get_mut(&mut self, key: SemesterKey) -> &mut SemesterRecord {
        &mut self.records[key.index()]
    }

    /// Replaces the record at `key`, returning the previous one.
    pub fn replace(&mut self, key: SemesterKey, record: SemesterRecord) -> SemesterRecord {
        std::mem::replace(&mut self.records[key.index()], record)
    }

    /// Records in display order.
    pub fn iter(&self) -> impl Iterator<Item = (SemesterKey, &SemesterRecord)> {
        SemesterKey::ALL.into_iter().zip(self.records.iter())
    }
}

impl Default for SemesterStore {
    fn default() -> Self {
        default_store()
    }
}

impl Serialize for SemesterStore {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.records.len()))?;
        for (key, record) in self.iter() {
            map.serialize_entry(key.as_str(), record)?;
        }
        map.end()
    }
}

/// Fresh store: every key in detailed mode seeded with its year catalog.
pub fn default_store() -> SemesterStore {
    SemesterStore::from_fn(default_record)
}

#[cfg(test)]
mod tests {
    use super::{default_store, SemesterStore};
    use crate::model::semester::{EntryMode, SemesterKey, SemesterRecord};

    #[test]
    fn default_store_seeds_year_catalogs() {
        let store = default_store();
        assert_eq!(store.iter().count(), 5);
        assert_eq!(store.get(SemesterKey::Y1S1).subjects.len(), 8);
        assert_eq!(store.get(SemesterKey::Y2S2).subjects.len(), 8);
        assert_eq!(store.get(SemesterKey::Y3S1).subjects.len(), 3);
        assert_eq!(store.get(SemesterKey::Y2S1).subjects[2].name, "Probability and Statistics");
        for (_, record) in store.iter() {
            assert_eq!(record.mode, EntryMode::Detailed);
            assert!(record.manual_gpa.is_unset());
            assert!(record.manual_total_credits.is_unset());
            assert!(record.has_unique_ids());
        }
    }

    #[test]
    fn replace_keeps_other_keys() {
        let mut store: SemesterStore = default_store();
        let before = store.get(SemesterKey::Y1S2).clone();
        store.replace(SemesterKey::Y1S1, SemesterRecord::empty_detailed());
        assert!(store.get(SemesterKey::Y1S1).subjects.is_empty());
        assert_eq!(store.get(SemesterKey::Y1S2), &before);
    }

    #[test]
    fn serializes_keys_in_display_order() {
        let json = serde_json::to_string(&default_store()).expect("store should encode");
        let positions: Vec<usize> = SemesterKey::ALL
            .iter()
            .map(|key| json.find(&format!("\"{}\"", key.as_str())).expect("key present"))
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
