use gradebook_core::store::{decode, load, save, SEMESTERS_BLOB_KEY};
use gradebook_core::{
    BlobError, BlobStore, DiagnosticSink, EntryMode, InputValue, LoadSource, MemoryBlobStore,
    SemesterKey, SqliteBlobStore,
};
use serde_json::json;
use std::cell::RefCell;
use std::error::Error;

#[derive(Default)]
struct RecordingSink {
    failures: RefCell<Vec<String>>,
}

impl DiagnosticSink for RecordingSink {
    fn log_failure(&self, context: &str, error: &dyn Error) {
        self.failures
            .borrow_mut()
            .push(format!("{context}: {error}"));
    }
}

struct UnavailableBlob;

impl BlobStore for UnavailableBlob {
    fn get(&self, _key: &str) -> Result<Option<String>, BlobError> {
        Err(BlobError::Unavailable("storage disabled".to_string()))
    }

    fn put(&self, _key: &str, _value: &str) -> Result<(), BlobError> {
        Err(BlobError::Unavailable("storage disabled".to_string()))
    }
}

fn blob_with(value: serde_json::Value) -> MemoryBlobStore {
    MemoryBlobStore::with_value(SEMESTERS_BLOB_KEY, value.to_string())
}

fn current_entry() -> serde_json::Value {
    json!({
        "mode": "manual",
        "subjects": [],
        "manualGPA": "2.5",
        "manualTotalCredits": "20"
    })
}

#[test]
fn missing_snapshot_seeds_defaults_without_reporting() {
    let sink = RecordingSink::default();
    let outcome = load(&MemoryBlobStore::new(), &sink);

    assert_eq!(outcome.source, LoadSource::Fresh);
    assert_eq!(outcome.store.get(SemesterKey::Y1S1).subjects.len(), 8);
    assert!(sink.failures.borrow().is_empty());
}

#[test]
fn legacy_bare_array_becomes_detailed_record() {
    let legacy_subjects = json!([
        { "id": 1700000000001_u64, "name": "Korean", "credits": 4, "grade": 2 },
        { "id": 1700000000002_u64, "name": "Math", "credits": "3", "grade": "" }
    ]);
    let mut snapshot = serde_json::Map::new();
    for key in SemesterKey::ALL {
        snapshot.insert(key.as_str().to_string(), current_entry());
    }
    snapshot.insert("1-1".to_string(), legacy_subjects);
    let sink = RecordingSink::default();

    let outcome = load(&blob_with(serde_json::Value::Object(snapshot)), &sink);

    assert_eq!(outcome.source, LoadSource::Persisted);
    assert_eq!(outcome.report.legacy_keys, vec![SemesterKey::Y1S1]);
    let record = outcome.store.get(SemesterKey::Y1S1);
    assert_eq!(record.mode, EntryMode::Detailed);
    assert!(record.manual_gpa.is_unset());
    assert!(record.manual_total_credits.is_unset());
    assert_eq!(record.subjects.len(), 2);
    assert_eq!(record.subjects[0].id.as_str(), "1700000000001");
    assert_eq!(record.subjects[0].name, "Korean");
    assert_eq!(record.subjects[0].grade, InputValue::Number(2.0));
    assert_eq!(record.subjects[1].credits, InputValue::from("3"));

    let untouched = outcome.store.get(SemesterKey::Y1S2);
    assert_eq!(untouched.mode, EntryMode::Manual);
    assert_eq!(untouched.manual_gpa, InputValue::from("2.5"));
    assert!(sink.failures.borrow().is_empty());
}

#[test]
fn partial_snapshot_is_completed_and_unknown_keys_dropped() {
    let blob = blob_with(json!({
        "2-1": current_entry(),
        "4-1": current_entry()
    }));
    let outcome = load(&blob, &RecordingSink::default());

    assert_eq!(outcome.report.dropped_keys, vec!["4-1".to_string()]);
    assert_eq!(outcome.report.seeded_keys.len(), 4);
    assert!(!outcome.report.seeded_keys.contains(&SemesterKey::Y2S1));
    assert_eq!(outcome.store.get(SemesterKey::Y2S1).mode, EntryMode::Manual);
    assert_eq!(outcome.store.get(SemesterKey::Y3S1).subjects.len(), 3);
}

#[test]
fn corrupt_snapshot_falls_back_and_reports() {
    let blob = MemoryBlobStore::with_value(SEMESTERS_BLOB_KEY, "{not json");
    let sink = RecordingSink::default();

    let outcome = load(&blob, &sink);

    assert_eq!(outcome.source, LoadSource::Fallback);
    assert_eq!(outcome.store.get(SemesterKey::Y2S1).subjects.len(), 8);
    let failures = sink.failures.borrow();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].starts_with("store_load"));
}

#[test]
fn entry_of_unknown_shape_falls_back() {
    let blob = blob_with(json!({ "1-1": "garbage" }));
    let sink = RecordingSink::default();

    let outcome = load(&blob, &sink);
    assert_eq!(outcome.source, LoadSource::Fallback);
    assert_eq!(sink.failures.borrow().len(), 1);
}

#[test]
fn unavailable_blob_store_falls_back_and_save_reports() {
    let sink = RecordingSink::default();
    let outcome = load(&UnavailableBlob, &sink);
    assert_eq!(outcome.source, LoadSource::Fallback);

    assert!(!save(&outcome.store, &UnavailableBlob, &sink));
    let failures = sink.failures.borrow();
    assert_eq!(failures.len(), 2);
    assert!(failures[1].contains("storage disabled"));
}

#[test]
fn sqlite_file_round_trips_between_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gradebook.db");
    let sink = RecordingSink::default();

    let mut store = {
        let blob = SqliteBlobStore::open(&path).unwrap();
        load(&blob, &sink).store
    };
    store.get_mut(SemesterKey::Y3S1).mode = EntryMode::Manual;
    store.get_mut(SemesterKey::Y3S1).manual_gpa = InputValue::from("1.75");
    assert!(save(&store, &SqliteBlobStore::open(&path).unwrap(), &sink));

    let reopened = load(&SqliteBlobStore::open(&path).unwrap(), &sink);
    assert_eq!(reopened.source, LoadSource::Persisted);
    assert_eq!(reopened.store, store);
    assert!(sink.failures.borrow().is_empty());
}

#[test]
fn decode_accepts_null_fields_from_older_snapshots() {
    let raw = json!({
        "1-1": {
            "mode": "detailed",
            "subjects": [{ "id": "a", "name": "Korean", "credits": 4, "grade": null }],
            "manualGPA": null,
            "manualTotalCredits": null
        }
    })
    .to_string();
    let (store, report) = decode(&raw).unwrap();
    assert_eq!(report.seeded_keys.len(), 4);
    assert!(store.get(SemesterKey::Y1S1).subjects[0].grade.is_unset());
}
