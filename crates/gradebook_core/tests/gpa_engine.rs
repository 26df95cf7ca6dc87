use gradebook_core::{
    default_store, overall_gpa, overall_total_credits, semester_gpa, semester_total_credits,
    EntryMode, InputValue, SemesterKey, SemesterRecord, SemesterStore, Subject,
};

fn graded(credits: impl Into<InputValue>, grade: impl Into<InputValue>) -> Subject {
    let mut subject = Subject::new("subject", credits);
    subject.grade = grade.into();
    subject
}

fn manual(gpa: &str, credits: &str) -> SemesterRecord {
    let mut record = SemesterRecord::empty_detailed();
    record.mode = EntryMode::Manual;
    record.manual_gpa = InputValue::from(gpa);
    record.manual_total_credits = InputValue::from(credits);
    record
}

fn store_of(records: Vec<(SemesterKey, SemesterRecord)>) -> SemesterStore {
    let mut store = SemesterStore::from_fn(|_| SemesterRecord::empty_detailed());
    for (key, record) in records {
        store.replace(key, record);
    }
    store
}

#[test]
fn detailed_semester_weights_by_credits() {
    let record = SemesterRecord::detailed(vec![graded(4, 2), graded(3, 4), graded(2, "")]);
    assert_eq!(semester_gpa(&record), "2.86");
}

#[test]
fn detailed_semester_accepts_text_inputs() {
    let record = SemesterRecord::detailed(vec![graded("4", "2"), graded("3", "4")]);
    assert_eq!(semester_gpa(&record), "2.86");
    assert_eq!(semester_total_credits(&record), 7.0);
}

#[test]
fn manual_semester_reports_entered_values() {
    let record = manual("3.5", "18");
    assert_eq!(semester_gpa(&record), "3.50");
    assert_eq!(semester_total_credits(&record), 18.0);
}

#[test]
fn manual_semester_with_garbage_is_zero() {
    let record = manual("abc", "");
    assert_eq!(semester_gpa(&record), "0.00");
    assert_eq!(semester_total_credits(&record), 0.0);
}

#[test]
fn overall_mixes_manual_and_detailed_semesters() {
    let store = store_of(vec![
        (SemesterKey::Y1S1, manual("2.00", "10")),
        (
            SemesterKey::Y1S2,
            SemesterRecord::detailed(vec![graded(4, 1), graded(3, ""), graded(0, 5)]),
        ),
    ]);
    assert_eq!(overall_gpa(&store), "1.71");
    assert_eq!(overall_total_credits(&store), 14.0);
}

#[test]
fn overall_skips_manual_semesters_without_credits() {
    let store = store_of(vec![
        (SemesterKey::Y1S1, manual("1.00", "")),
        (SemesterKey::Y2S1, manual("5.00", "0")),
        (SemesterKey::Y3S1, manual("3.00", "9")),
    ]);
    assert_eq!(overall_gpa(&store), "3.00");
}

#[test]
fn overall_ignores_subjects_of_manual_semesters() {
    let mut record = manual("2", "10");
    record.subjects = vec![graded(4, 9)];
    let store = store_of(vec![(SemesterKey::Y2S2, record)]);
    assert_eq!(overall_gpa(&store), "2.00");
}

#[test]
fn fresh_store_has_no_average_yet() {
    let store = default_store();
    assert_eq!(overall_gpa(&store), "0.00");
    for (_, record) in store.iter() {
        assert_eq!(semester_gpa(record), "0.00");
    }
    assert_eq!(semester_total_credits(store.get(SemesterKey::Y1S1)), 24.0);
}

#[test]
fn semester_gpa_is_pure() {
    let record = SemesterRecord::detailed(vec![graded(3, 2), graded(2, 7)]);
    let snapshot = record.clone();
    assert_eq!(semester_gpa(&record), semester_gpa(&record));
    assert_eq!(record, snapshot);
}
