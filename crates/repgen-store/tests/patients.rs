use repgen_core::models::patient::{PatientQuery, SearchField};
use repgen_store::{PatientStore, StoreError};

fn seeded() -> PatientStore {
    let store = PatientStore::in_memory().unwrap();
    store.seed_samples().unwrap();
    store
}

#[test]
fn find_by_patient_id() {
    let store = seeded();
    let record = store
        .find(&PatientQuery::by_patient_id("1235").unwrap())
        .unwrap();
    assert_eq!(record.first_name, "Bob");
    assert_eq!(record.last_name, "Johnson");
    assert_eq!(record.sample_id, "567891");
}

#[test]
fn find_by_sample_id() {
    let store = seeded();
    let record = store
        .find(&PatientQuery::new(SearchField::SampleId, "567892").unwrap())
        .unwrap();
    assert_eq!(record.patient_id, "1236");
}

#[test]
fn name_search_matches_first_or_last_name() {
    let store = seeded();

    let by_last = store
        .find(&PatientQuery::new(SearchField::Name, "Smith").unwrap())
        .unwrap();
    assert_eq!(by_last.patient_id, "1234");

    let by_first = store
        .find(&PatientQuery::new(SearchField::Name, "Charlie").unwrap())
        .unwrap();
    assert_eq!(by_first.patient_id, "1236");
}

#[test]
fn unknown_patient_is_not_found() {
    let store = seeded();
    let err = store
        .find(&PatientQuery::by_patient_id("9999").unwrap())
        .unwrap_err();
    match err {
        StoreError::PatientNotFound { field, value } => {
            assert_eq!(field, SearchField::PatientId);
            assert_eq!(value, "9999");
        }
        other => panic!("expected PatientNotFound, got {other:?}"),
    }
}

#[test]
fn open_missing_database_fails_without_creating_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("patients.db");

    let err = PatientStore::open(&path).err().unwrap();
    assert!(matches!(err, StoreError::DatabaseNotFound { .. }));
    assert!(!path.exists());
}

#[test]
fn created_database_reopens_read_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("patients.db");

    {
        let store = PatientStore::create(&path).unwrap();
        assert_eq!(store.seed_samples().unwrap(), 3);
    }

    let store = PatientStore::open(&path).unwrap();
    assert_eq!(store.count().unwrap(), 3);
    let record = store
        .find(&PatientQuery::by_patient_id("1234").unwrap())
        .unwrap();
    assert_eq!(record.gender, "weiblich");
    assert!(record.is_female());
}

#[test]
fn migrations_are_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("patients.db");

    PatientStore::create(&path).unwrap().seed_samples().unwrap();
    let store = PatientStore::create(&path).unwrap();
    assert_eq!(store.count().unwrap(), 3);
}

#[test]
fn finds_patients_in_a_table_without_id_column() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.db");

    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE patients (
                patient_id TEXT, sample_id TEXT, analysis_id TEXT,
                first_name TEXT, last_name TEXT, dob TEXT, gender TEXT,
                address TEXT, diagnosis TEXT, sample_date TEXT
            );
            INSERT INTO patients VALUES
                ('77', 'S-1', 'A-1', 'Dana', 'Weber', '1970-01-01', 'w', 'Bonn', 'none', '2025-01-01'),
                ('78', 'S-2', 'A-2', 'Dana', 'Kurz', '1971-02-02', 'm', 'Köln', 'none', '2025-01-02');",
        )
        .unwrap();
    }

    let store = PatientStore::open(&path).unwrap();
    let record = store
        .find(&PatientQuery::new(SearchField::Name, "Dana").unwrap())
        .unwrap();
    assert_eq!(record.patient_id, "77");

    let record = store
        .find(&PatientQuery::new(SearchField::SampleId, "S-2").unwrap())
        .unwrap();
    assert_eq!(record.last_name, "Kurz");
}
