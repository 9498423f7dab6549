use std::path::Path;

use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::{debug, info};

use repgen_core::models::patient::{PatientQuery, PatientRecord, SearchField};

use crate::db;
use crate::error::StoreError;

const SELECT_PATIENT: &str = "SELECT patient_id, sample_id, analysis_id, first_name, last_name, \
     dob, gender, address, diagnosis, sample_date FROM patients";

/// Handle on the patients database.
pub struct PatientStore {
    conn: Connection,
}

impl PatientStore {
    /// Open an existing database read-only.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = db::open_read_only(path)?;
        debug!(path = %path.display(), "patient database opened");
        Ok(Self { conn })
    }

    /// Open or create a writable database with the current schema.
    pub fn create(path: &Path) -> Result<Self, StoreError> {
        let conn = db::open_database(path)?;
        info!(path = %path.display(), "patient database ready");
        Ok(Self { conn })
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Ok(Self {
            conn: db::open_memory_database()?,
        })
    }

    /// Resolve a query to the first matching record.
    pub fn find(&self, query: &PatientQuery) -> Result<PatientRecord, StoreError> {
        let record = match query.field {
            SearchField::PatientId => self
                .conn
                .query_row(
                    &format!("{SELECT_PATIENT} WHERE patient_id = ?1 ORDER BY rowid LIMIT 1"),
                    params![query.value],
                    row_to_record,
                )
                .optional()?,
            SearchField::SampleId => self
                .conn
                .query_row(
                    &format!("{SELECT_PATIENT} WHERE sample_id = ?1 ORDER BY rowid LIMIT 1"),
                    params![query.value],
                    row_to_record,
                )
                .optional()?,
            SearchField::Name => self
                .conn
                .query_row(
                    &format!(
                        "{SELECT_PATIENT} WHERE last_name = ?1 OR first_name = ?1 ORDER BY rowid LIMIT 1"
                    ),
                    params![query.value],
                    row_to_record,
                )
                .optional()?,
        };

        match record {
            Some(record) => {
                debug!(
                    field = %query.field,
                    patient_id = %record.patient_id,
                    "patient found"
                );
                Ok(record)
            }
            None => Err(StoreError::PatientNotFound {
                field: query.field,
                value: query.value.clone(),
            }),
        }
    }

    pub fn insert(&self, record: &PatientRecord) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO patients (patient_id, sample_id, analysis_id, first_name, last_name, \
             dob, gender, address, diagnosis, sample_date) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                record.patient_id,
                record.sample_id,
                record.analysis_id,
                record.first_name,
                record.last_name,
                record.dob,
                record.gender,
                record.address,
                record.diagnosis,
                record.sample_date,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn count(&self) -> Result<i64, StoreError> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Insert the demonstration patients. Returns how many were added.
    pub fn seed_samples(&self) -> Result<usize, StoreError> {
        let samples = sample_patients();
        for record in &samples {
            self.insert(record)?;
        }
        info!(count = samples.len(), "sample patients inserted");
        Ok(samples.len())
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<PatientRecord> {
    Ok(PatientRecord {
        patient_id: text(row, 0)?,
        sample_id: text(row, 1)?,
        analysis_id: text(row, 2)?,
        first_name: text(row, 3)?,
        last_name: text(row, 4)?,
        dob: text(row, 5)?,
        gender: text(row, 6)?,
        address: text(row, 7)?,
        diagnosis: text(row, 8)?,
        sample_date: text(row, 9)?,
    })
}

/// Columns are nullable and sometimes stored as numbers in hand-made
/// databases; read everything as text.
fn text(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    use rusqlite::types::ValueRef;

    Ok(match row.get_ref(idx)? {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) | ValueRef::Blob(t) => String::from_utf8_lossy(t).into_owned(),
    })
}

pub fn sample_patients() -> Vec<PatientRecord> {
    fn patient(fields: [&str; 10]) -> PatientRecord {
        let [patient_id, sample_id, analysis_id, first_name, last_name, dob, gender, address, diagnosis, sample_date] =
            fields.map(str::to_string);
        PatientRecord {
            patient_id,
            sample_id,
            analysis_id,
            first_name,
            last_name,
            dob,
            gender,
            address,
            diagnosis,
            sample_date,
        }
    }

    vec![
        patient([
            "1234",
            "567890",
            "338252/53/54/56",
            "Alice",
            "Smith",
            "1985-04-12",
            "weiblich",
            "Berlin, Germany",
            "Chronic Kidney Disease",
            "2025-09-08",
        ]),
        patient([
            "1235",
            "567891",
            "338252/53/54/57",
            "Bob",
            "Johnson",
            "1970-09-23",
            "männlich",
            "Munich, Germany",
            "Hypertension",
            "2025-09-08",
        ]),
        patient([
            "1236",
            "567892",
            "338252/53/54/58",
            "Charlie",
            "Brown",
            "1992-01-15",
            "männlich",
            "Hamburg, Germany",
            "Diabetes Type II",
            "2025-09-08",
        ]),
    ]
}
