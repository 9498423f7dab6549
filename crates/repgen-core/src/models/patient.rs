use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Gender values (lower-cased, trimmed) that select the female salutation.
const FEMALE_MARKERS: &[&str] = &["weiblich", "female", "f", "w", "frau"];

/// One row of the `patients` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub patient_id: String,
    pub sample_id: String,
    pub analysis_id: String,
    pub first_name: String,
    pub last_name: String,
    pub dob: String,
    pub gender: String,
    pub address: String,
    pub diagnosis: String,
    pub sample_date: String,
}

impl PatientRecord {
    pub fn is_female(&self) -> bool {
        let gender = self.gender.trim().to_lowercase();
        FEMALE_MARKERS.contains(&gender.as_str())
    }

    /// Combined `<patient_id>-<sample_id>` label used on the annex.
    pub fn patient_sample(&self) -> String {
        format!("{}-{}", self.patient_id, self.sample_id)
    }
}

/// Column a patient lookup matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchField {
    PatientId,
    SampleId,
    /// Matches either the first or the last name.
    Name,
}

impl SearchField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchField::PatientId => "patient-id",
            SearchField::SampleId => "sample-id",
            SearchField::Name => "name",
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchField {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['_', ' '], "-").as_str() {
            "patient-id" | "patient" | "id" => Ok(SearchField::PatientId),
            "sample-id" | "sample" => Ok(SearchField::SampleId),
            "name" => Ok(SearchField::Name),
            _ => Err(CoreError::InvalidSearchField(s.to_string())),
        }
    }
}

/// A validated lookup request: the value is trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientQuery {
    pub field: SearchField,
    pub value: String,
}

impl PatientQuery {
    pub fn new(field: SearchField, value: &str) -> Result<Self, CoreError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(CoreError::EmptySearchValue);
        }
        Ok(Self {
            field,
            value: value.to_string(),
        })
    }

    pub fn by_patient_id(value: &str) -> Result<Self, CoreError> {
        Self::new(SearchField::PatientId, value)
    }
}
