use serde::{Deserialize, Serialize};

/// Maps a spreadsheet column header to the score key used in templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub column: String,
    pub key: String,
}

impl ColumnMapping {
    pub fn new(column: &str, key: &str) -> Self {
        Self {
            column: column.to_string(),
            key: key.to_string(),
        }
    }
}

/// One score category spreadsheet and how to read it.
///
/// The sheet layout is a header row of model names and, somewhere below it,
/// a row whose marker column contains the marker text (`final score`). The
/// scores are the cells of that row under each mapped header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSource {
    /// File name relative to the working directory.
    pub file_name: String,
    /// Zero-based index of the header row.
    #[serde(default = "default_header_row")]
    pub header_row: usize,
    /// Zero-based column searched for the marker.
    #[serde(default = "default_marker_column")]
    pub marker_column: usize,
    /// Case-insensitive substring identifying the score row.
    #[serde(default = "default_marker")]
    pub marker: String,
    pub columns: Vec<ColumnMapping>,
}

fn default_header_row() -> usize {
    2
}

fn default_marker_column() -> usize {
    1
}

fn default_marker() -> String {
    "final score".to_string()
}

impl ScoreSource {
    /// The combined classification table delivered with every analysis.
    pub fn classification() -> Self {
        Self {
            file_name: "Mustertabelle_Klassifikation_alles.xlsx".to_string(),
            header_row: default_header_row(),
            marker_column: default_marker_column(),
            marker: default_marker(),
            columns: vec![
                ColumnMapping::new("CAD238ML1k.mdl", "CAD_score"),
                ColumnMapping::new("CKD273ML1hybrid", "CKD_score"),
                ColumnMapping::new("HF2_ML1new.mdl", "HF_score"),
                ColumnMapping::new("oncoRisk normo", "Onkorisk_score"),
                ColumnMapping::new("BioAge", "BioAge_value"),
                ColumnMapping::new("LifeSpeed", "LifeSpeed_value"),
            ],
        }
    }

    /// Score keys this source can produce.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.key.as_str())
    }
}

/// Sources used when no configuration overrides them.
pub fn default_sources() -> Vec<ScoreSource> {
    vec![ScoreSource::classification()]
}
