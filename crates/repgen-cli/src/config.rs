use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use repgen_export::pipeline::ExportSettings;
use repgen_export::styles::DocumentStyles;
use repgen_report::{DistributionSettings, ReportSettings};

/// Current config version. Bump this when adding fields or changing shape.
/// Each bump requires a corresponding entry in [`migrate`].
const CURRENT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepgenConfig {
    /// Schema version. Missing or 0 = pre-versioned config.
    #[serde(default)]
    pub config_version: u32,
    /// SQLite database holding the patient records.
    pub database: PathBuf,
    /// Directory with `template_MOS.docx`, `template_annex.docx` and their
    /// `_EN` variants.
    pub templates_dir: PathBuf,
    /// Where documents are written. Defaults to the working directory of
    /// each run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,
    /// Searched before the system font directories.
    #[serde(default)]
    pub font_dirs: Vec<PathBuf>,
    #[serde(default)]
    pub report: ReportSettings,
    #[serde(default)]
    pub export: ExportSettings,
    #[serde(default)]
    pub styles: DocumentStyles,
}

impl Default for RepgenConfig {
    fn default() -> Self {
        let data = dirs::data_dir()
            .map(|d| d.join("repgen"))
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            config_version: CURRENT_VERSION,
            database: data.join("patients.db"),
            templates_dir: data.join("templates"),
            out_dir: None,
            font_dirs: Vec::new(),
            report: ReportSettings {
                distributions: DistributionSettings {
                    data_dir: Some(data.join("reference")),
                    ..DistributionSettings::default()
                },
                ..ReportSettings::default()
            },
            export: ExportSettings::default(),
            styles: DocumentStyles::default(),
        }
    }
}

fn config_dir() -> eyre::Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| eyre::eyre!("no config directory found"))?;
    Ok(base.join("repgen"))
}

pub fn default_config_path() -> eyre::Result<PathBuf> {
    Ok(config_dir()?.join("config.json"))
}

/// Load the config at `path`, or at the default location when `None`. A
/// missing file yields the defaults.
pub fn load_config(path: Option<&Path>) -> eyre::Result<RepgenConfig> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(RepgenConfig::default());
    }
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> eyre::Result<RepgenConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("failed to read config at {}: {e}", path.display()))?;

    // Parse as raw JSON so we can run migrations before deserializing.
    let json: serde_json::Value = serde_json::from_str(&contents)?;
    let on_disk_version = json
        .get("config_version")
        .and_then(|v| v.as_u64())
        .unwrap_or(0) as u32;

    let migrated = migrate(json, on_disk_version)?;
    let config: RepgenConfig = serde_json::from_value(migrated)?;
    Ok(config)
}

/// Run sequential migrations from `from_version` up to [`CURRENT_VERSION`].
///
/// Each migration is a pure transform on the raw JSON value.
pub fn migrate(mut json: serde_json::Value, from_version: u32) -> eyre::Result<serde_json::Value> {
    if from_version > CURRENT_VERSION {
        return Err(eyre::eyre!(
            "config_version {from_version} is newer than this build supports ({CURRENT_VERSION}). \
             Please update repgen."
        ));
    }

    // Version 1 is the first format. Files without a version are stamped
    // and read as-is.
    if from_version < 1 {
        json.as_object_mut()
            .ok_or_else(|| eyre::eyre!("config is not a JSON object"))?
            .insert(
                "config_version".to_string(),
                serde_json::Value::Number(CURRENT_VERSION.into()),
            );
    }

    // Future migrations go here:
    // if from_version < 2 { ... }

    Ok(json)
}

pub fn save_config(config: &RepgenConfig, path: &Path) -> eyre::Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;

    // Always write the current version, regardless of what was loaded.
    let mut stamped = config.clone();
    stamped.config_version = CURRENT_VERSION;

    let json = serde_json::to_string_pretty(&stamped)?;

    // Write to a temp file then rename for atomicity
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = dir.join(tmp_name);
    std::fs::write(&tmp_path, json.as_bytes())?;

    // Set restrictive permissions on Unix before renaming
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))?;
    }

    std::fs::rename(&tmp_path, path)?;

    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}
