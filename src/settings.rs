use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::shared::errors::StorageResult;
use crate::shared::paths::{ensure_dir, get_data_dir};

/// Which storage backend the application runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Sqlite,
    Json,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    #[serde(default)]
    pub backend: BackendKind,
    /// Overrides the XDG data directory when set.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl AppSettings {
    /// The directory all storage lives under.
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(get_data_dir)
    }
}

fn get_settings_path() -> PathBuf {
    get_data_dir().join("settings.json")
}

/// Load settings from disk, returning defaults if the file doesn't exist or
/// is invalid.
pub fn load_settings() -> AppSettings {
    let path = get_settings_path();

    if !path.exists() {
        tracing::info!(target: "system", "Settings file not found, using defaults");
        return AppSettings::default();
    }

    match load_settings_from_file(&path) {
        Ok(settings) => {
            tracing::info!(target: "system", "Settings loaded from {:?}", path);
            settings
        }
        Err(e) => {
            tracing::warn!(target: "system", "Failed to load settings: {}, using defaults", e);
            AppSettings::default()
        }
    }
}

/// Internal function to load settings from a specific path
fn load_settings_from_file(path: &Path) -> StorageResult<AppSettings> {
    let contents = std::fs::read_to_string(path)?;
    let settings = serde_json::from_str(&contents)?;
    Ok(settings)
}

/// Save settings to disk
pub fn save_settings(settings: &AppSettings) -> StorageResult<()> {
    let data_dir = get_data_dir();
    ensure_dir(&data_dir)?;

    let path = get_settings_path();
    let contents = serde_json::to_string_pretty(settings)?;
    std::fs::write(&path, contents)?;

    tracing::info!(target: "system", "Settings saved to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = AppSettings::default();
        assert_eq!(settings.backend, BackendKind::Sqlite);
        assert!(settings.data_dir.is_none());
        assert!(settings.resolved_data_dir().ends_with("lifedeck"));
    }

    #[test]
    fn test_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let settings = AppSettings {
            backend: BackendKind::Json,
            data_dir: Some(dir.path().join("data")),
        };
        std::fs::write(&path, serde_json::to_string_pretty(&settings).unwrap()).unwrap();

        let loaded = load_settings_from_file(&path).unwrap();
        assert_eq!(loaded.backend, BackendKind::Json);
        assert_eq!(loaded.data_dir, settings.data_dir);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(load_settings_from_file(&path).is_err());
    }
}
