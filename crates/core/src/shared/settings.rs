use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::constants::{
    INITIAL_DELAY_MS, PERIOD_MS, SETTINGS_DIR_NAME, SETTINGS_FILE_NAME, SIMULATED_LATENCY_MS,
};

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("failed to access settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed settings: {0}")]
    Format(#[from] serde_json::Error),
}

/// User-tunable timing and simulation parameters, persisted as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub initial_delay_ms: u64,
    pub period_ms: u64,
    #[serde(default = "default_latency")]
    pub simulated_latency_ms: u64,
    #[serde(default)]
    pub failure_rate: f64,
}

fn default_latency() -> u64 {
    SIMULATED_LATENCY_MS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            initial_delay_ms: INITIAL_DELAY_MS,
            period_ms: PERIOD_MS,
            simulated_latency_ms: SIMULATED_LATENCY_MS,
            failure_rate: 0.0,
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(SETTINGS_DIR_NAME).join(SETTINGS_FILE_NAME))
    }

    /// Loads from the platform config directory, falling back to defaults
    /// when the file is missing or unreadable.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path).unwrap_or_else(|e| {
                if path.exists() {
                    log::warn!("Ignoring settings at {}: {e}", path.display());
                }
                Self::default()
            }),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path).map_err(|e| SettingsError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save(&self) -> Result<PathBuf, SettingsError> {
        let path = Self::config_path().ok_or(SettingsError::NoConfigDir)?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        let io_err = |e| SettingsError::Io {
            path: path.to_path_buf(),
            source: e,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(io_err)
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_demo_timings() {
        let s = Settings::default();
        assert_eq!(s.initial_delay(), Duration::from_millis(1500));
        assert_eq!(s.period(), Duration::from_millis(3000));
        assert_eq!(s.simulated_latency(), Duration::from_millis(2000));
        assert_eq!(s.failure_rate, 0.0);
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            initial_delay_ms: 10,
            period_ms: 20,
            simulated_latency_ms: 5,
            failure_rate: 0.25,
        };

        settings.save_to(&path).unwrap();
        let loaded = Settings::load_from(&path).unwrap();

        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_optional_fields_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"initial_delay_ms": 100, "period_ms": 200}"#).unwrap();

        let loaded = Settings::load_from(&path).unwrap();

        assert_eq!(loaded.initial_delay_ms, 100);
        assert_eq!(loaded.period_ms, 200);
        assert_eq!(loaded.simulated_latency_ms, SIMULATED_LATENCY_MS);
        assert_eq!(loaded.failure_rate, 0.0);
    }

    #[test]
    fn test_corrupt_file_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();

        let err = Settings::load_from(&path).unwrap_err();

        assert!(matches!(err, SettingsError::Format(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load_from(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
    }
}
