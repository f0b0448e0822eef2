//! Persisted folder settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Settings file name, resolved against the working directory.
pub const SETTINGS_FILE: &str = "renamer_settings.toml";

/// Errors reading or writing the settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Cannot serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// The two remembered folders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

impl Settings {
    /// Get the settings file path.
    pub fn config_path() -> PathBuf {
        PathBuf::from(SETTINGS_FILE)
    }

    /// Load settings from the default location, or return defaults.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from `path`, or return defaults.
    ///
    /// A missing, unreadable, or malformed file yields defaults. Folders that
    /// no longer exist are dropped.
    pub fn load_from(path: &Path) -> Self {
        match Self::read(path) {
            Ok(settings) => settings.existing_only(),
            Err(e) => {
                tracing::debug!(error = %e, "using default settings");
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    fn existing_only(self) -> Self {
        Self {
            input_dir: self.input_dir.filter(|p| p.exists()),
            output_dir: self.output_dir.filter(|p| p.exists()),
        }
    }

    /// Save settings to the default location.
    pub fn save(&self) -> Result<(), SettingsError> {
        self.save_to(&Self::config_path())
    }

    /// Save settings to `path`.
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
