//! Column markers and the on-disk configuration file.
//!
//! Survey tools export the question text as the header, so columns are
//! found by marker substrings rather than fixed positions. Which markers a
//! survey uses is configuration, not logic.

use crate::error::ColumnField;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Current configuration file format version.
pub const CONFIG_VERSION: &str = "1.0";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("config marker for the {0} column is empty")]
    EmptyMarker(ColumnField),
}

/// Case-insensitive header substrings locating the three survey columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMarkers {
    pub name: String,
    pub birth: String,
    pub parents: String,
}

impl Default for ColumnMarkers {
    fn default() -> Self {
        Self {
            name: "who are you".to_string(),
            birth: "when were you born".to_string(),
            parents: "who are your parents".to_string(),
        }
    }
}

impl ColumnMarkers {
    /// Markers for the Danish family survey ("Hvem er I?" etc.).
    pub fn danish() -> Self {
        Self {
            name: "hvem er i".to_string(),
            birth: "hvornår er du født".to_string(),
            parents: "hvem er dine forældre".to_string(),
        }
    }

    pub fn get(&self, field: ColumnField) -> &str {
        match field {
            ColumnField::Name => &self.name,
            ColumnField::Birth => &self.birth,
            ColumnField::Parents => &self.parents,
        }
    }

    /// All markers paired with the field they locate.
    pub fn fields(&self) -> [(ColumnField, &str); 3] {
        [
            (ColumnField::Name, self.name.as_str()),
            (ColumnField::Birth, self.birth.as_str()),
            (ColumnField::Parents, self.parents.as_str()),
        ]
    }

    /// Rejects blank markers, which would match every header column.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, marker) in self.fields() {
            if marker.trim().is_empty() {
                return Err(ConfigError::EmptyMarker(field));
            }
        }
        Ok(())
    }
}

/// Contents of `.kinship/config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KinshipConfig {
    pub version: String,
    pub markers: ColumnMarkers,
}

impl Default for KinshipConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            markers: ColumnMarkers::default(),
        }
    }
}

impl KinshipConfig {
    pub fn with_markers(markers: ColumnMarkers) -> Self {
        Self {
            markers,
            ..Self::default()
        }
    }

    /// Loads and validates a config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        config.markers.validate()?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Writes the config as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(io_err)
    }
}
