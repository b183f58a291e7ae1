//! Drag surface configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DragSurfaceConfig {
    /// Snap translations to whole units after scaling, so dragged blocks
    /// don't render blurry. Turn off only where sub-pixel positioning renders
    /// crisply.
    pub round_to_whole_units: bool,
    /// Class given to the surface root element
    pub surface_class: String,
    /// Class of the host container whose overflow is toggled during a drag
    pub container_class: String,
    /// Log level name for binaries (`error`, `warn`, `info`, `debug`, `trace`)
    pub log_level: String,
}

impl Default for DragSurfaceConfig {
    fn default() -> Self {
        Self {
            round_to_whole_units: true,
            surface_class: "blocklyBlockDragSurface".to_string(),
            container_class: "injectionDiv".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl DragSurfaceConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a config from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}
