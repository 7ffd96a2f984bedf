//! Editor configuration
//!
//! Every field has a default so a partial (or missing) config file still
//! yields a usable configuration.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::Result;
use crate::nodes::EdgeType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Number of undo steps kept
    pub history_limit: usize,
    /// Distance in scene units a drag must travel before a release ends it
    pub edge_drag_threshold: f32,
    /// Edge type used by drag-to-connect
    pub default_edge_type: EdgeType,
    /// `env_logger` filter used when `RUST_LOG` is not set
    pub log_filter: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: constants::history::DEFAULT_LIMIT,
            edge_drag_threshold: constants::interaction::EDGE_DRAG_START_THRESHOLD,
            default_edge_type: EdgeType::default(),
            log_filter: constants::config::DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl EditorConfig {
    /// Location of the user config file, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| {
            dir.join(constants::config::APP_DIR)
                .join(constants::config::FILE_NAME)
        })
    }

    /// Reads a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        debug!("Loaded editor config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Reads the user config file, falling back to defaults when it is
    /// missing or unreadable
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }

        match Self::load(&path) {
            Ok(config) => config,
            Err(err) => {
                warn!("Ignoring config file {}: {}", path.display(), err);
                Self::default()
            }
        }
    }

    /// Writes the config as pretty JSON, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
