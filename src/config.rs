//! User settings loaded from ~/.nasheets/config.yaml.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sheet::ast::DEFAULT_NOTE_LENGTH;
use crate::sheet::lexer::DEFAULT_CONTEXT_WIDTH;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// Settings shared by the parser and the command-line tool. Missing keys
/// take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    /// Note length for embedded notation when front matter has no `L`.
    pub default_length: String,
    /// Characters of source shown on each side of an error caret.
    pub error_context: usize,
    /// File extension picked up when a directory is given on the command line.
    pub extension: String,
}

impl SheetConfig {
    /// ~/.nasheets/config.yaml, if a home directory is known.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".nasheets").join("config.yaml"))
    }

    /// Load from the standard path. Returns None if the file doesn't exist
    /// or can't be read.
    pub fn load() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            return None;
        }
        match Self::load_from(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("ignoring config: {e}");
                None
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            default_length: DEFAULT_NOTE_LENGTH.to_string(),
            error_context: DEFAULT_CONTEXT_WIDTH,
            extension: "nns".to_string(),
        }
    }
}
