//! Settings management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not read settings file '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Bridge settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub interpreter: InterpreterSettings,
    /// Directories searched when a script is named without a full path.
    pub search_paths: Vec<PathBuf>,
    /// Attributes given to owners created without explicit ones.
    pub owner: OwnerSettings,
}

/// Limits applied to the shared interpreter when it starts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterSettings {
    pub memory_limit: Option<usize>,
    pub max_stack_size: Option<usize>,
    pub gc_threshold: Option<usize>,
}

/// Persisted owner attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OwnerSettings {
    /// Display name used in logs; the identity is always generated.
    pub name: Option<String>,
    pub debug: bool,
    /// Script file remembered by `read`/`load`.
    pub file: Option<PathBuf>,
}

impl Default for OwnerSettings {
    fn default() -> Self {
        Self {
            name: None,
            debug: true,
            file: None,
        }
    }
}

impl Settings {
    pub fn from_json(text: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&text)?;
        tracing::debug!(path = %path.display(), "settings loaded");
        Ok(settings)
    }
}
