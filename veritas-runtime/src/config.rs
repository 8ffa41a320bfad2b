//! Engine settings
//!
//! Loaded once at startup from TOML. Every field has a default, so an empty
//! file (or no file at all) yields a working engine.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use veritas_core::{AggregatorOptions, ProfileError, ProfileRegistry};

/// Errors from loading settings
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to load weight profiles: {0}")]
    Profiles(#[from] ProfileError),
}

/// Engine-wide settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Default aggregator options for entity scoring
    pub aggregator: AggregatorOptions,

    /// Weight profiles file; the embedded profiles are used when unset
    pub profiles_path: Option<PathBuf>,

    /// Surface the full breakdown to external consumers
    pub include_diagnostics: bool,

    /// Attach diagnostics to the latest score record after each entity score
    pub persist_diagnostics: bool,
}

impl EngineSettings {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load the configured weight profiles
    pub fn load_profiles(&self) -> Result<ProfileRegistry, ConfigError> {
        let registry = match &self.profiles_path {
            Some(path) => ProfileRegistry::load_from_file(path)?,
            None => ProfileRegistry::load_embedded()?,
        };
        Ok(registry)
    }
}
