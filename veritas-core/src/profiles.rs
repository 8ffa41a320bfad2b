//! Weight profiles per entity vertical
//!
//! Profiles are static configuration loaded once from TOML, either the
//! embedded defaults or a file supplied at startup. A registry holds one
//! default profile and optional per-vertical overrides; lookups never fail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::Signal;

const EMBEDDED_PROFILES: &str = include_str!("../profiles/weights.toml");

/// Name of the fallback profile
pub const DEFAULT_PROFILE: &str = "default";

/// Errors from loading weight profiles
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Failed to read profiles: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse profiles: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid weight {weight} for '{key}' in profile '{profile}'")]
    InvalidWeight {
        profile: String,
        key: String,
        weight: f64,
    },

    #[error("Profile '{0}' has no signals")]
    Empty(String),

    #[error("Profiles file has no [default] table")]
    MissingDefault,

    #[error("Vertical '{0}' is defined more than once (names are case-insensitive)")]
    DuplicateVertical(String),
}

/// On-disk layout of a profiles file
#[derive(Debug, Deserialize)]
struct ProfileFile {
    #[serde(default)]
    default: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    verticals: BTreeMap<String, BTreeMap<String, f64>>,
}

/// A caller's observation for one signal key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Observation {
    pub fn value(value: f64) -> Self {
        Self {
            value: Some(value),
            timestamp: None,
        }
    }

    pub fn observed_at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// Named, immutable map of signal key to weight
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightProfile {
    pub name: String,
    pub weights: BTreeMap<String, f64>,
}

impl WeightProfile {
    fn validated(name: &str, weights: BTreeMap<String, f64>) -> Result<Self, ProfileError> {
        if weights.is_empty() {
            return Err(ProfileError::Empty(name.to_string()));
        }
        if let Some((key, weight)) = weights.iter().find(|(_, w)| !w.is_finite() || **w < 0.0) {
            return Err(ProfileError::InvalidWeight {
                profile: name.to_string(),
                key: key.clone(),
                weight: *weight,
            });
        }

        Ok(Self {
            name: name.to_string(),
            weights,
        })
    }

    pub fn weight(&self, key: &str) -> Option<f64> {
        self.weights.get(key).copied()
    }

    /// Build one signal per profile key, in key order
    ///
    /// Keys without an observation become missing signals; observations for
    /// keys the profile does not know are ignored.
    pub fn signals_from(&self, observations: &HashMap<String, Observation>) -> Vec<Signal> {
        for key in observations.keys().filter(|k| !self.weights.contains_key(*k)) {
            debug!("Profile '{}' ignores unknown signal '{}'", self.name, key);
        }

        self.weights
            .iter()
            .map(|(key, weight)| {
                let observation = observations.get(key);
                Signal::builder(key.as_str())
                    .weight(*weight)
                    .maybe_value(observation.and_then(|o| o.value))
                    .maybe_observed_at(observation.and_then(|o| o.timestamp))
                    .build()
            })
            .collect()
    }
}

/// Default profile plus per-vertical overrides
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    default: WeightProfile,
    verticals: HashMap<String, WeightProfile>,
}

impl ProfileRegistry {
    /// Parse a registry from TOML
    pub fn from_toml_str(content: &str) -> Result<Self, ProfileError> {
        let file: ProfileFile = toml::from_str(content)?;
        let weights = file.default.ok_or(ProfileError::MissingDefault)?;
        let default = WeightProfile::validated(DEFAULT_PROFILE, weights)?;

        let mut verticals = HashMap::new();
        for (name, weights) in file.verticals {
            let name = name.to_lowercase();
            if verticals.contains_key(&name) {
                return Err(ProfileError::DuplicateVertical(name));
            }
            let profile = WeightProfile::validated(&name, weights)?;
            verticals.insert(name, profile);
        }

        Ok(Self { default, verticals })
    }

    /// Load the profiles compiled into the crate
    pub fn load_embedded() -> Result<Self, ProfileError> {
        Self::from_toml_str(EMBEDDED_PROFILES)
    }

    /// Load profiles from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ProfileError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn default_profile(&self) -> &WeightProfile {
        &self.default
    }

    /// Profile for a vertical (case-insensitive), falling back to the default
    pub fn for_vertical(&self, vertical: Option<&str>) -> &WeightProfile {
        vertical
            .and_then(|v| self.verticals.get(&v.to_lowercase()))
            .unwrap_or(&self.default)
    }

    /// Vertical names with an override, sorted
    pub fn verticals(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.verticals.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}
