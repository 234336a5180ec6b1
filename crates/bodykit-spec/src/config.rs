//! Character configuration: the exported/imported slider state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// A full character configuration: modifier full name to value.
///
/// Backed by an ordered map so serialization is deterministic, which makes
/// the canonical hash stable across exports of the same state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterConfig(pub BTreeMap<String, f64>);

impl CharacterConfig {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the configuration to JSON (keys in sorted order).
    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serializes the configuration to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Sets a modifier value.
    pub fn set(&mut self, full_name: impl Into<String>, value: f64) {
        self.0.insert(full_name.into(), value);
    }

    /// Gets a modifier value.
    pub fn get(&self, full_name: &str) -> Option<f64> {
        self.0.get(full_name).copied()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the configuration is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates entries in sorted key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Rounds every value to `decimals` decimal places.
    pub fn round(&mut self, decimals: u32) {
        let factor = 10f64.powi(decimals as i32);
        for value in self.0.values_mut() {
            *value = (*value * factor).round() / factor;
        }
    }

    /// Computes the canonical BLAKE3 hash of this configuration.
    ///
    /// The hash is `hex(BLAKE3(json))` over the compact JSON serialization.
    /// The backing map is ordered, so the serialization (and therefore the
    /// hash) is canonical for a given set of values.
    pub fn canonical_hash(&self) -> Result<String, ModelError> {
        let json = self.to_json()?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}

impl FromIterator<(String, f64)> for CharacterConfig {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
