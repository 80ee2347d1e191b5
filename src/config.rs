//! Simulation settings.

use serde::{Serialize, Deserialize};
use std::path::Path;
use thiserror::Error;

/// Default upper bound on instruction cycles per run.
///
/// Expression programs need one cycle per operator plus one for SAVE; the
/// bound only matters once operand words start being fetched as code.
pub const DEFAULT_MAX_CYCLES: u64 = 64;

/// Settings for one simulation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Stop with `CYCLE LIMIT` after this many fetch/decode/execute cycles.
    pub max_cycles: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self { max_cycles: DEFAULT_MAX_CYCLES }
    }
}

impl SimConfig {
    /// Read settings from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_json(&text)
    }

    /// Parse settings from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        if config.max_cycles == 0 {
            return Err(ConfigError::Invalid("max_cycles must be at least 1".into()));
        }
        Ok(config)
    }
}

/// Errors that can occur while loading settings.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("parse error: {0}")]
    ParseError(String),

    #[error("invalid setting: {0}")]
    Invalid(String),
}
