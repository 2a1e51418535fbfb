//! Combined configuration file for the season driver.

use std::path::Path;

use house_core::EngineConfig;
use house_oracle::OracleConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// `house.toml`: an `[engine]` table and an `[oracle]` table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub oracle: OracleConfig,
}

impl SimConfig {
    pub fn from_file(path: &Path) -> Result<Self, SimConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, SimConfigError> {
        Ok(toml::from_str(content)?)
    }
}

#[derive(Debug, Error)]
pub enum SimConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_tables() {
        let config = SimConfig::from_toml_str(
            "[engine.ledger]\ndecay_rate = 0.2\n\n[oracle]\nfail_open = true\n",
        )
        .unwrap();
        assert_eq!(config.engine.ledger.decay_rate, 0.2);
        assert_eq!(config.engine.ledger.recent_window_weeks, 2);
        assert!(config.oracle.fail_open);
        assert_eq!(config.oracle.error_threshold, 3);
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(SimConfig::from_toml_str("").unwrap(), SimConfig::default());
    }
}
