//! Configuration System
//!
//! Engine tuning loaded from TOML. Every section falls back to its defaults,
//! so a partial file only overrides what it names.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Base weights before trait modifiers
    #[serde(default)]
    pub weights: BaseWeights,
    /// Interaction ledger decay settings
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Social planner thresholds and pacing
    #[serde(default)]
    pub planner: PlannerConfig,
}

impl EngineConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Renders the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Base decision weights. Normalized after trait modifiers are applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseWeights {
    pub threat: f64,
    pub loyalty: f64,
    pub relationship: f64,
    pub pledge: f64,
    pub strategic: f64,
}

impl Default for BaseWeights {
    fn default() -> Self {
        Self {
            threat: 0.25,
            loyalty: 0.20,
            relationship: 0.30,
            pledge: 0.10,
            strategic: 0.15,
        }
    }
}

/// Ledger decay settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Fraction of remaining impact lost per week past the decay point
    pub decay_rate: f64,
    /// Weeks after creation before a decaying interaction starts to fade
    pub decay_delay_weeks: u32,
    /// Interactions younger than this many weeks count as recent
    pub recent_window_weeks: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            decay_rate: 0.1,
            decay_delay_weeks: 2,
            recent_window_weeks: 2,
        }
    }
}

/// Social planner settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Minimum relationship before an agent proposes an alliance
    pub min_alliance_relationship: f64,
    /// Agents in this many alliances stop proposing new ones
    pub max_alliances: usize,
    /// Relationship above which an alliance-loyalty pledge is offered
    pub pledge_relationship_threshold: f64,
    /// Executions per agent per social phase
    pub max_actions_per_agent: usize,
    /// Pause between executions for observers; 0 disables
    pub action_delay_ms: u64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            min_alliance_relationship: 30.0,
            max_alliances: 3,
            pledge_relationship_threshold: 40.0,
            max_actions_per_agent: 2,
            action_delay_ms: 0,
        }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_section_overrides_only_named_fields() {
        let config = EngineConfig::from_toml_str(
            r#"
            [planner]
            max_alliances = 5

            [ledger]
            decay_rate = 0.25
            "#,
        )
        .unwrap();

        assert_eq!(config.planner.max_alliances, 5);
        assert_eq!(config.planner.min_alliance_relationship, 30.0);
        assert_eq!(config.ledger.decay_rate, 0.25);
        assert_eq!(config.ledger.decay_delay_weeks, 2);
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = EngineConfig::default();
        let rendered = config.to_toml().unwrap();
        let parsed = EngineConfig::from_toml_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let err = EngineConfig::from_toml_str("[planner\nmax_alliances = ").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }
}
