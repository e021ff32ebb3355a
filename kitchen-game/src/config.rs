//! Cooking session tuning loaded from `cooking.json`.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{DEFAULT_METER_MAX, DEFAULT_ROLL_DELAY_SECS};
use crate::fire_boost::FireBoostConfig;
use crate::jackpot::JackpotConfig;
use crate::reward::RewardConfig;

const DEFAULT_COOKING_DATA: &str = include_str!("../assets/data/cooking.json");

/// Errors raised when tuning values fall outside supported bounds.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be >= {min}, got {value}")]
    MinViolation {
        field: &'static str,
        min: f32,
        value: f32,
    },
    #[error("{field} must be between {min} and {max}, got {value}")]
    RangeViolation {
        field: &'static str,
        min: f32,
        max: f32,
        value: f32,
    },
    #[error("fire boost needs at least one duration option")]
    EmptyDurations,
    #[error("jackpot window must start at 1 or later")]
    ZeroJackpotWindow,
    #[error("jackpot window {min}..={max} is inverted")]
    JackpotWindow { min: u32, max: u32 },
    #[error("cooking config JSON invalid: {0}")]
    Parse(String),
}

/// Top-level tuning for a cooking session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CookingConfig {
    #[serde(default = "CookingConfig::default_meter_max")]
    pub meter_max: f32,
    #[serde(default = "CookingConfig::default_roll_delay")]
    pub roll_delay_secs: f32,
    #[serde(default)]
    pub jackpot: JackpotConfig,
    #[serde(default)]
    pub fire_boost: FireBoostConfig,
    #[serde(default)]
    pub reward: RewardConfig,
}

impl CookingConfig {
    const fn default_meter_max() -> f32 {
        DEFAULT_METER_MAX
    }

    const fn default_roll_delay() -> f32 {
        DEFAULT_ROLL_DELAY_SECS
    }

    /// Parse a config document. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` when the document is not valid JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when any field violates the documented bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.meter_max.is_finite() || self.meter_max <= 0.0 {
            return Err(ConfigError::MinViolation {
                field: "meter_max",
                min: 1.0,
                value: self.meter_max,
            });
        }
        if !(0.0..=60.0).contains(&self.roll_delay_secs) {
            return Err(ConfigError::RangeViolation {
                field: "roll_delay_secs",
                min: 0.0,
                max: 60.0,
                value: self.roll_delay_secs,
            });
        }
        self.jackpot.validate()?;
        self.fire_boost.validate()?;
        self.reward.validate()?;
        Ok(())
    }
}

impl Default for CookingConfig {
    fn default() -> Self {
        serde_json::from_str(DEFAULT_COOKING_DATA).unwrap_or_else(|_| Self {
            meter_max: Self::default_meter_max(),
            roll_delay_secs: Self::default_roll_delay(),
            jackpot: JackpotConfig::default(),
            fire_boost: FireBoostConfig::default(),
            reward: RewardConfig::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_config_matches_constants() {
        let cfg = CookingConfig::default();
        assert!((cfg.meter_max - 100.0).abs() < f32::EPSILON);
        assert!((cfg.roll_delay_secs - 1.0).abs() < f32::EPSILON);
        assert_eq!(cfg.jackpot.min_rolls, 5);
        assert_eq!(cfg.jackpot.max_rolls, 10);
        assert_eq!(cfg.fire_boost.durations, vec![2.0, 3.0, 5.0]);
        assert!((cfg.reward.good_multiplier - 0.6).abs() < f32::EPSILON);
        cfg.validate().expect("bundled config is valid");
    }

    #[test]
    fn partial_documents_fall_back_to_defaults() {
        let cfg = CookingConfig::from_json(r#"{ "roll_delay_secs": 0.0, "jackpot": { "min_rolls": 2 } }"#)
            .unwrap();
        assert!(cfg.roll_delay_secs.abs() < f32::EPSILON);
        assert_eq!(cfg.jackpot.min_rolls, 2);
        assert_eq!(cfg.jackpot.max_rolls, 10);
        assert!((cfg.fire_boost.rate_per_second - 3.0).abs() < f32::EPSILON);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn invalid_fields_are_reported() {
        let mut cfg = CookingConfig::default();
        cfg.meter_max = 0.0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::MinViolation { field: "meter_max", .. })
        ));

        let mut cfg = CookingConfig::default();
        cfg.roll_delay_secs = -1.0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::RangeViolation { field: "roll_delay_secs", .. })
        ));

        assert!(matches!(
            CookingConfig::from_json("{ nope"),
            Err(ConfigError::Parse(_))
        ));
    }
}
