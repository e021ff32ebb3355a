//! Timed fire boost: a continuous additive effect on every meter.
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::constants::{DEFAULT_BOOST_DURATIONS, DEFAULT_BOOST_RATE_PER_SECOND, LOG_TARGET_BOOST};
use crate::data::Deltas;

/// Fire boost tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireBoostConfig {
    #[serde(default = "FireBoostConfig::default_rate")]
    pub rate_per_second: f32,
    #[serde(default = "FireBoostConfig::default_durations")]
    pub durations: Vec<f32>,
}

impl FireBoostConfig {
    const fn default_rate() -> f32 {
        DEFAULT_BOOST_RATE_PER_SECOND
    }

    fn default_durations() -> Vec<f32> {
        DEFAULT_BOOST_DURATIONS.to_vec()
    }

    /// # Errors
    ///
    /// Returns `ConfigError` when the rate is negative or a duration is not positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.rate_per_second.is_finite() || self.rate_per_second < 0.0 {
            return Err(ConfigError::MinViolation {
                field: "fire_boost.rate_per_second",
                min: 0.0,
                value: self.rate_per_second,
            });
        }
        if self.durations.is_empty() {
            return Err(ConfigError::EmptyDurations);
        }
        if let Some(bad) = self
            .durations
            .iter()
            .copied()
            .find(|d| !d.is_finite() || *d <= 0.0)
        {
            return Err(ConfigError::MinViolation {
                field: "fire_boost.durations",
                min: 0.0,
                value: bad,
            });
        }
        Ok(())
    }
}

impl Default for FireBoostConfig {
    fn default() -> Self {
        Self {
            rate_per_second: Self::default_rate(),
            durations: Self::default_durations(),
        }
    }
}

/// Where the boost sits in its once-per-turn lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoostPhase {
    /// Used up or disabled for this turn.
    Idle,
    /// May be activated this turn.
    Armed,
    /// Waiting for the player to pick a duration.
    SelectingDuration,
    /// Emitting ticks.
    Active,
}

/// One emission of an active boost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoostTick {
    pub deltas: Deltas,
    pub remaining: f32,
    pub ended: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FireBoostModule {
    config: FireBoostConfig,
    phase: BoostPhase,
    remaining: f32,
    total_duration: f32,
}

impl FireBoostModule {
    #[must_use]
    pub fn new(config: FireBoostConfig) -> Self {
        Self {
            config,
            phase: BoostPhase::Idle,
            remaining: 0.0,
            total_duration: 0.0,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> BoostPhase {
        self.phase
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.phase == BoostPhase::Active
    }

    #[must_use]
    pub fn can_activate(&self) -> bool {
        self.phase == BoostPhase::Armed
    }

    #[must_use]
    pub const fn remaining(&self) -> f32 {
        self.remaining
    }

    #[must_use]
    pub const fn total_duration(&self) -> f32 {
        self.total_duration
    }

    #[must_use]
    pub fn duration_options(&self) -> &[f32] {
        &self.config.durations
    }

    #[must_use]
    pub const fn rate_per_second(&self) -> f32 {
        self.config.rate_per_second
    }

    /// Open the duration picker.
    pub fn request_activate(&mut self) -> bool {
        if self.phase != BoostPhase::Armed {
            return false;
        }
        self.phase = BoostPhase::SelectingDuration;
        true
    }

    /// Start the boost with one of the configured durations.
    pub fn confirm_duration(&mut self, duration: f32) -> bool {
        if self.phase != BoostPhase::SelectingDuration {
            return false;
        }
        let Some(chosen) = self
            .config
            .durations
            .iter()
            .copied()
            .find(|option| (option - duration).abs() <= f32::EPSILON)
        else {
            return false;
        };
        self.phase = BoostPhase::Active;
        self.remaining = chosen;
        self.total_duration = chosen;
        log::debug!(target: LOG_TARGET_BOOST, "fire boost started for {chosen:.1}s");
        true
    }

    /// Close the duration picker without starting; the boost stays available.
    pub fn cancel_selection(&mut self) -> bool {
        if self.phase != BoostPhase::SelectingDuration {
            return false;
        }
        self.phase = BoostPhase::Armed;
        true
    }

    /// Advance an active boost by `dt` seconds.
    ///
    /// The final tick is shortened to the remaining time so a boost never
    /// adds more than `rate * duration`.
    pub fn tick(&mut self, dt: f32) -> Option<BoostTick> {
        if self.phase != BoostPhase::Active || !dt.is_finite() || dt <= 0.0 {
            return None;
        }
        let step = dt.min(self.remaining);
        self.remaining = (self.remaining - step).max(0.0);
        let ended = self.remaining <= 0.0;
        if ended {
            self.phase = BoostPhase::Idle;
            log::debug!(target: LOG_TARGET_BOOST, "fire boost expired");
        }
        Some(BoostTick {
            deltas: Deltas::uniform(self.config.rate_per_second * step),
            remaining: self.remaining,
            ended,
        })
    }

    /// End any boost immediately and block activation until the next turn.
    ///
    /// Returns true when an active boost was cut short.
    pub fn disable(&mut self) -> bool {
        let was_active = self.phase == BoostPhase::Active;
        self.phase = BoostPhase::Idle;
        self.remaining = 0.0;
        if was_active {
            log::debug!(target: LOG_TARGET_BOOST, "fire boost cancelled");
        }
        was_active
    }

    /// Re-arm at the start of a new roll unless a boost is still running.
    pub fn reset_for_new_turn(&mut self) {
        if self.phase != BoostPhase::Active {
            self.phase = BoostPhase::Armed;
        }
    }

    pub fn reset(&mut self) {
        self.phase = BoostPhase::Idle;
        self.remaining = 0.0;
        self.total_duration = 0.0;
    }
}

impl Default for FireBoostModule {
    fn default() -> Self {
        Self::new(FireBoostConfig::default())
    }
}
