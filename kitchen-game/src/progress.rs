//! Player levels, XP and order streaks.
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::constants::{
    DEFAULT_BASE_XP_PER_LEVEL, DEFAULT_MAX_LEVEL, DEFAULT_XP_BONUS_GOOD, DEFAULT_XP_BONUS_OKAY,
    DEFAULT_XP_BONUS_PERFECT, DEFAULT_XP_BONUS_STREAK, DEFAULT_XP_PER_ORDER,
    DEFAULT_XP_SCALING_FACTOR, LOG_TARGET_PROGRESS,
};
use crate::numbers::{round_even_f64_to_u32, scale_u32};
use crate::reward::Grade;

const DEFAULT_PROGRESS_DATA: &str = include_str!("../assets/data/progress.json");

/// Progression collaborator used by a cooking session.
pub trait ProgressTracker {
    fn level(&self) -> u32;

    /// Record a successful order. `xp_multiplier` scales the XP earned.
    fn record_order_complete(&mut self, grade: Grade, reward: u32, xp_multiplier: f32) -> ProgressUpdate;

    fn record_order_failed(&mut self);

    fn record_jackpot(&mut self);
}

impl<T: ProgressTracker + ?Sized> ProgressTracker for &mut T {
    fn level(&self) -> u32 {
        (**self).level()
    }

    fn record_order_complete(&mut self, grade: Grade, reward: u32, xp_multiplier: f32) -> ProgressUpdate {
        (**self).record_order_complete(grade, reward, xp_multiplier)
    }

    fn record_order_failed(&mut self) {
        (**self).record_order_failed();
    }

    fn record_jackpot(&mut self) {
        (**self).record_jackpot();
    }
}

/// XP curve and per-order bonuses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressConfig {
    #[serde(default = "ProgressConfig::default_base_xp")]
    pub base_xp_per_level: u32,
    #[serde(default = "ProgressConfig::default_scaling")]
    pub xp_scaling_factor: f32,
    #[serde(default = "ProgressConfig::default_max_level")]
    pub max_level: u32,
    #[serde(default = "ProgressConfig::default_xp_per_order")]
    pub xp_per_order: u32,
    #[serde(default = "ProgressConfig::default_bonus_perfect")]
    pub xp_bonus_perfect: u32,
    #[serde(default = "ProgressConfig::default_bonus_good")]
    pub xp_bonus_good: u32,
    #[serde(default = "ProgressConfig::default_bonus_okay")]
    pub xp_bonus_okay: u32,
    #[serde(default = "ProgressConfig::default_bonus_streak")]
    pub xp_bonus_streak: u32,
}

impl ProgressConfig {
    const fn default_base_xp() -> u32 {
        DEFAULT_BASE_XP_PER_LEVEL
    }

    const fn default_scaling() -> f32 {
        DEFAULT_XP_SCALING_FACTOR
    }

    const fn default_max_level() -> u32 {
        DEFAULT_MAX_LEVEL
    }

    const fn default_xp_per_order() -> u32 {
        DEFAULT_XP_PER_ORDER
    }

    const fn default_bonus_perfect() -> u32 {
        DEFAULT_XP_BONUS_PERFECT
    }

    const fn default_bonus_good() -> u32 {
        DEFAULT_XP_BONUS_GOOD
    }

    const fn default_bonus_okay() -> u32 {
        DEFAULT_XP_BONUS_OKAY
    }

    const fn default_bonus_streak() -> u32 {
        DEFAULT_XP_BONUS_STREAK
    }

    /// XP needed to clear `level`.
    #[must_use]
    pub fn xp_for_level(&self, level: u32) -> u32 {
        let exponent = i32::try_from(level.saturating_sub(1)).unwrap_or(i32::MAX);
        let needed =
            f64::from(self.base_xp_per_level) * f64::from(self.xp_scaling_factor).powi(exponent);
        round_even_f64_to_u32(needed)
    }

    /// # Errors
    ///
    /// Returns `ConfigError` when the curve would never let a player level.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_xp_per_level == 0 {
            return Err(ConfigError::MinViolation {
                field: "base_xp_per_level",
                min: 1.0,
                value: 0.0,
            });
        }
        if !(1.0..=4.0).contains(&self.xp_scaling_factor) {
            return Err(ConfigError::RangeViolation {
                field: "xp_scaling_factor",
                min: 1.0,
                max: 4.0,
                value: self.xp_scaling_factor,
            });
        }
        if self.max_level == 0 {
            return Err(ConfigError::MinViolation {
                field: "max_level",
                min: 1.0,
                value: 0.0,
            });
        }
        Ok(())
    }
}

impl Default for ProgressConfig {
    fn default() -> Self {
        serde_json::from_str(DEFAULT_PROGRESS_DATA).unwrap_or_else(|_| Self {
            base_xp_per_level: Self::default_base_xp(),
            xp_scaling_factor: Self::default_scaling(),
            max_level: Self::default_max_level(),
            xp_per_order: Self::default_xp_per_order(),
            xp_bonus_perfect: Self::default_bonus_perfect(),
            xp_bonus_good: Self::default_bonus_good(),
            xp_bonus_okay: Self::default_bonus_okay(),
            xp_bonus_streak: Self::default_bonus_streak(),
        })
    }
}

/// Persistent progression counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProgress {
    pub level: u32,
    pub current_xp: u32,
    pub total_xp_earned: u32,
    pub orders_completed: u32,
    pub orders_failed: u32,
    pub perfect_orders: u32,
    pub jackpots_triggered: u32,
    pub highest_streak: u32,
    pub current_streak: u32,
}

impl Default for PlayerProgress {
    fn default() -> Self {
        Self {
            level: 1,
            current_xp: 0,
            total_xp_earned: 0,
            orders_completed: 0,
            orders_failed: 0,
            perfect_orders: 0,
            jackpots_triggered: 0,
            highest_streak: 0,
            current_streak: 0,
        }
    }
}

impl PlayerProgress {
    #[must_use]
    pub const fn total_orders(&self) -> u32 {
        self.orders_completed.saturating_add(self.orders_failed)
    }

    /// Completed orders as a percentage of all orders.
    #[must_use]
    pub fn success_rate(&self) -> f32 {
        let total = self.total_orders();
        if total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_possible_truncation)]
        let rate = (f64::from(self.orders_completed) / f64::from(total) * 100.0) as f32;
        rate
    }
}

/// Result of recording one order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub xp_earned: u32,
    pub levels_gained: u32,
}

/// Progress counters paired with the curve that drives them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Progression {
    config: ProgressConfig,
    data: PlayerProgress,
}

impl Progression {
    #[must_use]
    pub const fn new(config: ProgressConfig, data: PlayerProgress) -> Self {
        Self { config, data }
    }

    #[must_use]
    pub const fn data(&self) -> &PlayerProgress {
        &self.data
    }

    #[must_use]
    pub fn into_data(self) -> PlayerProgress {
        self.data
    }

    #[must_use]
    pub const fn config(&self) -> &ProgressConfig {
        &self.config
    }

    #[must_use]
    pub fn xp_for_next_level(&self) -> u32 {
        self.config.xp_for_level(self.data.level)
    }

    /// Fraction of the current level already earned.
    #[must_use]
    pub fn level_progress(&self) -> f32 {
        let needed = self.xp_for_next_level();
        if needed == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_possible_truncation)]
        let progress = (f64::from(self.data.current_xp) / f64::from(needed)) as f32;
        progress
    }

    /// Add XP and resolve level-ups. Players at the cap earn nothing.
    pub fn add_xp(&mut self, amount: u32) -> u32 {
        if self.data.level >= self.config.max_level {
            return 0;
        }
        self.data.current_xp = self.data.current_xp.saturating_add(amount);
        self.data.total_xp_earned = self.data.total_xp_earned.saturating_add(amount);
        let mut gained = 0;
        while self.data.level < self.config.max_level {
            let needed = self.xp_for_next_level();
            if self.data.current_xp < needed {
                break;
            }
            self.data.current_xp -= needed;
            self.data.level += 1;
            gained += 1;
            log::info!(target: LOG_TARGET_PROGRESS, "level up: {}", self.data.level);
        }
        gained
    }

    pub fn reset(&mut self) {
        self.data = PlayerProgress::default();
    }

    fn grade_bonus(&mut self, grade: Grade) -> u32 {
        match grade {
            Grade::Perfect => {
                self.data.perfect_orders = self.data.perfect_orders.saturating_add(1);
                self.data.current_streak = self.data.current_streak.saturating_add(1);
                self.config.xp_bonus_perfect
            }
            Grade::Good => {
                self.data.current_streak = self.data.current_streak.saturating_add(1);
                self.config.xp_bonus_good
            }
            Grade::Okay => {
                self.data.current_streak = 0;
                self.config.xp_bonus_okay
            }
            Grade::Failed => {
                self.data.current_streak = 0;
                0
            }
        }
    }
}

impl ProgressTracker for Progression {
    fn level(&self) -> u32 {
        self.data.level
    }

    fn record_order_complete(&mut self, grade: Grade, reward: u32, xp_multiplier: f32) -> ProgressUpdate {
        self.data.orders_completed = self.data.orders_completed.saturating_add(1);
        let mut xp = self.config.xp_per_order.saturating_add(self.grade_bonus(grade));
        if self.data.current_streak > 1 {
            xp = xp.saturating_add(
                self.config
                    .xp_bonus_streak
                    .saturating_mul(self.data.current_streak - 1),
            );
        }
        self.data.highest_streak = self.data.highest_streak.max(self.data.current_streak);
        let xp_earned = scale_u32(xp, xp_multiplier);
        log::debug!(
            target: LOG_TARGET_PROGRESS,
            "order complete: {grade} reward={reward} xp={xp_earned} streak={}",
            self.data.current_streak
        );
        let levels_gained = self.add_xp(xp_earned);
        ProgressUpdate {
            xp_earned,
            levels_gained,
        }
    }

    fn record_order_failed(&mut self) {
        self.data.orders_failed = self.data.orders_failed.saturating_add(1);
        self.data.current_streak = 0;
        log::debug!(target: LOG_TARGET_PROGRESS, "order failed; streak reset");
    }

    fn record_jackpot(&mut self) {
        self.data.jackpots_triggered = self.data.jackpots_triggered.saturating_add(1);
    }
}
