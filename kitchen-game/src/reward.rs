//! Graded coin rewards computed from the final meters.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ConfigError;
use crate::constants::{
    DEFAULT_BONUS_PER_TURN, DEFAULT_FAILED_MULTIPLIER, DEFAULT_GOOD_MULTIPLIER,
    DEFAULT_MAX_TURN_BONUS, DEFAULT_OKAY_MULTIPLIER, DEFAULT_PERFECT_MULTIPLIER,
    LOG_TARGET_REWARD,
};
use crate::data::{Attribute, RecipeSpec};
use crate::meter::Meters;
use crate::numbers::{scale_u32, u32_to_f32};

/// Quality tier derived from the number of meters inside their target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Grade {
    Failed,
    Okay,
    Good,
    Perfect,
}

impl Grade {
    /// 3 → Perfect, 2 → Good, 1 → Okay, anything else → Failed.
    #[must_use]
    pub const fn from_meters_in_range(count: u8) -> Self {
        match count {
            3 => Self::Perfect,
            2 => Self::Good,
            1 => Self::Okay,
            _ => Self::Failed,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Perfect => "PERFECT",
            Self::Good => "GOOD",
            Self::Okay => "OKAY",
            Self::Failed => "FAILED",
        }
    }

    #[must_use]
    pub const fn is_success(self) -> bool {
        !matches!(self, Self::Failed)
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Reward tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardConfig {
    #[serde(default = "RewardConfig::default_perfect")]
    pub perfect_multiplier: f32,
    #[serde(default = "RewardConfig::default_good")]
    pub good_multiplier: f32,
    #[serde(default = "RewardConfig::default_okay")]
    pub okay_multiplier: f32,
    #[serde(default = "RewardConfig::default_failed")]
    pub failed_multiplier: f32,
    #[serde(default = "RewardConfig::default_bonus_per_turn")]
    pub bonus_per_turn: f32,
    #[serde(default = "RewardConfig::default_max_turn_bonus")]
    pub max_turn_bonus: f32,
}

impl RewardConfig {
    const fn default_perfect() -> f32 {
        DEFAULT_PERFECT_MULTIPLIER
    }

    const fn default_good() -> f32 {
        DEFAULT_GOOD_MULTIPLIER
    }

    const fn default_okay() -> f32 {
        DEFAULT_OKAY_MULTIPLIER
    }

    const fn default_failed() -> f32 {
        DEFAULT_FAILED_MULTIPLIER
    }

    const fn default_bonus_per_turn() -> f32 {
        DEFAULT_BONUS_PER_TURN
    }

    const fn default_max_turn_bonus() -> f32 {
        DEFAULT_MAX_TURN_BONUS
    }

    #[must_use]
    pub const fn multiplier_for(&self, grade: Grade) -> f32 {
        match grade {
            Grade::Perfect => self.perfect_multiplier,
            Grade::Good => self.good_multiplier,
            Grade::Okay => self.okay_multiplier,
            Grade::Failed => self.failed_multiplier,
        }
    }

    /// # Errors
    ///
    /// Returns `ConfigError::RangeViolation` when a multiplier or bonus lies
    /// outside `0.0..=10.0`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("reward.perfect_multiplier", self.perfect_multiplier),
            ("reward.good_multiplier", self.good_multiplier),
            ("reward.okay_multiplier", self.okay_multiplier),
            ("reward.failed_multiplier", self.failed_multiplier),
            ("reward.bonus_per_turn", self.bonus_per_turn),
            ("reward.max_turn_bonus", self.max_turn_bonus),
        ];
        for (field, value) in fields {
            if !(0.0..=10.0).contains(&value) {
                return Err(ConfigError::RangeViolation {
                    field,
                    min: 0.0,
                    max: 10.0,
                    value,
                });
            }
        }
        Ok(())
    }
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            perfect_multiplier: Self::default_perfect(),
            good_multiplier: Self::default_good(),
            okay_multiplier: Self::default_okay(),
            failed_multiplier: Self::default_failed(),
            bonus_per_turn: Self::default_bonus_per_turn(),
            max_turn_bonus: Self::default_max_turn_bonus(),
        }
    }
}

/// Breakdown of a finished (or previewed) order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardResult {
    pub taste_in_range: bool,
    pub stability_in_range: bool,
    pub magic_in_range: bool,
    pub meters_in_range: u8,
    pub grade: Grade,
    pub meter_percentage: f32,
    pub turns_remaining: u32,
    pub turns_bonus_percent: f32,
    pub turns_bonus: u32,
    pub meter_reward: u32,
    pub final_reward: u32,
}

impl RewardResult {
    #[must_use]
    pub const fn in_range(&self, attribute: Attribute) -> bool {
        match attribute {
            Attribute::Taste => self.taste_in_range,
            Attribute::Stability => self.stability_in_range,
            Attribute::Magic => self.magic_in_range,
        }
    }
}

/// Compute the graded reward for `recipe` from the current meters.
#[must_use]
pub fn calculate_reward(
    recipe: &RecipeSpec,
    meters: &Meters,
    turns_remaining: u32,
    config: &RewardConfig,
) -> RewardResult {
    let taste_in_range = meters.get(Attribute::Taste).in_range();
    let stability_in_range = meters.get(Attribute::Stability).in_range();
    let magic_in_range = meters.get(Attribute::Magic).in_range();
    let meters_in_range = meters.in_range_count();
    let grade = Grade::from_meters_in_range(meters_in_range);
    let meter_percentage = config.multiplier_for(grade);

    let turns_bonus_percent =
        (u32_to_f32(turns_remaining) * config.bonus_per_turn).min(config.max_turn_bonus);
    let turns_bonus = scale_u32(recipe.base_reward, turns_bonus_percent);
    let meter_reward = scale_u32(recipe.base_reward, meter_percentage);
    let final_reward = meter_reward.saturating_add(turns_bonus);

    log::debug!(
        target: LOG_TARGET_REWARD,
        "{}: {grade} ({meters_in_range}/3) meter={meter_reward} bonus={turns_bonus} final={final_reward}",
        recipe.id
    );

    RewardResult {
        taste_in_range,
        stability_in_range,
        magic_in_range,
        meters_in_range,
        grade,
        meter_percentage,
        turns_remaining,
        turns_bonus_percent,
        turns_bonus,
        meter_reward,
        final_reward,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Deltas, Difficulty, TargetRange};

    fn recipe(base_reward: u32) -> RecipeSpec {
        RecipeSpec {
            id: "test_dish".to_string(),
            name: "Test Dish".to_string(),
            taste: TargetRange::new(20.0, 35.0),
            stability: TargetRange::new(40.0, 55.0),
            magic: TargetRange::new(10.0, 25.0),
            total_turns: 5,
            base_reward,
            unlock_level: 1,
            difficulty: Difficulty::Easy,
        }
    }

    fn meters_at(recipe: &RecipeSpec, values: Deltas) -> Meters {
        let mut meters = Meters::new(100.0);
        meters.initialize_for(recipe);
        meters.apply(values);
        meters
    }

    #[test]
    fn grade_table_is_exhaustive() {
        assert_eq!(Grade::from_meters_in_range(3), Grade::Perfect);
        assert_eq!(Grade::from_meters_in_range(2), Grade::Good);
        assert_eq!(Grade::from_meters_in_range(1), Grade::Okay);
        assert_eq!(Grade::from_meters_in_range(0), Grade::Failed);
        assert_eq!(Grade::from_meters_in_range(7), Grade::Failed);
        assert!(!Grade::Failed.is_success());
        assert!(Grade::Okay.is_success());
    }

    #[test]
    fn perfect_with_two_turns_left_pays_110() {
        let dish = recipe(100);
        let meters = meters_at(&dish, Deltas::new(30.0, 50.0, 20.0));
        let result = calculate_reward(&dish, &meters, 2, &RewardConfig::default());
        assert_eq!(result.grade, Grade::Perfect);
        assert_eq!(result.meter_reward, 100);
        assert_eq!(result.turns_bonus, 10);
        assert_eq!(result.final_reward, 110);
        assert!((result.turns_bonus_percent - 0.1).abs() < 1e-6);
    }

    #[test]
    fn turn_bonus_is_capped() {
        let dish = recipe(200);
        let meters = meters_at(&dish, Deltas::new(30.0, 50.0, 90.0));
        let result = calculate_reward(&dish, &meters, 9, &RewardConfig::default());
        assert_eq!(result.grade, Grade::Good);
        assert!(!result.in_range(Attribute::Magic));
        assert_eq!(result.meter_reward, 120);
        assert_eq!(result.turns_bonus, 50);
        assert_eq!(result.final_reward, 170);
    }

    #[test]
    fn failed_grade_still_pays_consolation() {
        let dish = recipe(100);
        let meters = meters_at(&dish, Deltas::uniform(0.0));
        let result = calculate_reward(&dish, &meters, 0, &RewardConfig::default());
        assert_eq!(result.grade, Grade::Failed);
        assert_eq!(result.meters_in_range, 0);
        assert_eq!(result.final_reward, 10);
    }

    #[test]
    fn rounding_is_half_to_even() {
        let dish = recipe(5);
        let meters = meters_at(&dish, Deltas::new(30.0, 0.0, 0.0));
        let config = RewardConfig {
            okay_multiplier: 0.5,
            ..RewardConfig::default()
        };
        let result = calculate_reward(&dish, &meters, 0, &config);
        assert_eq!(result.grade, Grade::Okay);
        assert_eq!(result.meter_reward, 2, "2.5 rounds to the even neighbour");
    }

    #[test]
    fn bundled_turn_bonus_ties_round_to_even() {
        let content = crate::data::ContentData::load_bundled().unwrap();
        let config = RewardConfig::default();
        for (id, turns, expected_bonus) in [("hard_steak", 1, 12), ("medium_soup", 3, 22)] {
            let dish = content.recipe(id).unwrap();
            let meters = meters_at(dish, Deltas::uniform(0.0));
            let result = calculate_reward(dish, &meters, turns, &config);
            assert_eq!(result.turns_bonus, expected_bonus, "{id} with {turns} turns left");
        }
    }

    #[test]
    fn calculation_is_pure() {
        let dish = recipe(150);
        let meters = meters_at(&dish, Deltas::new(25.0, 45.0, 15.0));
        let config = RewardConfig::default();
        let first = calculate_reward(&dish, &meters, 1, &config);
        let second = calculate_reward(&dish, &meters, 1, &config);
        assert_eq!(first, second);
    }

    #[test]
    fn grade_serializes_in_capitals() {
        let json = serde_json::to_string(&Grade::Perfect).unwrap();
        assert_eq!(json, "\"PERFECT\"");
    }

    #[test]
    fn config_validation_flags_negative_bonus() {
        let config = RewardConfig {
            bonus_per_turn: -0.1,
            ..RewardConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RangeViolation { field: "reward.bonus_per_turn", .. })
        ));
    }
}
