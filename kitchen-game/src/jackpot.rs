//! Jackpot triggers and the four bonus effects they offer.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ConfigError;
use crate::constants::{
    DEFAULT_JACKPOT_MAX_ROLLS, DEFAULT_JACKPOT_MIN_ROLLS, DEFAULT_METER_BOOST,
    DEFAULT_WILD_MULTIPLIER, LOG_TARGET_JACKPOT,
};
use crate::data::IngredientRoll;
use crate::rng::KitchenRng;

/// Effect the player may pick after a jackpot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JackpotEffect {
    /// Flat boost to every meter.
    MeterBoost,
    /// Next selected ingredient counts double.
    WildMultiplier,
    /// Arm the shield on a player-chosen attribute.
    ZoneShield,
    /// Apply all three rolled ingredients at once.
    TripleApply,
}

impl JackpotEffect {
    pub const ALL: [Self; 4] = [
        Self::MeterBoost,
        Self::WildMultiplier,
        Self::ZoneShield,
        Self::TripleApply,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::MeterBoost => "meter_boost",
            Self::WildMultiplier => "wild_multiplier",
            Self::ZoneShield => "zone_shield",
            Self::TripleApply => "triple_apply",
        }
    }
}

impl fmt::Display for JackpotEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Jackpot tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JackpotConfig {
    #[serde(default = "JackpotConfig::default_min_rolls")]
    pub min_rolls: u32,
    #[serde(default = "JackpotConfig::default_max_rolls")]
    pub max_rolls: u32,
    #[serde(default = "JackpotConfig::default_meter_boost")]
    pub meter_boost: f32,
    #[serde(default = "JackpotConfig::default_wild_multiplier")]
    pub wild_multiplier: f32,
}

impl JackpotConfig {
    const fn default_min_rolls() -> u32 {
        DEFAULT_JACKPOT_MIN_ROLLS
    }

    const fn default_max_rolls() -> u32 {
        DEFAULT_JACKPOT_MAX_ROLLS
    }

    const fn default_meter_boost() -> f32 {
        DEFAULT_METER_BOOST
    }

    const fn default_wild_multiplier() -> f32 {
        DEFAULT_WILD_MULTIPLIER
    }

    /// # Errors
    ///
    /// Returns `ConfigError` when the roll window is empty or inverted, or
    /// the boost amounts are not finite and non-negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_rolls == 0 {
            return Err(ConfigError::ZeroJackpotWindow);
        }
        if self.min_rolls > self.max_rolls {
            return Err(ConfigError::JackpotWindow {
                min: self.min_rolls,
                max: self.max_rolls,
            });
        }
        if !self.meter_boost.is_finite() || self.meter_boost < 0.0 {
            return Err(ConfigError::MinViolation {
                field: "jackpot.meter_boost",
                min: 0.0,
                value: self.meter_boost,
            });
        }
        if !self.wild_multiplier.is_finite() || self.wild_multiplier < 1.0 {
            return Err(ConfigError::MinViolation {
                field: "jackpot.wild_multiplier",
                min: 1.0,
                value: self.wild_multiplier,
            });
        }
        Ok(())
    }
}

impl Default for JackpotConfig {
    fn default() -> Self {
        Self {
            min_rolls: Self::default_min_rolls(),
            max_rolls: Self::default_max_rolls(),
            meter_boost: Self::default_meter_boost(),
            wild_multiplier: Self::default_wild_multiplier(),
        }
    }
}

/// How a jackpot fired. Only used for logging; callers just see "triggered".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TriggerKind {
    Natural,
    Guaranteed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JackpotModule {
    config: JackpotConfig,
    roll_counter: u32,
    next_trigger_at: u32,
    pending: bool,
    selected: Option<JackpotEffect>,
    wild_multiplier_active: bool,
}

impl JackpotModule {
    #[must_use]
    pub fn new(config: JackpotConfig) -> Self {
        let next_trigger_at = config.max_rolls;
        Self {
            config,
            roll_counter: 0,
            next_trigger_at,
            pending: false,
            selected: None,
            wild_multiplier_active: false,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &JackpotConfig {
        &self.config
    }

    /// Clear state for a new session and schedule the first guaranteed trigger.
    pub fn reset(&mut self, rng: &mut KitchenRng) {
        self.roll_counter = 0;
        self.next_trigger_at = rng.jackpot_interval(self.config.min_rolls, self.config.max_rolls);
        self.pending = false;
        self.selected = None;
        self.wild_multiplier_active = false;
    }

    /// Count a roll and report whether it triggers a jackpot.
    pub fn check_for_jackpot(&mut self, rolls: &[IngredientRoll], rng: &mut KitchenRng) -> bool {
        self.roll_counter = self.roll_counter.saturating_add(1);
        let natural = match rolls {
            [first, rest @ ..] if !rest.is_empty() => rest.iter().all(|r| r.same_spec(first)),
            _ => false,
        };
        let guaranteed = self.roll_counter >= self.next_trigger_at;
        let kind = match (natural, guaranteed) {
            (true, _) => TriggerKind::Natural,
            (false, true) => TriggerKind::Guaranteed,
            (false, false) => return false,
        };
        let interval = rng.jackpot_interval(self.config.min_rolls, self.config.max_rolls);
        self.next_trigger_at = self.roll_counter.saturating_add(interval);
        self.pending = true;
        self.selected = None;
        log::debug!(
            target: LOG_TARGET_JACKPOT,
            "jackpot ({kind:?}) on roll {}; next guaranteed at {}",
            self.roll_counter,
            self.next_trigger_at
        );
        true
    }

    /// Resolve a pending jackpot.
    pub fn select_effect(&mut self, effect: JackpotEffect) -> bool {
        if !self.pending {
            return false;
        }
        self.pending = false;
        self.selected = Some(effect);
        if effect == JackpotEffect::WildMultiplier {
            self.wild_multiplier_active = true;
        }
        true
    }

    /// Multiplier for the next ingredient application; consumes the wild flag.
    pub fn take_wild_multiplier(&mut self) -> f32 {
        if std::mem::take(&mut self.wild_multiplier_active) {
            self.config.wild_multiplier
        } else {
            1.0
        }
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending
    }

    #[must_use]
    pub const fn selected(&self) -> Option<JackpotEffect> {
        self.selected
    }

    #[must_use]
    pub const fn wild_multiplier_active(&self) -> bool {
        self.wild_multiplier_active
    }

    #[must_use]
    pub const fn roll_counter(&self) -> u32 {
        self.roll_counter
    }

    #[must_use]
    pub const fn next_trigger_at(&self) -> u32 {
        self.next_trigger_at
    }

    #[must_use]
    pub const fn meter_boost(&self) -> f32 {
        self.config.meter_boost
    }
}

impl Default for JackpotModule {
    fn default() -> Self {
        Self::new(JackpotConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Deltas, Rarity};

    fn roll(id: &str) -> IngredientRoll {
        IngredientRoll {
            spec_id: id.to_string(),
            name: id.to_string(),
            rarity: Rarity::Common,
            deltas: Deltas::uniform(1.0),
        }
    }

    fn mixed() -> Vec<IngredientRoll> {
        vec![roll("a"), roll("b"), roll("c")]
    }

    fn fixed_window(n: u32) -> JackpotModule {
        JackpotModule::new(JackpotConfig {
            min_rolls: n,
            max_rolls: n,
            ..JackpotConfig::default()
        })
    }

    #[test]
    fn degenerate_window_guarantees_fifth_roll() {
        let mut rng = KitchenRng::from_user_seed(11);
        let mut jackpot = fixed_window(5);
        jackpot.reset(&mut rng);
        for _ in 0..4 {
            assert!(!jackpot.check_for_jackpot(&mixed(), &mut rng));
        }
        assert!(jackpot.check_for_jackpot(&mixed(), &mut rng));
        assert_eq!(jackpot.next_trigger_at(), 10);
        assert!(jackpot.is_pending());
    }

    #[test]
    fn matching_specs_trigger_naturally() {
        let mut rng = KitchenRng::from_user_seed(3);
        let mut jackpot = fixed_window(10);
        jackpot.reset(&mut rng);
        let same = vec![roll("a"), roll("a"), roll("a")];
        assert!(jackpot.check_for_jackpot(&same, &mut rng));
        assert_eq!(jackpot.next_trigger_at(), 11, "natural trigger reschedules too");
    }

    #[test]
    fn two_matching_out_of_three_is_not_natural() {
        let mut rng = KitchenRng::from_user_seed(3);
        let mut jackpot = fixed_window(10);
        jackpot.reset(&mut rng);
        let pair = vec![roll("a"), roll("a"), roll("b")];
        assert!(!jackpot.check_for_jackpot(&pair, &mut rng));
    }

    #[test]
    fn interval_stays_inside_window() {
        let mut rng = KitchenRng::from_user_seed(99);
        let mut jackpot = JackpotModule::default();
        jackpot.reset(&mut rng);
        assert!((5..=10).contains(&jackpot.next_trigger_at()));
        let mut last_trigger = 0;
        for roll_no in 1..=200 {
            if jackpot.check_for_jackpot(&mixed(), &mut rng) {
                let gap = roll_no - last_trigger;
                assert!(gap <= 10, "gap {gap} exceeds max window");
                last_trigger = roll_no;
                jackpot.select_effect(JackpotEffect::MeterBoost);
            }
        }
    }

    #[test]
    fn wild_multiplier_is_single_use() {
        let mut rng = KitchenRng::from_user_seed(5);
        let mut jackpot = fixed_window(1);
        jackpot.reset(&mut rng);
        assert!(!jackpot.select_effect(JackpotEffect::WildMultiplier));
        assert!(jackpot.check_for_jackpot(&mixed(), &mut rng));
        assert!(jackpot.select_effect(JackpotEffect::WildMultiplier));
        assert!(jackpot.wild_multiplier_active());
        assert!((jackpot.take_wild_multiplier() - 2.0).abs() < f32::EPSILON);
        assert!((jackpot.take_wild_multiplier() - 1.0).abs() < f32::EPSILON);
        assert_eq!(jackpot.selected(), Some(JackpotEffect::WildMultiplier));
    }

    #[test]
    fn config_validation() {
        assert!(JackpotConfig::default().validate().is_ok());
        let inverted = JackpotConfig {
            min_rolls: 8,
            max_rolls: 3,
            ..JackpotConfig::default()
        };
        assert!(matches!(
            inverted.validate(),
            Err(ConfigError::JackpotWindow { min: 8, max: 3 })
        ));
        let zero = JackpotConfig {
            min_rolls: 0,
            ..JackpotConfig::default()
        };
        assert!(matches!(zero.validate(), Err(ConfigError::ZeroJackpotWindow)));
    }
}
