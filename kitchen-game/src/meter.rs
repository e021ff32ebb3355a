//! Bounded attribute meters.
use serde::{Deserialize, Serialize};

use crate::data::{Attribute, Deltas, RecipeSpec, TargetRange};

/// A bounded accumulator with a target window.
///
/// `0 <= current <= max_value` holds after every mutation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeterState {
    current: f32,
    max_value: f32,
    target_min: f32,
    target_max: f32,
}

impl MeterState {
    #[must_use]
    pub fn new(max_value: f32) -> Self {
        Self {
            current: 0.0,
            max_value: max_value.max(0.0),
            target_min: 0.0,
            target_max: max_value.max(0.0),
        }
    }

    /// Reset the value and target bounds.
    pub fn initialize(&mut self, start: f32, target_min: f32, target_max: f32) {
        self.target_min = target_min;
        self.target_max = target_max;
        self.set_value(start);
    }

    pub fn add_value(&mut self, delta: f32) {
        self.set_value(self.current + delta);
    }

    pub fn set_value(&mut self, value: f32) {
        self.current = if value.is_nan() {
            0.0
        } else {
            value.clamp(0.0, self.max_value)
        };
    }

    #[must_use]
    pub const fn current(&self) -> f32 {
        self.current
    }

    #[must_use]
    pub const fn max_value(&self) -> f32 {
        self.max_value
    }

    #[must_use]
    pub const fn target_min(&self) -> f32 {
        self.target_min
    }

    #[must_use]
    pub const fn target_max(&self) -> f32 {
        self.target_max
    }

    #[must_use]
    pub fn in_range(&self) -> bool {
        self.target_min <= self.current && self.current <= self.target_max
    }

    #[must_use]
    pub fn is_overflow(&self) -> bool {
        self.current > self.target_max
    }
}

impl Default for MeterState {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_METER_MAX)
    }
}

/// The three meters of a session, indexed by [`Attribute`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Meters {
    meters: [MeterState; 3],
}

impl Meters {
    #[must_use]
    pub fn new(max_value: f32) -> Self {
        Self {
            meters: [MeterState::new(max_value); 3],
        }
    }

    /// Start every meter at zero with the recipe's target windows.
    pub fn initialize_for(&mut self, recipe: &RecipeSpec) {
        for attribute in Attribute::ALL {
            let TargetRange { min, max } = recipe.range(attribute);
            self.get_mut(attribute).initialize(0.0, min, max);
        }
    }

    #[must_use]
    pub const fn get(&self, attribute: Attribute) -> &MeterState {
        &self.meters[attribute.index()]
    }

    pub const fn get_mut(&mut self, attribute: Attribute) -> &mut MeterState {
        &mut self.meters[attribute.index()]
    }

    pub fn apply(&mut self, deltas: Deltas) {
        for attribute in Attribute::ALL {
            self.get_mut(attribute).add_value(deltas.get(attribute));
        }
    }

    /// Current values as a delta triple, handy for snapshots.
    #[must_use]
    pub fn values(&self) -> Deltas {
        Deltas::new(
            self.get(Attribute::Taste).current(),
            self.get(Attribute::Stability).current(),
            self.get(Attribute::Magic).current(),
        )
    }

    #[must_use]
    pub fn in_range_count(&self) -> u8 {
        let count = Attribute::ALL
            .into_iter()
            .filter(|a| self.get(*a).in_range())
            .count();
        u8::try_from(count).unwrap_or(3)
    }
}
