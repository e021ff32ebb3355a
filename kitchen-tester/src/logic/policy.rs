use std::fmt;

use kitchen_game::{
    Attribute, Deltas, FireBoostModule, IngredientRoll, JackpotEffect, Meters, RewardResult,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Largest single-ingredient delta the policies plan around when deciding
/// how much fire boost the meters can absorb.
const BOOST_SAFETY_MARGIN: f32 = 15.0;

/// Decision returned by a [`PlayerPolicy`]
#[derive(Debug, Clone)]
pub struct PolicyDecision {
    pub slot: usize,
    pub rationale: Option<String>,
}

impl PolicyDecision {
    #[must_use]
    pub const fn new(slot: usize, rationale: Option<String>) -> Self {
        Self { slot, rationale }
    }
}

/// Read-only snapshot handed to a policy at each decision point.
#[derive(Debug, Clone, Copy)]
pub struct PolicyView<'a> {
    pub meters: &'a Meters,
    pub rolls: &'a [IngredientRoll],
    pub turns_remaining: u32,
    pub potential: Option<&'a RewardResult>,
    pub fire_boost: &'a FireBoostModule,
}

impl PolicyView<'_> {
    /// Meter values after applying `deltas` (without clamping).
    #[must_use]
    pub fn projected(&self, deltas: Deltas) -> Deltas {
        self.meters.values() + deltas
    }

    /// Smallest distance to a target maximum after applying `deltas`.
    #[must_use]
    pub fn headroom_after(&self, deltas: Deltas) -> f32 {
        let projected = self.projected(deltas);
        Attribute::ALL
            .iter()
            .map(|attr| self.meters.get(*attr).target_max() - projected.get(*attr))
            .fold(f32::INFINITY, f32::min)
    }

    /// How many meters would sit inside their target range after `deltas`.
    #[must_use]
    pub fn in_range_after(&self, deltas: Deltas) -> usize {
        let projected = self.projected(deltas);
        Attribute::ALL
            .iter()
            .filter(|attr| {
                let meter = self.meters.get(**attr);
                let value = projected.get(**attr);
                value >= meter.target_min() && value <= meter.target_max()
            })
            .count()
    }

    /// Attribute closest to overflowing right now.
    #[must_use]
    pub fn tightest_attribute(&self) -> Attribute {
        Attribute::ALL
            .iter()
            .copied()
            .min_by(|a, b| {
                let gap = |attr: Attribute| {
                    let meter = self.meters.get(attr);
                    meter.target_max() - meter.current()
                };
                gap(*a).total_cmp(&gap(*b))
            })
            .unwrap_or(Attribute::Taste)
    }

    /// Distance from the meter furthest below its target minimum.
    #[must_use]
    pub fn largest_shortfall(&self) -> f32 {
        Attribute::ALL
            .iter()
            .map(|attr| {
                let meter = self.meters.get(*attr);
                (meter.target_min() - meter.current()).max(0.0)
            })
            .fold(0.0, f32::max)
    }

    fn safest_slot(&self) -> (usize, f32) {
        self.rolls
            .iter()
            .enumerate()
            .map(|(slot, roll)| (slot, self.headroom_after(roll.deltas)))
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap_or((0, 0.0))
    }
}

/// Policy interface for automated play strategies.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Select one of the rolled ingredients.
    fn pick_slot(&mut self, view: &PolicyView<'_>) -> PolicyDecision;

    fn pick_jackpot_effect(&mut self, view: &PolicyView<'_>) -> JackpotEffect;

    fn pick_shield_target(&mut self, view: &PolicyView<'_>) -> Attribute {
        view.tightest_attribute()
    }

    /// Duration to run the fire boost for this turn, if any.
    fn fire_boost_duration(&mut self, _view: &PolicyView<'_>) -> Option<f32> {
        None
    }

    /// Whether to serve the dish before the turn budget runs out.
    fn serve_now(&mut self, _view: &PolicyView<'_>) -> bool {
        false
    }
}

/// Built-in gameplay strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameplayStrategy {
    Careful,
    Greedy,
    Booster,
    Random,
}

impl GameplayStrategy {
    pub const ALL: [Self; 4] = [Self::Careful, Self::Greedy, Self::Booster, Self::Random];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Careful => "Careful",
            Self::Greedy => "Greedy",
            Self::Booster => "Booster",
            Self::Random => "Random",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy + Send> {
        match self {
            Self::Careful => Box::new(CarefulPolicy),
            Self::Greedy => Box::new(GreedyPolicy),
            Self::Booster => Box::new(BoosterPolicy),
            Self::Random => Box::new(RandomPolicy::new(seed)),
        }
    }
}

impl fmt::Display for GameplayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct CarefulPolicy;
struct GreedyPolicy;
struct BoosterPolicy;

struct RandomPolicy {
    rng: ChaCha20Rng,
}

impl RandomPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed ^ 0x5EED_CAFE),
        }
    }
}

impl PlayerPolicy for CarefulPolicy {
    fn name(&self) -> &'static str {
        "Careful"
    }

    fn pick_slot(&mut self, view: &PolicyView<'_>) -> PolicyDecision {
        let (slot, headroom) = view.safest_slot();
        PolicyDecision::new(slot, Some(format!("headroom {headroom:.1}")))
    }

    fn pick_jackpot_effect(&mut self, view: &PolicyView<'_>) -> JackpotEffect {
        if view.headroom_after(Deltas::default()) < BOOST_SAFETY_MARGIN {
            JackpotEffect::ZoneShield
        } else {
            JackpotEffect::MeterBoost
        }
    }

    fn serve_now(&mut self, view: &PolicyView<'_>) -> bool {
        view.potential
            .is_some_and(|reward| reward.meters_in_range == 3)
    }
}

impl PlayerPolicy for GreedyPolicy {
    fn name(&self) -> &'static str {
        "Greedy"
    }

    fn pick_slot(&mut self, view: &PolicyView<'_>) -> PolicyDecision {
        let best = view
            .rolls
            .iter()
            .enumerate()
            .filter(|(_, roll)| view.headroom_after(roll.deltas) >= 0.0)
            .max_by_key(|(_, roll)| view.in_range_after(roll.deltas));
        match best {
            Some((slot, roll)) => PolicyDecision::new(
                slot,
                Some(format!("in range {}", view.in_range_after(roll.deltas))),
            ),
            None => {
                let (slot, headroom) = view.safest_slot();
                PolicyDecision::new(slot, Some(format!("forced, headroom {headroom:.1}")))
            }
        }
    }

    fn pick_jackpot_effect(&mut self, view: &PolicyView<'_>) -> JackpotEffect {
        let total = view
            .rolls
            .iter()
            .fold(Deltas::default(), |sum, roll| sum + roll.deltas);
        if view.headroom_after(total) >= 0.0 {
            JackpotEffect::TripleApply
        } else {
            JackpotEffect::WildMultiplier
        }
    }
}

impl PlayerPolicy for BoosterPolicy {
    fn name(&self) -> &'static str {
        "Booster"
    }

    fn pick_slot(&mut self, view: &PolicyView<'_>) -> PolicyDecision {
        CarefulPolicy.pick_slot(view)
    }

    fn pick_jackpot_effect(&mut self, _view: &PolicyView<'_>) -> JackpotEffect {
        JackpotEffect::ZoneShield
    }

    fn fire_boost_duration(&mut self, view: &PolicyView<'_>) -> Option<f32> {
        if view.largest_shortfall() <= 0.0 {
            return None;
        }
        let budget = view.headroom_after(Deltas::default()) - BOOST_SAFETY_MARGIN;
        let rate = view.fire_boost.rate_per_second();
        view.fire_boost
            .duration_options()
            .iter()
            .copied()
            .filter(|duration| rate * duration <= budget)
            .max_by(f32::total_cmp)
    }
}

impl PlayerPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "Random"
    }

    fn pick_slot(&mut self, view: &PolicyView<'_>) -> PolicyDecision {
        let slot = if view.rolls.is_empty() {
            0
        } else {
            self.rng.gen_range(0..view.rolls.len())
        };
        PolicyDecision::new(slot, None)
    }

    fn pick_jackpot_effect(&mut self, _view: &PolicyView<'_>) -> JackpotEffect {
        let idx = self.rng.gen_range(0..JackpotEffect::ALL.len());
        JackpotEffect::ALL[idx]
    }

    fn pick_shield_target(&mut self, _view: &PolicyView<'_>) -> Attribute {
        let idx = self.rng.gen_range(0..Attribute::ALL.len());
        Attribute::ALL[idx]
    }

    fn serve_now(&mut self, _view: &PolicyView<'_>) -> bool {
        self.rng.gen_bool(0.1)
    }
}
