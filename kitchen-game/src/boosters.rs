//! Consumable boosters and the per-game effects they grant.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{DOUBLE_COINS_MULTIPLIER, DOUBLE_XP_MULTIPLIER};
use crate::data::Attribute;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoosterKind {
    ExtraTurn,
    Shield,
    DoubleCoins,
    DoubleXp,
}

impl BoosterKind {
    pub const ALL: [Self; 4] = [Self::ExtraTurn, Self::Shield, Self::DoubleCoins, Self::DoubleXp];
}

impl fmt::Display for BoosterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ExtraTurn => "extra turn",
            Self::Shield => "shield",
            Self::DoubleCoins => "double coins",
            Self::DoubleXp => "double XP",
        };
        f.write_str(label)
    }
}

/// Owned booster counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoosterInventory {
    #[serde(default)]
    pub extra_turns: u32,
    #[serde(default)]
    pub shields: u32,
    #[serde(default)]
    pub double_coins: u32,
    #[serde(default)]
    pub double_xp: u32,
}

impl BoosterInventory {
    const fn slot(&mut self, kind: BoosterKind) -> &mut u32 {
        match kind {
            BoosterKind::ExtraTurn => &mut self.extra_turns,
            BoosterKind::Shield => &mut self.shields,
            BoosterKind::DoubleCoins => &mut self.double_coins,
            BoosterKind::DoubleXp => &mut self.double_xp,
        }
    }

    #[must_use]
    pub const fn count(&self, kind: BoosterKind) -> u32 {
        match kind {
            BoosterKind::ExtraTurn => self.extra_turns,
            BoosterKind::Shield => self.shields,
            BoosterKind::DoubleCoins => self.double_coins,
            BoosterKind::DoubleXp => self.double_xp,
        }
    }

    pub fn add(&mut self, kind: BoosterKind, amount: u32) {
        let slot = self.slot(kind);
        *slot = slot.saturating_add(amount);
    }

    pub fn consume(&mut self, kind: BoosterKind) -> bool {
        let slot = self.slot(kind);
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    /// Spend one booster and apply it to `active`.
    ///
    /// A shield booster protects `shield_target`; without a target it is
    /// refused and nothing is consumed.
    pub fn activate_for_game(
        &mut self,
        kind: BoosterKind,
        shield_target: Option<Attribute>,
        active: &mut ActiveBoosters,
    ) -> bool {
        if kind == BoosterKind::Shield && shield_target.is_none() {
            return false;
        }
        if !self.consume(kind) {
            return false;
        }
        match kind {
            BoosterKind::ExtraTurn => active.extra_turns = active.extra_turns.saturating_add(1),
            BoosterKind::Shield => active.shield = shield_target,
            BoosterKind::DoubleCoins => active.double_coins = true,
            BoosterKind::DoubleXp => active.double_xp = true,
        }
        true
    }
}

/// Boosters applied to a single cooking session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActiveBoosters {
    pub extra_turns: u32,
    pub double_coins: bool,
    pub double_xp: bool,
    pub shield: Option<Attribute>,
}

impl ActiveBoosters {
    #[must_use]
    pub const fn none() -> Self {
        Self {
            extra_turns: 0,
            double_coins: false,
            double_xp: false,
            shield: None,
        }
    }

    #[must_use]
    pub const fn coin_multiplier(&self) -> f32 {
        if self.double_coins { DOUBLE_COINS_MULTIPLIER } else { 1.0 }
    }

    #[must_use]
    pub const fn xp_multiplier(&self) -> f32 {
        if self.double_xp { DOUBLE_XP_MULTIPLIER } else { 1.0 }
    }
}
