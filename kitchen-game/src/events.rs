//! Typed notifications a cooking session emits for presentation layers.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::data::{Attribute, IngredientRoll};
use crate::jackpot::JackpotEffect;
use crate::reward::RewardResult;

/// Why a command was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// The session already ended.
    GameOver,
    /// The command is not valid in the current phase.
    WrongPhase,
    /// Slot index outside the rolled ingredients.
    InvalidSlot,
    /// The fire boost cannot start right now.
    BoostUnavailable,
    /// The requested duration is not one of the configured options.
    InvalidDuration,
    /// Serving early needs at least one used turn.
    NothingServed,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::GameOver => "session is over",
            Self::WrongPhase => "command not valid in this phase",
            Self::InvalidSlot => "slot out of range",
            Self::BoostUnavailable => "fire boost unavailable",
            Self::InvalidDuration => "unknown boost duration",
            Self::NothingServed => "no turns used yet",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    MeterChanged {
        attribute: Attribute,
        value: f32,
        in_range: bool,
    },
    RollsPresented {
        rolls: Vec<IngredientRoll>,
    },
    TurnAdvanced {
        turns_used: u32,
        turns_remaining: u32,
    },
    JackpotTriggered {
        roll: u32,
    },
    JackpotEffectApplied {
        effect: JackpotEffect,
    },
    ShieldSelectionRequired,
    ShieldArmed {
        attribute: Attribute,
    },
    ShieldUsed {
        attribute: Attribute,
    },
    FireBoostStarted {
        duration: f32,
    },
    FireBoostTick {
        remaining: f32,
    },
    FireBoostEnded {
        cancelled: bool,
    },
    Rejected {
        reason: Rejection,
    },
    /// `None` when the session ended in an overflow.
    GameEnded {
        result: Option<RewardResult>,
    },
}
