//! Centralized balance and tuning constants for the cooking engine.
//!
//! JSON assets carry the tunable values; the constants here are the
//! fallbacks used when an asset omits a field, plus the log targets.

// Logging targets ----------------------------------------------------------
pub(crate) const LOG_TARGET_SESSION: &str = "kitchen::session";
pub(crate) const LOG_TARGET_JACKPOT: &str = "kitchen::jackpot";
pub(crate) const LOG_TARGET_BOOST: &str = "kitchen::fire_boost";
pub(crate) const LOG_TARGET_REWARD: &str = "kitchen::reward";
pub(crate) const LOG_TARGET_PROGRESS: &str = "kitchen::progress";

// Session shape ------------------------------------------------------------
/// Number of ingredient slots rolled each turn.
pub const SLOT_COUNT: usize = 3;
pub(crate) const DEFAULT_ROLL_DELAY_SECS: f32 = 1.0;

// Meter tuning -------------------------------------------------------------
pub(crate) const DEFAULT_METER_MAX: f32 = 100.0;

// Jackpot tuning -----------------------------------------------------------
pub(crate) const DEFAULT_JACKPOT_MIN_ROLLS: u32 = 5;
pub(crate) const DEFAULT_JACKPOT_MAX_ROLLS: u32 = 10;
pub(crate) const DEFAULT_METER_BOOST: f32 = 10.0;
pub(crate) const DEFAULT_WILD_MULTIPLIER: f32 = 2.0;

// Fire boost tuning --------------------------------------------------------
pub(crate) const DEFAULT_BOOST_RATE_PER_SECOND: f32 = 3.0;
pub(crate) const DEFAULT_BOOST_DURATIONS: [f32; 3] = [2.0, 3.0, 5.0];

// Reward tuning ------------------------------------------------------------
pub(crate) const DEFAULT_PERFECT_MULTIPLIER: f32 = 1.0;
pub(crate) const DEFAULT_GOOD_MULTIPLIER: f32 = 0.6;
pub(crate) const DEFAULT_OKAY_MULTIPLIER: f32 = 0.3;
pub(crate) const DEFAULT_FAILED_MULTIPLIER: f32 = 0.1;
pub(crate) const DEFAULT_BONUS_PER_TURN: f32 = 0.05;
pub(crate) const DEFAULT_MAX_TURN_BONUS: f32 = 0.25;

// Progression tuning -------------------------------------------------------
pub(crate) const DEFAULT_BASE_XP_PER_LEVEL: u32 = 100;
pub(crate) const DEFAULT_XP_SCALING_FACTOR: f32 = 1.5;
pub(crate) const DEFAULT_MAX_LEVEL: u32 = 50;
pub(crate) const DEFAULT_XP_PER_ORDER: u32 = 10;
pub(crate) const DEFAULT_XP_BONUS_PERFECT: u32 = 25;
pub(crate) const DEFAULT_XP_BONUS_GOOD: u32 = 15;
pub(crate) const DEFAULT_XP_BONUS_OKAY: u32 = 5;
pub(crate) const DEFAULT_XP_BONUS_STREAK: u32 = 5;

// Booster tuning -----------------------------------------------------------
pub(crate) const DOUBLE_COINS_MULTIPLIER: f32 = 2.0;
pub(crate) const DOUBLE_XP_MULTIPLIER: f32 = 2.0;
