//! The cooking round state machine.
//!
//! A [`CookingSession`] owns the meters and every turn modifier for one
//! order. Callers drive it with commands (`select_ingredient`,
//! `choose_jackpot_effect`, ...) and with [`CookingSession::advance`], which
//! runs fire boost ticks and deferred rolls. Every command returns `false`
//! and queues a [`SessionEvent::Rejected`] when it is not valid in the
//! current phase.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::boosters::ActiveBoosters;
use crate::config::{ConfigError, CookingConfig};
use crate::constants::{LOG_TARGET_SESSION, SLOT_COUNT};
use crate::data::{Attribute, ContentData, ContentError, Deltas, IngredientRoll, RecipeSpec};
use crate::events::{Rejection, SessionEvent};
use crate::fire_boost::{BoostPhase, FireBoostModule};
use crate::jackpot::{JackpotEffect, JackpotModule};
use crate::meter::Meters;
use crate::numbers::scale_u32;
use crate::progress::ProgressTracker;
use crate::reward::{RewardResult, calculate_reward};
use crate::rng::KitchenRng;
use crate::scheduler::Scheduler;
use crate::shield::ShieldModule;
use crate::wallet::CoinSink;

/// Where the session sits in its turn loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    /// A roll is pending (immediately or after the roll delay).
    RollingIngredients,
    AwaitingSelection,
    AwaitingJackpotChoice,
    AwaitingShieldTarget,
    ApplyingEffect,
    CheckingOverflow,
    Complete,
}

impl SessionPhase {
    #[must_use]
    pub const fn is_running(self) -> bool {
        !matches!(self, Self::Idle | Self::Complete)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCause {
    /// A meter passed its target maximum with no shield to catch it.
    Overflow(Attribute),
    /// The dish was served with no meter in range.
    NoMetersInRange,
}

/// How a finished session ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOutcome {
    Served(RewardResult),
    Failed {
        cause: FailureCause,
        result: Option<RewardResult>,
    },
}

impl SessionOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Served(_))
    }

    #[must_use]
    pub const fn reward(&self) -> Option<&RewardResult> {
        match self {
            Self::Served(result) => Some(result),
            Self::Failed { result, .. } => result.as_ref(),
        }
    }
}

/// Content or tuning that cannot back a session.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Tuning(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session cannot start: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("{recipe} unlocks at level {required}; player is level {level}")]
    Locked {
        recipe: String,
        required: u32,
        level: u32,
    },
    #[error("a cooking session is already running")]
    InProgress,
}

impl From<ContentError> for SessionError {
    fn from(err: ContentError) -> Self {
        Self::Configuration(err.into())
    }
}

impl From<ConfigError> for SessionError {
    fn from(err: ConfigError) -> Self {
        Self::Configuration(err.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionTask {
    NextRoll,
}

#[derive(Debug)]
pub struct CookingSession<P, C> {
    config: CookingConfig,
    content: ContentData,
    progress: P,
    coins: C,
    rng: KitchenRng,
    phase: SessionPhase,
    recipe: Option<RecipeSpec>,
    boosters: ActiveBoosters,
    meters: Meters,
    shield: ShieldModule,
    fire_boost: FireBoostModule,
    jackpot: JackpotModule,
    scheduler: Scheduler<SessionTask>,
    rolls: SmallVec<[IngredientRoll; SLOT_COUNT]>,
    turns_used: u32,
    turns_remaining: u32,
    served_early: bool,
    outcome: Option<SessionOutcome>,
    events: Vec<SessionEvent>,
}

impl<P: ProgressTracker, C: CoinSink> CookingSession<P, C> {
    #[must_use]
    pub fn new(config: CookingConfig, content: ContentData, seed: u64, progress: P, coins: C) -> Self {
        let meters = Meters::new(config.meter_max);
        let fire_boost = FireBoostModule::new(config.fire_boost.clone());
        let jackpot = JackpotModule::new(config.jackpot.clone());
        Self {
            config,
            content,
            progress,
            coins,
            rng: KitchenRng::from_user_seed(seed),
            phase: SessionPhase::Idle,
            recipe: None,
            boosters: ActiveBoosters::none(),
            meters,
            shield: ShieldModule::default(),
            fire_boost,
            jackpot,
            scheduler: Scheduler::new(),
            rolls: SmallVec::new(),
            turns_used: 0,
            turns_remaining: 0,
            served_early: false,
            outcome: None,
            events: Vec::new(),
        }
    }

    /// Begin cooking `recipe` and present the first roll.
    ///
    /// # Errors
    ///
    /// Fails when a session is already running, the recipe is locked for the
    /// player's level, or the content or tuning does not validate.
    pub fn start_cooking(
        &mut self,
        recipe: &RecipeSpec,
        boosters: ActiveBoosters,
    ) -> Result<(), SessionError> {
        if self.phase.is_running() {
            return Err(SessionError::InProgress);
        }
        self.config.validate()?;
        self.content.validate_ingredients()?;
        recipe.validate(self.config.meter_max)?;
        let level = self.progress.level();
        if recipe.unlock_level > level {
            return Err(SessionError::Locked {
                recipe: recipe.id.clone(),
                required: recipe.unlock_level,
                level,
            });
        }

        self.scheduler.reset();
        self.recipe = Some(recipe.clone());
        self.boosters = boosters;
        self.meters = Meters::new(self.config.meter_max);
        self.meters.initialize_for(recipe);
        self.turns_remaining = recipe.total_turns.saturating_add(boosters.extra_turns);
        self.turns_used = 0;
        self.served_early = false;
        self.outcome = None;
        self.rolls.clear();
        self.jackpot.reset(&mut self.rng);
        self.shield.reset();
        self.fire_boost.reset();

        log::info!(
            target: LOG_TARGET_SESSION,
            "start cooking {} ({} turns, seed {})",
            recipe.id,
            self.turns_remaining,
            self.rng.seed()
        );
        self.emit_meters();
        if let Some(attribute) = boosters.shield {
            self.shield.arm(attribute);
            self.events.push(SessionEvent::ShieldArmed { attribute });
        }
        self.events.push(SessionEvent::TurnAdvanced {
            turns_used: 0,
            turns_remaining: self.turns_remaining,
        });
        self.roll_ingredients();
        Ok(())
    }

    /// Start the recipe with the given id from this session's content.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::UnknownRecipe` for a missing id, otherwise the
    /// same errors as [`Self::start_cooking`].
    pub fn start_recipe(&mut self, recipe_id: &str, boosters: ActiveBoosters) -> Result<(), SessionError> {
        let recipe = self
            .content
            .recipe(recipe_id)
            .cloned()
            .ok_or_else(|| ContentError::UnknownRecipe(recipe_id.to_string()))?;
        self.start_cooking(&recipe, boosters)
    }

    /// Commit one of the rolled ingredients as this turn's choice.
    pub fn select_ingredient(&mut self, slot: usize) -> bool {
        if let Err(reason) = self.gate(SessionPhase::AwaitingSelection) {
            return self.reject(reason);
        }
        let Some(roll) = self.rolls.get(slot) else {
            return self.reject(Rejection::InvalidSlot);
        };
        let base = roll.deltas;
        log::debug!(target: LOG_TARGET_SESSION, "selected slot {slot} ({})", roll.spec_id);

        self.stop_fire_boost();
        self.phase = SessionPhase::ApplyingEffect;
        let multiplier = self.jackpot.take_wild_multiplier();
        self.apply_deltas(base * multiplier);
        self.turns_used = self.turns_used.saturating_add(1);
        self.finish_turn();
        true
    }

    /// Open the fire boost duration picker.
    pub fn activate_fire_boost(&mut self) -> bool {
        if let Err(reason) = self.gate(SessionPhase::AwaitingSelection) {
            return self.reject(reason);
        }
        if !self.fire_boost.request_activate() {
            return self.reject(Rejection::BoostUnavailable);
        }
        true
    }

    pub fn confirm_duration(&mut self, duration: f32) -> bool {
        if let Err(reason) = self.gate(SessionPhase::AwaitingSelection) {
            return self.reject(reason);
        }
        if self.fire_boost.phase() != BoostPhase::SelectingDuration {
            return self.reject(Rejection::BoostUnavailable);
        }
        if !self.fire_boost.confirm_duration(duration) {
            return self.reject(Rejection::InvalidDuration);
        }
        self.events.push(SessionEvent::FireBoostStarted {
            duration: self.fire_boost.total_duration(),
        });
        true
    }

    /// Close the duration picker; the boost stays available this turn.
    pub fn cancel_fire_boost(&mut self) -> bool {
        if let Err(reason) = self.gate(SessionPhase::AwaitingSelection) {
            return self.reject(reason);
        }
        if !self.fire_boost.cancel_selection() {
            return self.reject(Rejection::BoostUnavailable);
        }
        true
    }

    /// Resolve a pending jackpot.
    pub fn choose_jackpot_effect(&mut self, effect: JackpotEffect) -> bool {
        if let Err(reason) = self.gate(SessionPhase::AwaitingJackpotChoice) {
            return self.reject(reason);
        }
        if !self.jackpot.select_effect(effect) {
            return self.reject(Rejection::WrongPhase);
        }
        log::debug!(target: LOG_TARGET_SESSION, "jackpot effect {effect}");
        self.events.push(SessionEvent::JackpotEffectApplied { effect });
        match effect {
            JackpotEffect::MeterBoost => {
                self.phase = SessionPhase::ApplyingEffect;
                self.apply_deltas(Deltas::uniform(self.jackpot.meter_boost()));
                if self.resolve_overflow() {
                    self.phase = SessionPhase::AwaitingSelection;
                }
            }
            JackpotEffect::WildMultiplier => {
                self.phase = SessionPhase::AwaitingSelection;
            }
            JackpotEffect::ZoneShield => {
                self.phase = SessionPhase::AwaitingShieldTarget;
                self.events.push(SessionEvent::ShieldSelectionRequired);
            }
            JackpotEffect::TripleApply => {
                self.phase = SessionPhase::ApplyingEffect;
                let total = self
                    .rolls
                    .iter()
                    .fold(Deltas::default(), |sum, roll| sum + roll.deltas);
                self.apply_deltas(total);
                self.turns_used = self.turns_used.saturating_add(1);
                self.finish_turn();
            }
        }
        true
    }

    /// Pick the attribute a ZoneShield jackpot protects.
    pub fn choose_shield_attribute(&mut self, attribute: Attribute) -> bool {
        if let Err(reason) = self.gate(SessionPhase::AwaitingShieldTarget) {
            return self.reject(reason);
        }
        self.shield.arm(attribute);
        self.events.push(SessionEvent::ShieldArmed { attribute });
        self.phase = SessionPhase::AwaitingSelection;
        true
    }

    /// End the order now and collect the reward for the current meters.
    pub fn serve_early(&mut self) -> bool {
        if self.phase == SessionPhase::Complete {
            return self.reject(Rejection::GameOver);
        }
        if !self.phase.is_running() {
            return self.reject(Rejection::WrongPhase);
        }
        if self.turns_used == 0 {
            return self.reject(Rejection::NothingServed);
        }
        log::info!(
            target: LOG_TARGET_SESSION,
            "served early with {} turns left",
            self.turns_remaining
        );
        self.served_early = true;
        self.stop_fire_boost();
        self.scheduler.cancel_all();
        self.complete_order();
        true
    }

    /// Move session time forward: fire boost ticks first, then due rolls.
    pub fn advance(&mut self, dt: f32) {
        if !self.phase.is_running() {
            return;
        }
        if let Some(tick) = self.fire_boost.tick(dt) {
            self.apply_deltas(tick.deltas);
            self.events.push(SessionEvent::FireBoostTick {
                remaining: tick.remaining,
            });
            if tick.ended {
                self.events.push(SessionEvent::FireBoostEnded { cancelled: false });
            }
        }
        for task in self.scheduler.advance(dt) {
            match task {
                SessionTask::NextRoll if self.phase == SessionPhase::RollingIngredients => {
                    self.roll_ingredients();
                }
                SessionTask::NextRoll => {}
            }
        }
    }

    /// Reward the dish would earn if served right now.
    #[must_use]
    pub fn potential_reward(&self) -> Option<RewardResult> {
        if self.phase == SessionPhase::Idle {
            return None;
        }
        let recipe = self.recipe.as_ref()?;
        Some(calculate_reward(
            recipe,
            &self.meters,
            self.turns_remaining,
            &self.config.reward,
        ))
    }

    /// Take every event queued since the last drain.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub const fn meters(&self) -> &Meters {
        &self.meters
    }

    #[must_use]
    pub fn rolls(&self) -> &[IngredientRoll] {
        &self.rolls
    }

    #[must_use]
    pub const fn recipe(&self) -> Option<&RecipeSpec> {
        self.recipe.as_ref()
    }

    #[must_use]
    pub const fn turns_used(&self) -> u32 {
        self.turns_used
    }

    #[must_use]
    pub const fn turns_remaining(&self) -> u32 {
        self.turns_remaining
    }

    #[must_use]
    pub fn can_serve_early(&self) -> bool {
        self.turns_used >= 1 && self.phase.is_running()
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.phase == SessionPhase::Complete
    }

    #[must_use]
    pub const fn served_early(&self) -> bool {
        self.served_early
    }

    #[must_use]
    pub const fn outcome(&self) -> Option<&SessionOutcome> {
        self.outcome.as_ref()
    }

    #[must_use]
    pub const fn shield(&self) -> &ShieldModule {
        &self.shield
    }

    #[must_use]
    pub const fn fire_boost(&self) -> &FireBoostModule {
        &self.fire_boost
    }

    #[must_use]
    pub const fn jackpot(&self) -> &JackpotModule {
        &self.jackpot
    }

    #[must_use]
    pub const fn boosters(&self) -> &ActiveBoosters {
        &self.boosters
    }

    #[must_use]
    pub const fn config(&self) -> &CookingConfig {
        &self.config
    }

    #[must_use]
    pub const fn content(&self) -> &ContentData {
        &self.content
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Total RNG draws so far, useful for replay diagnostics.
    #[must_use]
    pub const fn rng_draws(&self) -> u64 {
        self.rng.draws()
    }

    #[must_use]
    pub const fn progress(&self) -> &P {
        &self.progress
    }

    #[must_use]
    pub const fn coins(&self) -> &C {
        &self.coins
    }

    /// Hand the collaborators back to the caller.
    pub fn into_parts(self) -> (P, C) {
        (self.progress, self.coins)
    }

    fn gate(&self, expected: SessionPhase) -> Result<(), Rejection> {
        if self.phase == SessionPhase::Complete {
            Err(Rejection::GameOver)
        } else if self.phase == expected {
            Ok(())
        } else {
            Err(Rejection::WrongPhase)
        }
    }

    fn reject(&mut self, reason: Rejection) -> bool {
        log::debug!(target: LOG_TARGET_SESSION, "rejected in {:?}: {reason}", self.phase);
        self.events.push(SessionEvent::Rejected { reason });
        false
    }

    fn emit_meters(&mut self) {
        for attribute in Attribute::ALL {
            let meter = self.meters.get(attribute);
            self.events.push(SessionEvent::MeterChanged {
                attribute,
                value: meter.current(),
                in_range: meter.in_range(),
            });
        }
    }

    fn apply_deltas(&mut self, deltas: Deltas) {
        self.meters.apply(deltas);
        self.emit_meters();
    }

    fn stop_fire_boost(&mut self) {
        if self.fire_boost.disable() {
            self.events.push(SessionEvent::FireBoostEnded { cancelled: true });
        }
    }

    fn roll_ingredients(&mut self) {
        self.phase = SessionPhase::RollingIngredients;
        self.rolls.clear();
        let count = self.content.ingredients.len();
        for _ in 0..SLOT_COUNT {
            let index = self.rng.pick_index(count);
            if let Some(spec) = self.content.ingredients.get(index) {
                self.rolls.push(spec.roll(self.rng.ingredients()));
            }
        }
        self.fire_boost.reset_for_new_turn();
        self.events.push(SessionEvent::RollsPresented {
            rolls: self.rolls.to_vec(),
        });

        if self.jackpot.check_for_jackpot(&self.rolls, &mut self.rng) {
            self.progress.record_jackpot();
            self.events.push(SessionEvent::JackpotTriggered {
                roll: self.jackpot.roll_counter(),
            });
            self.phase = SessionPhase::AwaitingJackpotChoice;
        } else {
            self.phase = SessionPhase::AwaitingSelection;
        }
    }

    /// Check meters in attribute order. Returns false when the session ended.
    fn resolve_overflow(&mut self) -> bool {
        self.phase = SessionPhase::CheckingOverflow;
        for attribute in Attribute::ALL {
            if !self.meters.get(attribute).is_overflow() {
                continue;
            }
            if self.shield.try_block(attribute) {
                let pinned = self.meters.get(attribute).target_max();
                self.meters.get_mut(attribute).set_value(pinned);
                log::debug!(target: LOG_TARGET_SESSION, "shield caught {attribute} overflow");
                self.events.push(SessionEvent::ShieldUsed { attribute });
                self.emit_meters();
            } else {
                self.fail_overflow(attribute);
                return false;
            }
        }
        true
    }

    fn finish_turn(&mut self) {
        if !self.resolve_overflow() {
            return;
        }
        self.turns_remaining = self.turns_remaining.saturating_sub(1);
        self.events.push(SessionEvent::TurnAdvanced {
            turns_used: self.turns_used,
            turns_remaining: self.turns_remaining,
        });
        if self.turns_remaining == 0 {
            self.complete_order();
            return;
        }
        self.phase = SessionPhase::RollingIngredients;
        if self.config.roll_delay_secs > 0.0 {
            self.scheduler
                .schedule(self.config.roll_delay_secs, SessionTask::NextRoll);
        } else {
            self.roll_ingredients();
        }
    }

    fn end_session(&mut self) {
        self.phase = SessionPhase::Complete;
        self.stop_fire_boost();
        self.scheduler.cancel_all();
    }

    fn fail_overflow(&mut self, attribute: Attribute) {
        self.end_session();
        log::info!(target: LOG_TARGET_SESSION, "{attribute} overflowed; order failed");
        self.progress.record_order_failed();
        self.outcome = Some(SessionOutcome::Failed {
            cause: FailureCause::Overflow(attribute),
            result: None,
        });
        self.events.push(SessionEvent::GameEnded { result: None });
    }

    fn complete_order(&mut self) {
        self.end_session();
        let Some(recipe) = self.recipe.as_ref() else {
            return;
        };
        let result = calculate_reward(
            recipe,
            &self.meters,
            self.turns_remaining,
            &self.config.reward,
        );
        log::info!(
            target: LOG_TARGET_SESSION,
            "{} served: {} for {} coins",
            recipe.id,
            result.grade,
            result.final_reward
        );
        if result.grade.is_success() {
            let payout = scale_u32(result.final_reward, self.boosters.coin_multiplier());
            self.coins.add_coins(payout);
            self.progress.record_order_complete(
                result.grade,
                result.final_reward,
                self.boosters.xp_multiplier(),
            );
            self.outcome = Some(SessionOutcome::Served(result.clone()));
        } else {
            self.progress.record_order_failed();
            self.outcome = Some(SessionOutcome::Failed {
                cause: FailureCause::NoMetersInRange,
                result: Some(result.clone()),
            });
        }
        self.events.push(SessionEvent::GameEnded {
            result: Some(result),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Difficulty, IngredientSpec, Rarity, TargetRange};
    use crate::progress::Progression;
    use crate::reward::Grade;
    use crate::wallet::Wallet;

    fn fixed(id: &str, taste: f32, stability: f32, magic: f32) -> IngredientSpec {
        IngredientSpec {
            id: id.to_string(),
            name: id.to_string(),
            rarity: Rarity::Common,
            taste: TargetRange::new(taste, taste),
            stability: TargetRange::new(stability, stability),
            magic: TargetRange::new(magic, magic),
        }
    }

    fn dish(turns: u32) -> RecipeSpec {
        RecipeSpec {
            id: "test_stew".to_string(),
            name: "Test Stew".to_string(),
            taste: TargetRange::new(20.0, 40.0),
            stability: TargetRange::new(20.0, 40.0),
            magic: TargetRange::new(20.0, 40.0),
            total_turns: turns,
            base_reward: 100,
            unlock_level: 1,
            difficulty: Difficulty::Easy,
        }
    }

    fn config(min_rolls: u32, max_rolls: u32) -> CookingConfig {
        let mut cfg = CookingConfig::default();
        cfg.roll_delay_secs = 0.0;
        cfg.jackpot.min_rolls = min_rolls;
        cfg.jackpot.max_rolls = max_rolls;
        cfg.jackpot.meter_boost = 0.0;
        cfg
    }

    /// Single-spec pools roll natural jackpots every turn; a zero meter
    /// boost resolves them without touching the meters.
    fn settle(s: &mut TestSession) {
        if s.phase() == SessionPhase::AwaitingJackpotChoice {
            assert!(s.choose_jackpot_effect(JackpotEffect::MeterBoost));
        }
    }

    fn start(s: &mut TestSession, recipe: &RecipeSpec, boosters: ActiveBoosters) {
        s.start_cooking(recipe, boosters).unwrap();
        settle(s);
    }

    fn select(s: &mut TestSession, slot: usize) -> bool {
        let accepted = s.select_ingredient(slot);
        settle(s);
        accepted
    }

    type TestSession = CookingSession<Progression, Wallet>;

    fn session(ingredients: Vec<IngredientSpec>, cfg: CookingConfig) -> TestSession {
        let content = ContentData::new(vec![dish(3)], ingredients);
        CookingSession::new(cfg, content, 42, Progression::default(), Wallet::default())
    }

    fn rejected(events: &[SessionEvent], reason: Rejection) -> bool {
        events
            .iter()
            .any(|e| matches!(e, SessionEvent::Rejected { reason: r } if *r == reason))
    }

    #[test]
    fn commands_before_start_are_rejected() {
        let mut s = session(vec![fixed("a", 10.0, 10.0, 10.0)], config(50, 50));
        assert_eq!(s.phase(), SessionPhase::Idle);
        assert!(!s.select_ingredient(0));
        assert!(!s.serve_early());
        assert!(s.potential_reward().is_none());
        assert!(rejected(&s.drain_events(), Rejection::WrongPhase));
    }

    #[test]
    fn three_turns_complete_with_reward() {
        let mut s = session(vec![fixed("a", 10.0, 10.0, 10.0)], config(50, 50));
        start(&mut s, &dish(3), ActiveBoosters::none());
        assert_eq!(s.phase(), SessionPhase::AwaitingSelection);
        assert_eq!(s.rolls().len(), SLOT_COUNT);
        for _ in 0..3 {
            assert!(select(&mut s, 1));
        }
        assert!(s.is_game_over());
        let outcome = s.outcome().unwrap();
        assert!(outcome.is_success());
        let reward = outcome.reward().unwrap();
        assert_eq!(reward.grade, Grade::Perfect);
        assert_eq!(reward.final_reward, 100);
        let (progress, wallet) = s.into_parts();
        assert_eq!(wallet.coins, 100);
        assert_eq!(progress.data().orders_completed, 1);
    }

    #[test]
    fn unblocked_overflow_ends_the_game() {
        let mut s = session(vec![fixed("hot", 45.0, 0.0, 0.0)], config(50, 50));
        start(&mut s, &dish(3), ActiveBoosters::none());
        assert!(s.select_ingredient(0));
        assert!(s.is_game_over());
        assert_eq!(
            s.outcome(),
            Some(&SessionOutcome::Failed {
                cause: FailureCause::Overflow(Attribute::Taste),
                result: None,
            })
        );
        let events = s.drain_events();
        assert!(events.contains(&SessionEvent::GameEnded { result: None }));
        assert!(!s.select_ingredient(0));
        assert!(rejected(&s.drain_events(), Rejection::GameOver));
        assert_eq!(s.progress().data().orders_failed, 1);
    }

    #[test]
    fn shield_booster_blocks_one_overflow() {
        let mut s = session(vec![fixed("hot", 45.0, 0.0, 0.0)], config(50, 50));
        let boosters = ActiveBoosters {
            shield: Some(Attribute::Taste),
            ..ActiveBoosters::none()
        };
        start(&mut s, &dish(3), boosters);
        assert!(select(&mut s, 0));
        assert!(!s.is_game_over());
        assert!((s.meters().get(Attribute::Taste).current() - 40.0).abs() < f32::EPSILON);
        assert!(!s.shield().is_active());
        assert!(s.select_ingredient(0));
        assert!(s.is_game_over());
    }

    #[test]
    fn serve_early_needs_a_used_turn() {
        let mut s = session(vec![fixed("a", 25.0, 25.0, 25.0)], config(50, 50));
        start(&mut s, &dish(3), ActiveBoosters::none());
        assert!(!s.can_serve_early());
        assert!(!s.serve_early());
        assert!(rejected(&s.drain_events(), Rejection::NothingServed));
        assert!(select(&mut s, 2));
        assert!(s.can_serve_early());
        assert!(s.serve_early());
        assert!(s.served_early());
        let reward = s.outcome().unwrap().reward().unwrap().clone();
        assert_eq!(reward.turns_remaining, 2);
        assert_eq!(reward.final_reward, 110);
    }

    #[test]
    fn guaranteed_jackpot_blocks_selection_until_resolved() {
        let mut cfg = config(1, 1);
        cfg.jackpot.meter_boost = 10.0;
        let mut s = session(
            vec![fixed("a", 1.0, 1.0, 1.0), fixed("b", 1.0, 1.0, 1.0)],
            cfg,
        );
        s.start_cooking(&dish(3), ActiveBoosters::none()).unwrap();
        assert_eq!(s.phase(), SessionPhase::AwaitingJackpotChoice);
        assert!(!s.select_ingredient(0));
        assert!(!s.activate_fire_boost());
        assert!(s.choose_jackpot_effect(JackpotEffect::MeterBoost));
        assert_eq!(s.phase(), SessionPhase::AwaitingSelection);
        assert!((s.meters().get(Attribute::Magic).current() - 10.0).abs() < f32::EPSILON);
        assert_eq!(s.turns_used(), 0, "meter boost does not spend a turn");
        assert_eq!(s.progress().data().jackpots_triggered, 1);
    }

    #[test]
    fn meter_boost_overflow_fails_without_spending_a_turn() {
        let mut cfg = config(1, 1);
        cfg.jackpot.meter_boost = 45.0;
        let mut s = session(vec![fixed("a", 1.0, 1.0, 1.0)], cfg);
        s.start_cooking(&dish(3), ActiveBoosters::none()).unwrap();
        s.drain_events();
        assert!(s.choose_jackpot_effect(JackpotEffect::MeterBoost));
        assert!(s.is_game_over());
        assert_eq!(s.turns_used(), 0);
        assert_eq!(
            s.outcome(),
            Some(&SessionOutcome::Failed {
                cause: FailureCause::Overflow(Attribute::Taste),
                result: None,
            })
        );
        assert!(s.drain_events().contains(&SessionEvent::GameEnded { result: None }));
        assert_eq!(s.coins().coins, 0);
    }

    #[test]
    fn shielded_meter_boost_overflow_pins_and_continues() {
        let mut cfg = config(1, 1);
        cfg.jackpot.meter_boost = 45.0;
        let mut s = session(vec![fixed("a", 1.0, 1.0, 1.0)], cfg);
        let mut recipe = dish(3);
        recipe.stability = TargetRange::new(20.0, 80.0);
        recipe.magic = TargetRange::new(20.0, 80.0);
        let boosters = ActiveBoosters {
            shield: Some(Attribute::Taste),
            ..ActiveBoosters::none()
        };
        s.start_cooking(&recipe, boosters).unwrap();
        assert!(s.choose_jackpot_effect(JackpotEffect::MeterBoost));
        assert!(!s.is_game_over());
        assert_eq!(s.phase(), SessionPhase::AwaitingSelection);
        assert_eq!(s.turns_used(), 0);
        let values = s.meters().values();
        assert!((values.taste - 40.0).abs() < f32::EPSILON, "pinned at target max");
        assert!((values.stability - 45.0).abs() < f32::EPSILON);
        assert!(!s.shield().is_active());
        assert!(
            s.drain_events()
                .contains(&SessionEvent::ShieldUsed { attribute: Attribute::Taste })
        );
    }

    #[test]
    fn zone_shield_asks_for_attribute() {
        let mut s = session(vec![fixed("a", 45.0, 1.0, 1.0)], config(1, 1));
        s.start_cooking(&dish(3), ActiveBoosters::none()).unwrap();
        assert!(s.choose_jackpot_effect(JackpotEffect::ZoneShield));
        assert_eq!(s.phase(), SessionPhase::AwaitingShieldTarget);
        assert!(!s.select_ingredient(0));
        assert!(s.choose_shield_attribute(Attribute::Taste));
        assert_eq!(s.shield().protected(), Some(Attribute::Taste));
        assert!(s.select_ingredient(0));
        assert!(!s.is_game_over(), "shield absorbed the taste overflow");
    }

    #[test]
    fn wild_multiplier_doubles_next_selection() {
        let mut s = session(vec![fixed("a", 5.0, 6.0, 7.0)], config(1, 1));
        s.start_cooking(&dish(3), ActiveBoosters::none()).unwrap();
        assert!(s.choose_jackpot_effect(JackpotEffect::WildMultiplier));
        assert!(s.select_ingredient(0));
        let values = s.meters().values();
        assert!((values.taste - 10.0).abs() < f32::EPSILON);
        assert!((values.magic - 14.0).abs() < f32::EPSILON);
    }

    #[test]
    fn triple_apply_sums_rolls_once() {
        let mut s = session(vec![fixed("a", 4.0, 5.0, 6.0)], config(1, 1));
        s.start_cooking(&dish(3), ActiveBoosters::none()).unwrap();
        assert!(s.choose_jackpot_effect(JackpotEffect::TripleApply));
        let values = s.meters().values();
        assert!((values.taste - 12.0).abs() < 1e-5);
        assert!((values.stability - 15.0).abs() < 1e-5);
        assert!((values.magic - 18.0).abs() < 1e-5);
        assert_eq!(s.turns_used(), 1);
        assert_eq!(s.turns_remaining(), 2);
    }

    #[test]
    fn fire_boost_ticks_until_selection() {
        let mut s = session(vec![fixed("a", 0.0, 0.0, 0.0)], config(50, 50));
        start(&mut s, &dish(3), ActiveBoosters::none());
        assert!(!s.confirm_duration(2.0));
        assert!(s.activate_fire_boost());
        assert!(!s.activate_fire_boost());
        assert!(!s.confirm_duration(4.0));
        assert!(s.confirm_duration(5.0));
        s.advance(1.0);
        assert!((s.meters().get(Attribute::Taste).current() - 3.0).abs() < 1e-5);
        assert!(s.select_ingredient(0));
        assert!(!s.fire_boost().is_active());
        let before = s.meters().values();
        s.advance(2.0);
        assert_eq!(s.meters().values(), before, "no tick after the boost was cut");
        let events = s.drain_events();
        assert!(events.contains(&SessionEvent::FireBoostEnded { cancelled: true }));
    }

    #[test]
    fn roll_delay_defers_next_roll() {
        let mut cfg = config(50, 50);
        cfg.roll_delay_secs = 1.0;
        let mut s = session(vec![fixed("a", 1.0, 1.0, 1.0)], cfg);
        start(&mut s, &dish(3), ActiveBoosters::none());
        assert!(s.select_ingredient(0));
        assert_eq!(s.phase(), SessionPhase::RollingIngredients);
        assert!(!s.select_ingredient(0));
        s.advance(0.5);
        assert_eq!(s.phase(), SessionPhase::RollingIngredients);
        s.advance(0.5);
        settle(&mut s);
        assert_eq!(s.phase(), SessionPhase::AwaitingSelection);
        assert_eq!(s.turns_remaining(), 2);
    }

    #[test]
    fn serving_early_cancels_pending_roll() {
        let mut cfg = config(50, 50);
        cfg.roll_delay_secs = 1.0;
        let mut s = session(vec![fixed("a", 25.0, 25.0, 25.0)], cfg);
        start(&mut s, &dish(3), ActiveBoosters::none());
        assert!(s.select_ingredient(0));
        assert!(s.serve_early());
        s.drain_events();
        s.advance(5.0);
        assert!(s.drain_events().is_empty(), "cancelled roll never fires");
        assert_eq!(s.phase(), SessionPhase::Complete);
    }

    #[test]
    fn start_refuses_bad_setup() {
        let mut s = session(Vec::new(), config(50, 50));
        assert!(matches!(
            s.start_cooking(&dish(3), ActiveBoosters::none()),
            Err(SessionError::Configuration(ConfigurationError::Content(
                ContentError::NoIngredients
            )))
        ));

        let mut s = session(vec![fixed("a", 1.0, 1.0, 1.0)], config(50, 50));
        let mut locked = dish(3);
        locked.unlock_level = 4;
        assert!(matches!(
            s.start_cooking(&locked, ActiveBoosters::none()),
            Err(SessionError::Locked { required: 4, level: 1, .. })
        ));
        assert!(matches!(
            s.start_recipe("missing", ActiveBoosters::none()),
            Err(SessionError::Configuration(_))
        ));

        s.start_recipe("test_stew", ActiveBoosters::none()).unwrap();
        assert!(matches!(
            s.start_cooking(&dish(3), ActiveBoosters::none()),
            Err(SessionError::InProgress)
        ));
    }

    #[test]
    fn low_grade_counts_as_failure() {
        let mut s = session(vec![fixed("a", 1.0, 1.0, 1.0)], config(50, 50));
        start(&mut s, &dish(1), ActiveBoosters::none());
        assert!(s.select_ingredient(0));
        let outcome = s.outcome().unwrap();
        assert!(!outcome.is_success());
        assert_eq!(outcome.reward().unwrap().grade, Grade::Failed);
        assert_eq!(s.coins().coins, 0);
        assert_eq!(s.progress().data().orders_failed, 1);
    }

    #[test]
    fn double_coins_and_extra_turns_apply() {
        let mut s = session(vec![fixed("a", 25.0, 25.0, 25.0)], config(50, 50));
        let boosters = ActiveBoosters {
            extra_turns: 1,
            double_coins: true,
            ..ActiveBoosters::none()
        };
        start(&mut s, &dish(1), boosters);
        assert_eq!(s.turns_remaining(), 2);
        assert!(s.select_ingredient(0));
        assert!(s.serve_early());
        let reward = s.outcome().unwrap().reward().unwrap().final_reward;
        assert_eq!(reward, 105);
        assert_eq!(s.coins().coins, 210);
    }
}
