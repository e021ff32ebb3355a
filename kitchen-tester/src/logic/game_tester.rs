use anyhow::{Context, Result};
use colored::Colorize;
use kitchen_game::{
    ActiveBoosters, ContentData, CookingConfig, CookingSession, Deltas, Grade, JackpotEffect,
    PlayerProgress, ProgressConfig, Progression, SessionEvent, SessionOutcome, SessionPhase,
    Wallet,
};
use sha2::{Digest, Sha256};
use std::sync::Arc;

use super::policy::{GameplayStrategy, PlayerPolicy, PolicyView};

/// Simulated seconds per `advance` call.
pub const SIM_TICK_SECS: f32 = 0.25;
/// Hard stop for runaway simulations.
pub const MAX_SIM_STEPS: usize = 2_000;

/// Content and tuning shared by every simulated round.
#[derive(Debug, Clone)]
pub struct TesterAssets {
    pub content: ContentData,
    pub config: CookingConfig,
    pub progress: ProgressConfig,
}

impl TesterAssets {
    /// Load the bundled recipe/ingredient tables and default tuning.
    pub fn load_default() -> Result<Self> {
        let content = ContentData::load_bundled().context("loading bundled content")?;
        let config = CookingConfig::default();
        config.validate().context("validating cooking config")?;
        content
            .validate(config.meter_max)
            .context("validating bundled content")?;
        Ok(Self {
            content,
            config,
            progress: ProgressConfig::default(),
        })
    }
}

/// What to play and how.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub recipe_id: String,
    pub strategy: GameplayStrategy,
    pub boosters: ActiveBoosters,
    pub player_level: u32,
    pub roll_delay: Option<f32>,
    pub jackpot_window: Option<(u32, u32)>,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub fn new(recipe_id: impl Into<String>, strategy: GameplayStrategy) -> Self {
        Self {
            recipe_id: recipe_id.into(),
            strategy,
            boosters: ActiveBoosters::none(),
            player_level: 1,
            roll_delay: None,
            jackpot_window: None,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_boosters(mut self, boosters: ActiveBoosters) -> Self {
        self.boosters = boosters;
        self
    }

    #[must_use]
    pub const fn with_level(mut self, level: u32) -> Self {
        self.player_level = level;
        self
    }

    #[must_use]
    pub const fn with_roll_delay(mut self, secs: f32) -> Self {
        self.roll_delay = Some(secs);
        self
    }

    /// Force the guaranteed jackpot interval into `min..=max` rolls.
    #[must_use]
    pub const fn with_jackpot_window(mut self, min: u32, max: u32) -> Self {
        self.jackpot_window = Some((min, max));
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }
}

/// Assertion hook run after a simulation completes.
type SimulationExpectationFn =
    Arc<dyn Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct SimulationExpectation(SimulationExpectationFn);

impl std::fmt::Debug for SimulationExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationExpectation").finish()
    }
}

impl SimulationExpectation {
    pub fn evaluate(&self, summary: &SimulationSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self(Arc::new(f))
    }
}

/// One committed ingredient choice.
#[derive(Debug, Clone)]
pub struct DecisionRecord {
    pub turn: u32,
    pub slot: usize,
    pub ingredient: String,
    pub policy_name: &'static str,
    pub rationale: Option<String>,
}

/// Complete record of a simulation run.
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub seed: u64,
    pub recipe_id: String,
    pub strategy: GameplayStrategy,
    pub start_error: Option<String>,
    pub outcome: Option<SessionOutcome>,
    pub turns_used: u32,
    pub served_early: bool,
    pub jackpots: u32,
    pub effects: Vec<JackpotEffect>,
    pub shields_used: u32,
    pub fire_boosts: u32,
    pub rejections: u32,
    pub event_count: usize,
    pub final_meters: Deltas,
    pub coins: u32,
    pub xp_earned: u32,
    pub rng_draws: u64,
    pub event_digest: String,
    pub steps: usize,
    pub decisions: Vec<DecisionRecord>,
}

impl SimulationSummary {
    fn new(seed: u64, plan: &SimulationPlan) -> Self {
        Self {
            seed,
            recipe_id: plan.recipe_id.clone(),
            strategy: plan.strategy,
            start_error: None,
            outcome: None,
            turns_used: 0,
            served_early: false,
            jackpots: 0,
            effects: Vec::new(),
            shields_used: 0,
            fire_boosts: 0,
            rejections: 0,
            event_count: 0,
            final_meters: Deltas::default(),
            coins: 0,
            xp_earned: 0,
            rng_draws: 0,
            event_digest: String::new(),
            steps: 0,
            decisions: Vec::new(),
        }
    }

    #[must_use]
    pub const fn game_ended(&self) -> bool {
        self.outcome.is_some()
    }

    #[must_use]
    pub fn grade(&self) -> Option<Grade> {
        match self.outcome.as_ref()? {
            SessionOutcome::Served(result) => Some(result.grade),
            SessionOutcome::Failed { result, .. } => result.as_ref().map(|r| r.grade),
        }
    }

    #[must_use]
    pub fn final_reward(&self) -> u32 {
        self.outcome
            .as_ref()
            .and_then(SessionOutcome::reward)
            .map_or(0, |result| result.final_reward)
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome.as_ref().is_some_and(SessionOutcome::is_success)
    }

    /// Short human label for how the round ended.
    #[must_use]
    pub fn ending_label(&self) -> String {
        if let Some(err) = &self.start_error {
            return format!("not started: {err}");
        }
        match &self.outcome {
            None => "unfinished".to_string(),
            Some(SessionOutcome::Served(result)) => format!("served {}", result.grade.label()),
            Some(SessionOutcome::Failed { cause, .. }) => format!("failed {cause:?}"),
        }
    }

    fn record_event(&mut self, event: &SessionEvent) {
        self.event_count += 1;
        match event {
            SessionEvent::JackpotTriggered { .. } => self.jackpots += 1,
            SessionEvent::ShieldUsed { .. } => self.shields_used += 1,
            SessionEvent::FireBoostStarted { .. } => self.fire_boosts += 1,
            SessionEvent::Rejected { .. } => self.rejections += 1,
            _ => {}
        }
    }
}

/// Headless deterministic runner for the cooking engine.
#[derive(Clone)]
pub struct GameTester {
    verbose: bool,
    assets: Arc<TesterAssets>,
}

impl GameTester {
    pub const fn new(assets: Arc<TesterAssets>, verbose: bool) -> Self {
        Self { verbose, assets }
    }

    pub const fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn assets(&self) -> &TesterAssets {
        &self.assets
    }

    pub fn run_plan(&self, plan: &SimulationPlan, seed: u64) -> SimulationSummary {
        let mut config = self.assets.config.clone();
        if let Some(delay) = plan.roll_delay {
            config.roll_delay_secs = delay;
        }
        if let Some((min, max)) = plan.jackpot_window {
            config.jackpot.min_rolls = min;
            config.jackpot.max_rolls = max;
        }
        let progress = PlayerProgress {
            level: plan.player_level,
            ..PlayerProgress::default()
        };
        let progression = Progression::new(self.assets.progress.clone(), progress);
        let mut session = CookingSession::new(
            config,
            self.assets.content.clone(),
            seed,
            progression,
            Wallet::default(),
        );
        let mut summary = SimulationSummary::new(seed, plan);

        if let Err(err) = session.start_recipe(&plan.recipe_id, plan.boosters) {
            log::warn!("seed {seed}: could not start {}: {err}", plan.recipe_id);
            summary.start_error = Some(err.to_string());
            return summary;
        }
        if self.verbose {
            println!(
                "🍳 {} | seed {} | strategy {}",
                plan.recipe_id.bright_white(),
                seed,
                plan.strategy
            );
        }

        let mut policy = plan.strategy.create_policy(seed);
        let mut hasher = Sha256::new();
        for step in 0..MAX_SIM_STEPS {
            for event in session.drain_events() {
                summary.record_event(&event);
                if let Ok(bytes) = serde_json::to_vec(&event) {
                    hasher.update(&bytes);
                }
            }
            summary.steps = step;
            if session.phase() == SessionPhase::Complete {
                break;
            }
            self.step(&mut session, policy.as_mut(), &mut summary);
        }
        for event in session.drain_events() {
            summary.record_event(&event);
            if let Ok(bytes) = serde_json::to_vec(&event) {
                hasher.update(&bytes);
            }
        }

        summary.outcome = session.outcome().cloned();
        summary.turns_used = session.turns_used();
        summary.served_early = session.served_early();
        summary.final_meters = session.meters().values();
        summary.rng_draws = session.rng_draws();
        summary.event_digest = hex(&hasher.finalize());
        let (progression, wallet) = session.into_parts();
        summary.coins = wallet.coins;
        summary.xp_earned = progression.data().total_xp_earned;

        if self.verbose {
            log_summary(&summary);
        }
        summary
    }

    fn step<P, C>(
        &self,
        session: &mut CookingSession<P, C>,
        policy: &mut (dyn PlayerPolicy + Send),
        summary: &mut SimulationSummary,
    ) where
        P: kitchen_game::ProgressTracker,
        C: kitchen_game::CoinSink,
    {
        let potential = session.potential_reward();
        match session.phase() {
            SessionPhase::AwaitingJackpotChoice => {
                let effect = policy.pick_jackpot_effect(&view(session, potential.as_ref()));
                summary.effects.push(effect);
                session.choose_jackpot_effect(effect);
            }
            SessionPhase::AwaitingShieldTarget => {
                let target = policy.pick_shield_target(&view(session, potential.as_ref()));
                session.choose_shield_attribute(target);
            }
            SessionPhase::AwaitingSelection if session.fire_boost().is_active() => {
                session.advance(SIM_TICK_SECS);
            }
            SessionPhase::AwaitingSelection => {
                if session.can_serve_early()
                    && policy.serve_now(&view(session, potential.as_ref()))
                {
                    session.serve_early();
                    return;
                }
                if session.fire_boost().can_activate()
                    && let Some(duration) =
                        policy.fire_boost_duration(&view(session, potential.as_ref()))
                {
                    session.activate_fire_boost();
                    if !session.confirm_duration(duration) {
                        session.cancel_fire_boost();
                    }
                    return;
                }
                let decision = policy.pick_slot(&view(session, potential.as_ref()));
                let ingredient = session
                    .rolls()
                    .get(decision.slot)
                    .map(|roll| roll.name.clone())
                    .unwrap_or_default();
                if self.verbose {
                    println!(
                        "   turn {} -> slot {} ({ingredient})",
                        session.turns_used() + 1,
                        decision.slot
                    );
                }
                summary.decisions.push(DecisionRecord {
                    turn: session.turns_used() + 1,
                    slot: decision.slot,
                    ingredient,
                    policy_name: policy.name(),
                    rationale: decision.rationale,
                });
                session.select_ingredient(decision.slot);
            }
            _ => session.advance(SIM_TICK_SECS),
        }
    }
}

fn view<'a, P, C>(
    session: &'a CookingSession<P, C>,
    potential: Option<&'a kitchen_game::RewardResult>,
) -> PolicyView<'a>
where
    P: kitchen_game::ProgressTracker,
    C: kitchen_game::CoinSink,
{
    PolicyView {
        meters: session.meters(),
        rolls: session.rolls(),
        turns_remaining: session.turns_remaining(),
        potential,
        fire_boost: session.fire_boost(),
    }
}

fn hex(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

fn log_summary(summary: &SimulationSummary) {
    let ending = summary.ending_label();
    let ending = if summary.is_success() {
        ending.green()
    } else {
        ending.red()
    };
    println!(
        "   {} | turns {} | coins {} | jackpots {} | meters {:.1}/{:.1}/{:.1}",
        ending,
        summary.turns_used,
        summary.coins,
        summary.jackpots,
        summary.final_meters.taste,
        summary.final_meters.stability,
        summary.final_meters.magic
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tester() -> GameTester {
        GameTester::new(Arc::new(TesterAssets::load_default().unwrap()), false)
    }

    #[test]
    fn every_strategy_finishes_the_starter_recipe() {
        let tester = tester();
        for strategy in GameplayStrategy::ALL {
            for seed in 0..5 {
                let plan = SimulationPlan::new("easy_salad", strategy);
                let summary = tester.run_plan(&plan, seed);
                assert!(summary.start_error.is_none());
                assert!(summary.game_ended(), "{strategy} seed {seed} did not finish");
                assert!(summary.steps < MAX_SIM_STEPS);
                assert_eq!(summary.effects.len(), summary.jackpots as usize);
            }
        }
    }

    #[test]
    fn same_seed_gives_same_digest() {
        let tester = tester();
        let plan = SimulationPlan::new("easy_salad", GameplayStrategy::Random);
        let a = tester.run_plan(&plan, 77);
        let b = tester.run_plan(&plan, 77);
        assert_eq!(a.event_digest, b.event_digest);
        assert_eq!(a.rng_draws, b.rng_draws);
        assert_eq!(a.event_digest.len(), 64);
    }

    #[test]
    fn locked_recipe_reports_start_error() {
        let tester = tester();
        let plan = SimulationPlan::new("astral_souffle", GameplayStrategy::Careful);
        let summary = tester.run_plan(&plan, 1);
        assert!(summary.start_error.is_some());
        assert!(!summary.game_ended());
        assert!(summary.ending_label().starts_with("not started"));
    }

    #[test]
    fn coins_match_final_reward_on_success() {
        let tester = tester();
        for seed in 0..10 {
            let plan = SimulationPlan::new("easy_salad", GameplayStrategy::Careful)
                .with_roll_delay(0.0);
            let summary = tester.run_plan(&plan, seed);
            if summary.is_success() {
                assert_eq!(summary.coins, summary.final_reward());
                assert!(summary.xp_earned > 0);
            } else {
                assert_eq!(summary.coins, 0);
            }
        }
    }
}
