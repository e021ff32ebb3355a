use anyhow::{Context, Result};
use kitchen_game::{ActiveBoosters, Attribute, Difficulty, RecipeBook, encode_friendly, parse_share_code};

use super::{STARTER_RECIPE, TestScenario, clean_protocol_expectation, finished_expectation};
use crate::logic::game_tester::SimulationSummary;
use crate::logic::{GameTester, GameplayStrategy, SimulationPlan};

pub fn share_code_scenario(tester: &GameTester) -> TestScenario {
    let replayer = tester.clone();
    let base = SimulationPlan::new(STARTER_RECIPE, GameplayStrategy::Careful);
    let plan = base.clone().with_expectation(move |summary: &SimulationSummary| {
        for difficulty in Difficulty::ALL {
            let code = encode_friendly(difficulty, summary.seed);
            let share = parse_share_code(&code)
                .with_context(|| format!("share code {code} did not parse"))?;
            anyhow::ensure!(
                share.difficulty == difficulty,
                "share code {code} lost its difficulty"
            );
            anyhow::ensure!(
                encode_friendly(share.difficulty, share.seed) == code,
                "share code {code} is not stable"
            );
            let first = replayer.run_plan(&base, share.seed);
            let second = replayer.run_plan(&base, share.seed);
            anyhow::ensure!(
                first.event_digest == second.event_digest,
                "replay of {code} diverged"
            );
        }
        Ok(())
    });
    TestScenario::simulation("Share Code Replay Consistency", plan)
}

pub fn deterministic_scenario(tester: &GameTester) -> TestScenario {
    let replayer = tester.clone();
    let base = SimulationPlan::new(STARTER_RECIPE, GameplayStrategy::Random);
    let plan = base
        .clone()
        .with_expectation(clean_protocol_expectation)
        .with_expectation(move |summary: &SimulationSummary| {
            let replay = replayer.run_plan(&base, summary.seed);
            anyhow::ensure!(
                replay.event_digest == summary.event_digest,
                "event stream differs on replay"
            );
            anyhow::ensure!(
                replay.rng_draws == summary.rng_draws,
                "rng draw count differs on replay ({} vs {})",
                replay.rng_draws,
                summary.rng_draws
            );
            anyhow::ensure!(replay.coins == summary.coins, "coins differ on replay");
            Ok(())
        });
    TestScenario::simulation("Deterministic Round Replay", plan)
}

fn jackpot_expectation(summary: &SimulationSummary) -> Result<()> {
    clean_protocol_expectation(summary)?;
    anyhow::ensure!(
        summary.jackpots >= 1,
        "A one-roll jackpot window should trigger at least once"
    );
    Ok(())
}

pub fn jackpot_scenario() -> TestScenario {
    TestScenario::simulation(
        "Jackpot Effect Resolution",
        SimulationPlan::new(STARTER_RECIPE, GameplayStrategy::Greedy)
            .with_jackpot_window(1, 1)
            .with_expectation(jackpot_expectation),
    )
}

fn serve_early_expectation(summary: &SimulationSummary) -> Result<()> {
    clean_protocol_expectation(summary)?;
    if summary.served_early {
        anyhow::ensure!(
            summary.turns_used >= 1,
            "Serving early requires at least one completed turn"
        );
        anyhow::ensure!(
            summary.grade().is_some(),
            "An early serve should still be graded"
        );
    }
    Ok(())
}

pub fn serve_early_scenario() -> TestScenario {
    TestScenario::simulation(
        "Serve Early Gating",
        SimulationPlan::new(STARTER_RECIPE, GameplayStrategy::Careful)
            .with_expectation(serve_early_expectation),
    )
}

pub fn booster_loadout_scenario(tester: &GameTester) -> TestScenario {
    let boosters = ActiveBoosters {
        extra_turns: 1,
        double_coins: true,
        double_xp: true,
        shield: Some(Attribute::Taste),
    };
    let turn_budget = tester
        .assets()
        .content
        .recipe(STARTER_RECIPE)
        .map_or(0, |recipe| recipe.total_turns)
        + boosters.extra_turns;
    TestScenario::simulation(
        "Booster Loadout Rewards",
        SimulationPlan::new(STARTER_RECIPE, GameplayStrategy::Careful)
            .with_boosters(boosters)
            .with_expectation(clean_protocol_expectation)
            .with_expectation(move |summary: &SimulationSummary| {
                anyhow::ensure!(
                    summary.turns_used <= turn_budget,
                    "Used {} turns with a budget of {turn_budget}",
                    summary.turns_used
                );
                if summary.is_success() {
                    anyhow::ensure!(
                        u64::from(summary.coins) == u64::from(summary.final_reward()) * 2,
                        "Double coins paid {} for a {} reward",
                        summary.coins,
                        summary.final_reward()
                    );
                }
                Ok(())
            }),
    )
}

fn locked_expectation(summary: &SimulationSummary) -> Result<()> {
    let err = summary
        .start_error
        .as_deref()
        .context("Locked recipe should not start")?;
    anyhow::ensure!(
        err.contains("unlocks at level"),
        "Unexpected start error: {err}"
    );
    anyhow::ensure!(!summary.game_ended(), "Locked recipe produced an outcome");
    Ok(())
}

pub fn locked_recipe_scenario() -> TestScenario {
    TestScenario::simulation(
        "Locked Recipe Refusal",
        SimulationPlan::new("astral_souffle", GameplayStrategy::Careful)
            .with_level(1)
            .with_expectation(locked_expectation),
    )
}

pub fn elite_kitchen_scenario(tester: &GameTester) -> TestScenario {
    let content = &tester.assets().content;
    let book = RecipeBook::new(&content.recipes);
    let (recipe_id, level) = book
        .unlocked(u32::MAX)
        .last()
        .map_or((STARTER_RECIPE.to_string(), 1), |recipe| {
            (recipe.id.clone(), recipe.unlock_level)
        });
    TestScenario::simulation(
        "Elite Recipe Playthrough",
        SimulationPlan::new(recipe_id, GameplayStrategy::Careful)
            .with_level(level)
            .with_expectation(finished_expectation),
    )
}
