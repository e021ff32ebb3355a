use anyhow::Result;

use crate::logic::game_tester::SimulationSummary;
use crate::logic::{GameTester, GameplayStrategy, SimulationPlan};

pub mod catalog;

/// Recipe every new player can cook.
pub const STARTER_RECIPE: &str = "easy_salad";

// Logic test scenario
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub plan: SimulationPlan,
}

impl TestScenario {
    #[must_use]
    pub fn simulation(name: impl Into<String>, plan: SimulationPlan) -> Self {
        Self {
            name: name.into(),
            plan,
        }
    }
}

pub(crate) fn finished_expectation(summary: &SimulationSummary) -> Result<()> {
    if let Some(err) = &summary.start_error {
        anyhow::bail!("Round failed to start: {err}");
    }
    anyhow::ensure!(summary.game_ended(), "Round should reach an outcome");
    Ok(())
}

pub(crate) fn clean_protocol_expectation(summary: &SimulationSummary) -> Result<()> {
    finished_expectation(summary)?;
    anyhow::ensure!(
        summary.rejections == 0,
        "Scripted player issued {} rejected commands",
        summary.rejections
    );
    anyhow::ensure!(
        summary.effects.len() == summary.jackpots as usize,
        "Every jackpot should be resolved ({} triggered, {} chosen)",
        summary.jackpots,
        summary.effects.len()
    );
    Ok(())
}

fn strategy_scenario(name: &'static str, strategy: GameplayStrategy) -> TestScenario {
    TestScenario::simulation(
        name,
        SimulationPlan::new(STARTER_RECIPE, strategy).with_expectation(clean_protocol_expectation),
    )
}

pub const ALL_SCENARIOS: [&str; 12] = [
    "smoke",
    "careful-strategy",
    "greedy-strategy",
    "booster-strategy",
    "random-strategy",
    "share-code-consistency",
    "deterministic-gameplay",
    "jackpot-effects",
    "serve-early",
    "booster-loadout",
    "locked-recipe",
    "elite-kitchen",
];

pub fn get_scenario(name: &str, tester: &GameTester) -> Option<TestScenario> {
    match name.to_lowercase().as_str() {
        "smoke" => Some(TestScenario::simulation(
            "Smoke Test",
            SimulationPlan::new(STARTER_RECIPE, GameplayStrategy::Careful)
                .with_roll_delay(0.0)
                .with_expectation(clean_protocol_expectation),
        )),
        "careful-strategy" | "careful" => Some(strategy_scenario(
            "Careful Strategy Test",
            GameplayStrategy::Careful,
        )),
        "greedy-strategy" | "greedy" => Some(strategy_scenario(
            "Greedy Strategy Test",
            GameplayStrategy::Greedy,
        )),
        "booster-strategy" | "booster" => Some(strategy_scenario(
            "Fire Boost Strategy Test",
            GameplayStrategy::Booster,
        )),
        "random-strategy" | "random" => Some(strategy_scenario(
            "Random Strategy Test",
            GameplayStrategy::Random,
        )),
        "share-code-consistency" | "share-code" => Some(catalog::share_code_scenario(tester)),
        "deterministic-gameplay" | "deterministic" => Some(catalog::deterministic_scenario(tester)),
        "jackpot-effects" | "jackpot" => Some(catalog::jackpot_scenario()),
        "serve-early" => Some(catalog::serve_early_scenario()),
        "booster-loadout" | "boosters" => Some(catalog::booster_loadout_scenario(tester)),
        "locked-recipe" => Some(catalog::locked_recipe_scenario()),
        "elite-kitchen" | "elite" => Some(catalog::elite_kitchen_scenario(tester)),
        _ => None,
    }
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    vec![
        ("smoke", "Smoke Test"),
        ("careful-strategy", "Careful Strategy Test"),
        ("greedy-strategy", "Greedy Strategy Test"),
        ("booster-strategy", "Fire Boost Strategy Test"),
        ("random-strategy", "Random Strategy Test"),
        ("share-code-consistency", "Share Code Replay Consistency"),
        ("deterministic-gameplay", "Deterministic Round Replay"),
        ("jackpot-effects", "Jackpot Effect Resolution"),
        ("serve-early", "Serve Early Gating"),
        ("booster-loadout", "Booster Loadout Rewards"),
        ("locked-recipe", "Locked Recipe Refusal"),
        ("elite-kitchen", "Elite Recipe Playthrough"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::TesterAssets;
    use std::sync::Arc;

    fn tester() -> GameTester {
        GameTester::new(Arc::new(TesterAssets::load_default().unwrap()), false)
    }

    #[test]
    fn every_listed_scenario_resolves() {
        let tester = tester();
        let listed: Vec<&str> = list_scenarios().iter().map(|(key, _)| *key).collect();
        assert_eq!(listed, ALL_SCENARIOS.to_vec());
        for key in ALL_SCENARIOS {
            assert!(get_scenario(key, &tester).is_some(), "{key} missing");
        }
        assert!(get_scenario("nonexistent", &tester).is_none());
    }

    #[test]
    fn scenarios_pass_on_a_few_seeds() {
        let tester = tester();
        for key in ALL_SCENARIOS {
            let scenario = get_scenario(key, &tester).unwrap();
            for seed in [1_u64, 2, 3] {
                let summary = tester.run_plan(&scenario.plan, seed);
                for expectation in &scenario.plan.expectations {
                    expectation
                        .evaluate(&summary)
                        .unwrap_or_else(|err| panic!("{key} seed {seed}: {err}"));
                }
            }
        }
    }
}
