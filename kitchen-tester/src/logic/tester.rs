use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::common::scenario::TestScenario;
use crate::logic::game_tester::{GameTester, SimulationPlan, SimulationSummary};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
}

/// Flat per-run row used by the CSV report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub scenario_name: String,
    pub recipe_id: String,
    pub strategy: String,
    pub seed: u64,
    pub ending: String,
    pub grade: Option<String>,
    pub turns_used: u32,
    pub served_early: bool,
    pub jackpots: u32,
    pub shields_used: u32,
    pub fire_boosts: u32,
    pub coins: u32,
    pub xp_earned: u32,
}

impl RunRecord {
    #[must_use]
    pub fn from_summary(scenario_name: &str, summary: &SimulationSummary) -> Self {
        Self {
            scenario_name: scenario_name.to_string(),
            recipe_id: summary.recipe_id.clone(),
            strategy: summary.strategy.label().to_string(),
            seed: summary.seed,
            ending: summary.ending_label(),
            grade: summary.grade().map(|g| g.label().to_string()),
            turns_used: summary.turns_used,
            served_early: summary.served_early,
            jackpots: summary.jackpots,
            shields_used: summary.shields_used,
            fire_boosts: summary.fire_boosts,
            coins: summary.coins,
            xp_earned: summary.xp_earned,
        }
    }
}

pub struct LogicTester {
    tester: GameTester,
}

impl LogicTester {
    pub const fn new(tester: GameTester) -> Self {
        Self { tester }
    }

    pub fn run_scenario(
        &self,
        scenario: &TestScenario,
        seeds: &[u64],
        iterations: usize,
        records: &mut Vec<RunRecord>,
    ) -> Vec<ScenarioResult> {
        let mut results = Vec::new();

        for &seed in seeds {
            if self.tester.verbose() {
                println!(
                    "🧪 Testing scenario: {} (recipe: {} seed: {})",
                    scenario.name.bright_white(),
                    scenario.plan.recipe_id,
                    seed
                );
            }

            let result = self.run_single_scenario(scenario, seed, iterations, records);
            results.push(result);
        }

        results
    }

    fn run_single_scenario(
        &self,
        scenario: &TestScenario,
        seed: u64,
        iterations: usize,
        records: &mut Vec<RunRecord>,
    ) -> ScenarioResult {
        let mut successes = 0;
        let mut failures = Vec::new();
        let mut performance_data = Vec::new();

        for i in 0..iterations {
            let start_time = Instant::now();
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));
            let summary = self.tester.run_plan(&scenario.plan, iteration_seed);
            records.push(RunRecord::from_summary(&scenario.name, &summary));

            if let Some(err) = evaluate_expectations(&scenario.plan, &summary) {
                let context = summarize_decision_path(&summary);
                failures.push(format!(
                    "Iteration {} (recipe {}, strategy {}, seed {}, turns {}, ending '{}'): {} | {}",
                    i + 1,
                    summary.recipe_id,
                    summary.strategy.label(),
                    summary.seed,
                    summary.turns_used,
                    summary.ending_label(),
                    err,
                    context,
                ));

                if self.tester.verbose() {
                    println!(
                        "  ❌ Iteration {}/{} failed: {}",
                        i + 1,
                        iterations,
                        err.red()
                    );
                    println!("     ↳ Decisions: {context}");
                }
            } else {
                successes += 1;
                let duration = start_time.elapsed();
                performance_data.push(duration);

                if self.tester.verbose() {
                    println!(
                        "  ✅ Iteration {}/{} passed ({duration:?}) ending:{} coins:{}",
                        i + 1,
                        iterations,
                        summary.ending_label(),
                        summary.coins
                    );
                }
            }
        }

        let average_duration = if performance_data.is_empty() {
            Duration::ZERO
        } else {
            performance_data.iter().sum::<Duration>()
                / u32::try_from(performance_data.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: scenario.name.clone(),
            seed,
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            failures,
            average_duration,
            performance_data,
        }
    }
}

fn evaluate_expectations(plan: &SimulationPlan, summary: &SimulationSummary) -> Option<String> {
    for expectation in &plan.expectations {
        if let Err(err) = expectation.evaluate(summary) {
            return Some(err.to_string());
        }
    }
    None
}

fn summarize_decision_path(summary: &SimulationSummary) -> String {
    if summary.decisions.is_empty() {
        return "no decisions recorded".to_string();
    }

    summary
        .decisions
        .iter()
        .rev()
        .take(3)
        .map(|entry| {
            let rationale = entry
                .rationale
                .as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or("-");
            format!(
                "turn {}: slot {} {} [{}] reason {}",
                entry.turn, entry.slot, entry.ingredient, entry.policy_name, rationale
            )
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis: Vec<u128> = durations.iter().map(Duration::as_millis).collect();
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis_vec = Vec::<u128>::deserialize(deserializer)?;
        Ok(millis_vec
            .into_iter()
            .map(|m| Duration::from_millis(u64::try_from(m).unwrap_or(0)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::game_tester::TesterAssets;
    use crate::logic::policy::GameplayStrategy;
    use std::sync::Arc;

    fn logic_tester() -> LogicTester {
        let assets = Arc::new(TesterAssets::load_default().unwrap());
        LogicTester::new(GameTester::new(assets, false))
    }

    #[test]
    fn failing_expectation_is_reported_with_context() {
        let plan = SimulationPlan::new("easy_salad", GameplayStrategy::Careful)
            .with_expectation(|_: &SimulationSummary| -> anyhow::Result<()> {
                anyhow::bail!("always fails")
            });
        let scenario = TestScenario::simulation("Always Fails", plan);
        let mut records = Vec::new();
        let results = logic_tester().run_scenario(&scenario, &[5], 2, &mut records);
        assert_eq!(results.len(), 1);
        let result = &results[0];
        assert!(!result.passed);
        assert_eq!(result.failures.len(), 2);
        assert!(result.failures[0].contains("always fails"));
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn passing_scenario_records_timings() {
        let plan = SimulationPlan::new("easy_salad", GameplayStrategy::Greedy);
        let scenario = TestScenario::simulation("Plain", plan);
        let mut records = Vec::new();
        let results = logic_tester().run_scenario(&scenario, &[1, 2], 3, &mut records);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.passed && r.successful_iterations == 3));
        assert_eq!(records.len(), 6);
        let json = serde_json::to_string(&results[0]).unwrap();
        assert!(json.contains("average_duration"));
    }
}
