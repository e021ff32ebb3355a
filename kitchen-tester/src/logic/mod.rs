pub mod game_tester;
pub mod policy;
pub mod reports;
pub mod seeds;
pub mod tester;

pub use game_tester::{GameTester, SimulationPlan, SimulationSummary, TesterAssets};
pub use policy::GameplayStrategy;
pub use seeds::{SeedInfo, resolve_seed_inputs};
pub use tester::*;
