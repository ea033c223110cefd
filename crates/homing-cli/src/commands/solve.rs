use std::path::Path;

use tracing::info;

use homing_core::{SolverConfig, StrategyKind};
use homing_solver::{SolveOutcome, Solver};

/// Command-line overrides of the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub strategy: Option<StrategyKind>,
    pub seed: Option<u64>,
    pub deadline_secs: Option<u64>,
}

pub async fn solve(
    plan: &Path,
    config: Option<&Path>,
    overrides: Overrides,
) -> anyhow::Result<()> {
    let outcome = run(plan, config, overrides).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

pub async fn run(
    plan: &Path,
    config: Option<&Path>,
    overrides: Overrides,
) -> anyhow::Result<SolveOutcome> {
    let mut config = match config {
        Some(path) => SolverConfig::from_file(path)?,
        None => SolverConfig::default(),
    };
    if let Some(strategy) = overrides.strategy {
        config.solver.strategy = strategy;
    }
    if overrides.seed.is_some() {
        config.solver.random_seed = overrides.seed;
    }
    if overrides.deadline_secs.is_some() {
        config.solver.deadline_secs = overrides.deadline_secs;
    }

    let request = super::load_request(plan)?;
    info!(
        plan = %plan.display(),
        strategy = %config.solver.strategy,
        demands = request.demands.len(),
        "solving plan"
    );
    Ok(Solver::new(config).solve(request).await?)
}
