//! Search strategies and the constraint pipeline they drive.

mod greedy;
mod random_pick;

pub use greedy::Greedy;
pub use random_pick::RandomPick;

use tracing::debug;

use homing_core::{Candidate, Demand, SolverConfig, StrategyKind};

use crate::decision_path::DecisionPath;
use crate::error::SolverResult;
use crate::request::SolverRequest;

/// A search algorithm over the plan's demands.
pub trait SearchStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Resolve every demand. `Ok(None)` means no feasible assignment was
    /// found; `Err` means a template or collaborator failure.
    fn search(&self, request: &SolverRequest) -> SolverResult<Option<DecisionPath>>;
}

/// Build the strategy selected by the config.
pub fn strategy_for(config: &SolverConfig) -> Box<dyn SearchStrategy> {
    match config.solver.strategy {
        StrategyKind::Greedy => Box::new(Greedy),
        StrategyKind::RandomPick => Box::new(RandomPick::new(config.solver.random_seed)),
    }
}

/// Run every constraint scoped to `demand`, in priority order, each one
/// narrowing the previous one's output. Stops at the first empty result.
pub fn apply_constraints(
    path: &DecisionPath,
    demand: &Demand,
    request: &SolverRequest,
) -> SolverResult<Vec<Candidate>> {
    let mut candidates = demand.candidates.clone();
    for constraint in request.constraints_for(&demand.name) {
        let before = candidates.len();
        candidates = constraint.solve(path, candidates, request)?;
        debug!(
            demand = %demand.name,
            constraint = constraint.name(),
            before,
            after = candidates.len(),
            "constraint applied"
        );
        if candidates.is_empty() {
            break;
        }
    }
    Ok(candidates)
}
