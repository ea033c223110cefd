//! Random pick: one uniformly random candidate per demand.
//!
//! Ignores constraints and the objective when choosing. Meant as a
//! baseline to compare real strategies against. The objective is evaluated
//! once at the end so the baseline carries a score when it can; a failed
//! evaluation leaves the score at zero.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{info, warn};

use super::SearchStrategy;
use crate::decision_path::DecisionPath;
use crate::error::SolverResult;
use crate::request::SolverRequest;

#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPick {
    seed: Option<u64>,
}

impl RandomPick {
    /// `None` seeds from entropy.
    pub fn new(seed: Option<u64>) -> Self {
        Self { seed }
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

impl SearchStrategy for RandomPick {
    fn name(&self) -> &'static str {
        "random_pick"
    }

    fn search(&self, request: &SolverRequest) -> SolverResult<Option<DecisionPath>> {
        let mut rng = self.rng();
        let mut path = DecisionPath::new();

        for demand in &request.demands {
            let Some(choice) = demand.candidates.choose(&mut rng) else {
                warn!(demand = %demand.name, "empty candidate pool");
                return Ok(None);
            };
            path.commit(&demand.name, choice.clone())?;
        }

        if let Err(e) = request.objective.compute(&mut path, request) {
            warn!(decision_id = %path.decision_id, error = %e, "baseline left unscored");
            path.cumulated_value = 0.0;
            path.refresh_totals();
        }
        info!(
            decision_id = %path.decision_id,
            total_value = path.total_value,
            "random pick complete"
        );
        Ok(Some(path))
    }
}
