//! Solver facade: picks the configured strategy and enforces the deadline.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use homing_core::SolverConfig;

use crate::decision_path::Decision;
use crate::error::{SolverError, SolverResult};
use crate::request::SolverRequest;
use crate::search::{SearchStrategy, strategy_for};

/// How a solve attempt ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SolveOutcome {
    Solved(Decision),
    /// Some demand had no feasible candidate.
    NoSolution,
    /// The deadline passed before the search finished.
    TimedOut,
}

impl SolveOutcome {
    pub fn decision(&self) -> Option<&Decision> {
        match self {
            Self::Solved(decision) => Some(decision),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Solver {
    config: SolverConfig,
    deadline: Option<Duration>,
}

impl Solver {
    pub fn new(config: SolverConfig) -> Self {
        let deadline = config.deadline();
        Self { config, deadline }
    }

    /// Override the configured deadline.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn strategy(&self) -> Box<dyn SearchStrategy> {
        strategy_for(&self.config)
    }

    /// Run the search on the calling thread, without a deadline.
    pub fn solve_blocking(&self, request: &SolverRequest) -> SolverResult<SolveOutcome> {
        let strategy = self.strategy();
        let found = strategy.search(request)?;
        Ok(Self::finish(strategy.name(), found.map(|p| p.to_decision())))
    }

    /// Run the search on the blocking pool, bounded by the deadline.
    ///
    /// On timeout the search thread is left to finish on its own and its
    /// result is dropped.
    pub async fn solve(&self, request: SolverRequest) -> SolverResult<SolveOutcome> {
        let strategy = self.strategy();
        let name = strategy.name();
        let task = tokio::task::spawn_blocking(move || {
            strategy
                .search(&request)
                .map(|found| found.map(|p| p.to_decision()))
        });

        let joined = match self.deadline {
            Some(deadline) => match tokio::time::timeout(deadline, task).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!(strategy = name, deadline_ms = deadline.as_millis() as u64, "search timed out");
                    return Ok(SolveOutcome::TimedOut);
                }
            },
            None => task.await,
        };
        let found = joined.map_err(|e| SolverError::Join(e.to_string()))??;
        Ok(Self::finish(name, found))
    }

    fn finish(strategy: &str, found: Option<Decision>) -> SolveOutcome {
        match found {
            Some(decision) => {
                info!(
                    strategy,
                    decision_id = %decision.decision_id,
                    total_value = decision.total_value,
                    "plan solved"
                );
                SolveOutcome::Solved(decision)
            }
            None => {
                info!(strategy, "no solution");
                SolveOutcome::NoSolution
            }
        }
    }
}
