//! Search state for one plan resolution attempt.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use homing_core::Candidate;

use crate::error::{SolverError, SolverResult};

/// Working state of one search: decisions so far plus running score.
///
/// One instance per search invocation. Constraints read `decisions` to see
/// what has already been placed; objective evaluation reads the tentative
/// decision for the demand being resolved as well.
#[derive(Debug, Clone, Default)]
pub struct DecisionPath {
    /// demand name → chosen (or tentatively assumed) candidate.
    pub decisions: HashMap<String, Candidate>,
    /// The demand currently being resolved.
    pub current_demand: Option<String>,
    pub cumulated_value: f64,
    /// Reserved for cost-aware strategies; the shipped strategies leave it 0.
    pub cumulated_cost: f64,
    /// Reserved for look-ahead heuristics; the shipped strategies leave it 0.
    pub heuristic_to_go_value: f64,
    pub heuristic_to_go_cost: f64,
    pub total_value: f64,
    /// `cumulated_cost + heuristic_to_go_cost`; 0 unless a strategy sets
    /// the cost side.
    pub total_cost: f64,
    /// Trace of committed decisions, `demand:candidate>` per segment.
    pub decision_id: String,
    committed: HashSet<String>,
}

impl DecisionPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `demand` has a committed decision.
    pub fn is_decided(&self, demand: &str) -> bool {
        self.committed.contains(demand)
    }

    /// Committed decision for `demand`, if any. Tentative assumptions are
    /// not visible here.
    pub fn decided(&self, demand: &str) -> Option<&Candidate> {
        if self.is_decided(demand) {
            self.decisions.get(demand)
        } else {
            None
        }
    }

    /// Tentatively assume `candidate` for `demand` so the objective can be
    /// evaluated against it. Fails if the demand is already committed.
    pub fn assume(&mut self, demand: &str, candidate: Candidate) -> SolverResult<()> {
        if self.is_decided(demand) {
            return Err(SolverError::AlreadyDecided(demand.to_string()));
        }
        self.decisions.insert(demand.to_string(), candidate);
        Ok(())
    }

    /// Drop a tentative assumption.
    pub fn retract(&mut self, demand: &str) {
        if !self.is_decided(demand) {
            self.decisions.remove(demand);
        }
    }

    /// Commit the decision for `demand`. A committed decision never changes
    /// within the same search.
    pub fn commit(&mut self, demand: &str, candidate: Candidate) -> SolverResult<()> {
        if !self.committed.insert(demand.to_string()) {
            return Err(SolverError::AlreadyDecided(demand.to_string()));
        }
        self.decision_id
            .push_str(&format!("{}:{}>", demand, candidate.candidate_id));
        self.decisions.insert(demand.to_string(), candidate);
        Ok(())
    }

    /// `total = cumulated + heuristic-to-go`, for value and cost.
    pub fn refresh_totals(&mut self) {
        self.total_value = self.cumulated_value + self.heuristic_to_go_value;
        self.total_cost = self.cumulated_cost + self.heuristic_to_go_cost;
    }

    /// Freeze the committed state into a result record.
    pub fn to_decision(&self) -> Decision {
        Decision {
            decisions: self
                .decisions
                .iter()
                .filter(|(demand, _)| self.committed.contains(*demand))
                .map(|(demand, candidate)| (demand.clone(), candidate.clone()))
                .collect(),
            total_value: self.total_value,
            decision_id: self.decision_id.clone(),
        }
    }
}

/// The result handed back to the caller: winning candidate per demand and
/// the score of the final evaluation round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub decisions: BTreeMap<String, Candidate>,
    pub total_value: f64,
    pub decision_id: String,
}

impl Decision {
    /// Winning candidate id for a demand.
    pub fn candidate_id(&self, demand: &str) -> Option<&str> {
        self.decisions
            .get(demand)
            .map(|c| c.candidate_id.as_str())
    }
}
