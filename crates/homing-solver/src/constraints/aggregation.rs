//! Cross-demand attribute aggregation.
//!
//! Aggregates an attribute over the candidates chosen for every demand in
//! scope (e.g. total bandwidth, minimum availability) and compares the
//! result with a threshold. It can only judge a full assignment, so it
//! filters only while resolving the last undecided demand in its scope
//! and is a pass-through otherwise.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use homing_core::Candidate;

use super::{Constraint, ConstraintInfo, parse_properties};
use crate::comparator::Comparator;
use crate::decision_path::DecisionPath;
use crate::error::SolverResult;
use crate::request::SolverRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationFunction {
    Sum,
    Min,
    Max,
    #[serde(alias = "avg", alias = "mean")]
    Average,
    /// Value of the first demand in the constraint's scope order.
    #[serde(alias = "copy")]
    First,
}

impl AggregationFunction {
    pub fn apply(self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        Some(match self {
            Self::Sum => values.iter().sum(),
            Self::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Self::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Self::Average => values.iter().sum::<f64>() / values.len() as f64,
            Self::First => values[0],
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AggregationRule {
    pub attribute: String,
    pub function: AggregationFunction,
    pub operator: Comparator,
    pub threshold: f64,
}

#[derive(Debug, Deserialize)]
struct AggregationProperties {
    evaluate: Vec<AggregationRule>,
}

#[derive(Debug)]
pub struct AggregationConstraint {
    info: ConstraintInfo,
    rules: Vec<AggregationRule>,
}

impl AggregationConstraint {
    pub fn new(info: ConstraintInfo, properties: &Value) -> SolverResult<Self> {
        let props: AggregationProperties = parse_properties(&info, properties)?;
        if props.evaluate.is_empty() {
            return Err(info.invalid("evaluate is empty"));
        }
        Ok(Self {
            info,
            rules: props.evaluate,
        })
    }

    /// Whether the current demand is the only one in scope left to decide.
    fn is_last_to_resolve(&self, path: &DecisionPath) -> bool {
        let Some(current) = path.current_demand.as_deref() else {
            return false;
        };
        let pending: Vec<&str> = self
            .info
            .demands
            .iter()
            .map(String::as_str)
            .filter(|d| !path.is_decided(d))
            .collect();
        pending == [current]
    }

    fn accepts(&self, members: &[&Candidate]) -> bool {
        self.rules.iter().all(|rule| {
            let values: Option<Vec<f64>> = members
                .iter()
                .map(|c| c.number(&rule.attribute))
                .collect();
            values
                .and_then(|v| rule.function.apply(&v))
                .is_some_and(|aggregate| rule.operator.holds(aggregate, rule.threshold))
        })
    }
}

impl Constraint for AggregationConstraint {
    fn info(&self) -> &ConstraintInfo {
        &self.info
    }

    fn solve(
        &self,
        path: &DecisionPath,
        candidates: Vec<Candidate>,
        _request: &SolverRequest,
    ) -> SolverResult<Vec<Candidate>> {
        if !self.is_last_to_resolve(path) {
            return Ok(candidates);
        }
        let current = path.current_demand.as_deref().unwrap_or_default();

        let before = candidates.len();
        let filtered: Vec<Candidate> = candidates
            .into_iter()
            .filter(|candidate| {
                let members: Vec<&Candidate> = self
                    .info
                    .demands
                    .iter()
                    .filter_map(|d| {
                        if d == current {
                            Some(candidate)
                        } else {
                            path.decided(d)
                        }
                    })
                    .collect();
                self.accepts(&members)
            })
            .collect();
        debug!(
            constraint = %self.info.name,
            demand = current,
            before,
            after = filtered.len(),
            "aggregation filter"
        );
        Ok(filtered)
    }
}
