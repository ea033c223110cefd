//! Threshold constraint: one numeric attribute against a fixed bound.
//!
//! A candidate without the attribute, or with a non-numeric value, is
//! rejected.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use homing_core::Candidate;

use super::{Constraint, ConstraintInfo, parse_properties};
use crate::comparator::Comparator;
use crate::decision_path::DecisionPath;
use crate::error::SolverResult;
use crate::request::SolverRequest;

#[derive(Debug, Deserialize)]
struct ThresholdProperties {
    attribute: String,
    threshold: f64,
    operator: Comparator,
}

#[derive(Debug)]
pub struct ThresholdConstraint {
    info: ConstraintInfo,
    attribute: String,
    threshold: f64,
    operator: Comparator,
}

impl ThresholdConstraint {
    pub fn new(info: ConstraintInfo, properties: &Value) -> SolverResult<Self> {
        let props: ThresholdProperties = parse_properties(&info, properties)?;
        if !props.threshold.is_finite() {
            return Err(info.invalid("threshold must be finite"));
        }
        Ok(Self {
            info,
            attribute: props.attribute,
            threshold: props.threshold,
            operator: props.operator,
        })
    }
}

impl Constraint for ThresholdConstraint {
    fn info(&self) -> &ConstraintInfo {
        &self.info
    }

    fn solve(
        &self,
        _path: &DecisionPath,
        candidates: Vec<Candidate>,
        _request: &SolverRequest,
    ) -> SolverResult<Vec<Candidate>> {
        let before = candidates.len();
        let filtered: Vec<Candidate> = candidates
            .into_iter()
            .filter(|c| match c.number(&self.attribute) {
                Some(value) => self.operator.holds(value, self.threshold),
                None => {
                    debug!(
                        candidate = %c.candidate_id,
                        attribute = %self.attribute,
                        "attribute missing or not numeric, rejecting"
                    );
                    false
                }
            })
            .collect();
        debug!(
            constraint = %self.info.name,
            before,
            after = filtered.len(),
            "threshold {} {} {}",
            self.attribute,
            self.operator,
            self.threshold
        );
        Ok(filtered)
    }
}
