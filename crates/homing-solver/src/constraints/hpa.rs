//! Hardware platform awareness (HPA) constraint.
//!
//! Walks the per-VM requirement list in order, replacing the candidate list
//! with the constraint engine's (flavor-annotated) answer each time. The
//! first requirement that matches nothing stops the walk; the list filtered
//! up to that point is returned.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use homing_core::Candidate;

use super::{Constraint, ConstraintInfo, parse_properties};
use crate::cei::HpaRequirement;
use crate::decision_path::DecisionPath;
use crate::error::SolverResult;
use crate::request::SolverRequest;

#[derive(Debug, Deserialize)]
struct HpaProperties {
    evaluate: Vec<HpaRequirement>,
}

#[derive(Debug)]
pub struct HpaConstraint {
    info: ConstraintInfo,
    requirements: Vec<HpaRequirement>,
}

impl HpaConstraint {
    pub fn new(info: ConstraintInfo, properties: &Value) -> SolverResult<Self> {
        let props: HpaProperties = parse_properties(&info, properties)?;
        if props.evaluate.is_empty() {
            return Err(info.invalid("evaluate is empty"));
        }
        Ok(Self {
            info,
            requirements: props.evaluate,
        })
    }
}

impl Constraint for HpaConstraint {
    fn info(&self) -> &ConstraintInfo {
        &self.info
    }

    fn solve(
        &self,
        path: &DecisionPath,
        candidates: Vec<Candidate>,
        request: &SolverRequest,
    ) -> SolverResult<Vec<Candidate>> {
        let demand = path.current_demand.as_deref().unwrap_or_default();
        let mut current = candidates;
        for requirement in &self.requirements {
            match request
                .engine
                .get_candidates_with_hpa(requirement, &current)?
            {
                Some(matched) if !matched.is_empty() => {
                    debug!(
                        demand,
                        vm = %requirement.id,
                        remaining = matched.len(),
                        "hpa requirement matched"
                    );
                    current = matched;
                }
                _ => {
                    warn!(demand, vm = %requirement.id, "no candidate matches hpa requirement");
                    break;
                }
            }
        }
        Ok(current)
    }
}
