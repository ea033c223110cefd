//! VIM fit: delegate the capacity check to the constraint engine.
//!
//! An empty answer leaves the candidate list unchanged.

use serde_json::Value;
use tracing::{debug, warn};

use homing_core::Candidate;

use super::{Constraint, ConstraintInfo, parse_properties};
use crate::cei::VimCapacityRequest;
use crate::decision_path::DecisionPath;
use crate::error::SolverResult;
use crate::request::SolverRequest;

#[derive(Debug, serde::Deserialize)]
struct VimFitProperties {
    #[serde(default)]
    controller: Option<String>,
    request: VimCapacityRequest,
}

#[derive(Debug)]
pub struct VimFitConstraint {
    info: ConstraintInfo,
    request: VimCapacityRequest,
}

impl VimFitConstraint {
    pub fn new(info: ConstraintInfo, properties: &Value) -> SolverResult<Self> {
        let props: VimFitProperties = parse_properties(&info, properties)?;
        let mut request = props.request;
        if request.controller.is_none() {
            request.controller = props.controller;
        }
        if request.vcpus < 0.0 || request.memory_mb < 0.0 || request.storage_gb < 0.0 {
            return Err(info.invalid("capacity request must not be negative"));
        }
        Ok(Self { info, request })
    }
}

impl Constraint for VimFitConstraint {
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
        match request
            .engine
            .get_candidates_with_vim_capacity(&candidates, &self.request)?
        {
            Some(fitting) if !fitting.is_empty() => {
                debug!(demand, remaining = fitting.len(), "vim capacity filter");
                Ok(fitting)
            }
            _ => {
                warn!(demand, constraint = %self.info.name, "no vim capacity answer, keeping candidates");
                Ok(candidates)
            }
        }
    }
}
