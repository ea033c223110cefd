//! Service constraint: candidates of one inventory type must be confirmed
//! by a service controller. Candidates of any other type pass untouched.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use homing_core::Candidate;

use super::{Constraint, ConstraintInfo, parse_properties};
use crate::cei::ServiceQuery;
use crate::decision_path::DecisionPath;
use crate::error::SolverResult;
use crate::request::SolverRequest;

#[derive(Debug, Deserialize)]
struct ServiceProperties {
    controller: String,
    inventory_type: String,
    #[serde(default)]
    request: Value,
    #[serde(default)]
    cost: f64,
}

#[derive(Debug)]
pub struct ServiceConstraint {
    info: ConstraintInfo,
    controller: String,
    inventory_type: String,
    request: Value,
    cost: f64,
}

impl ServiceConstraint {
    pub fn new(info: ConstraintInfo, properties: &Value) -> SolverResult<Self> {
        let props: ServiceProperties = parse_properties(&info, properties)?;
        if props.controller.is_empty() || props.inventory_type.is_empty() {
            return Err(info.invalid("controller and inventory_type are required"));
        }
        Ok(Self {
            info,
            controller: props.controller,
            inventory_type: props.inventory_type,
            request: props.request,
            cost: props.cost,
        })
    }
}

impl Constraint for ServiceConstraint {
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
        let to_check: Vec<Candidate> = candidates
            .iter()
            .filter(|c| c.inventory_type == self.inventory_type)
            .cloned()
            .collect();
        if to_check.is_empty() {
            return Ok(candidates);
        }

        let query = ServiceQuery {
            constraint_name: &self.info.name,
            constraint_type: self.info.kind.as_str(),
            controller: &self.controller,
            inventory_type: &self.inventory_type,
            request: &self.request,
            cost: self.cost,
            demand_name: demand,
        };
        let confirmed: HashMap<String, Candidate> = request
            .engine
            .get_candidates_from_service(&query, &to_check)?
            .unwrap_or_default()
            .into_iter()
            .map(|c| (c.candidate_id.clone(), c))
            .collect();
        debug!(
            demand,
            checked = to_check.len(),
            confirmed = confirmed.len(),
            "service filter"
        );

        // Input order; confirmed candidates take the controller's record.
        let filtered = candidates
            .into_iter()
            .filter_map(|c| {
                if c.inventory_type != self.inventory_type {
                    Some(c)
                } else {
                    confirmed.get(&c.candidate_id).cloned()
                }
            })
            .collect();
        Ok(filtered)
    }
}
