//! Plan ingestion: from translated template to a validated solver request.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use homing_core::{CoreError, Demand, Location};

use crate::cei::ConstraintEngine;
use crate::constraints::{Constraint, ConstraintSpec, build_constraint};
use crate::error::{SolverError, SolverResult};
use crate::objective::{Objective, ObjectiveScope, ObjectiveSpec};

/// A translated plan, as delivered by the template translator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSpec {
    pub demands: Vec<Demand>,
    #[serde(default)]
    pub constraints: Vec<ConstraintSpec>,
    pub objective: ObjectiveSpec,
    /// Named locations objective functions may refer to.
    #[serde(default)]
    pub locations: HashMap<String, Location>,
    /// Country → latency weight, for `latency_between`.
    #[serde(default)]
    pub latency_weights: HashMap<String, f64>,
}

/// Everything one search needs. Built once per plan and read-only during
/// the search; the engine client is the only channel to the outside.
pub struct SolverRequest {
    /// Demands in processing order.
    pub demands: Vec<Demand>,
    /// Constraints in application order (ascending priority).
    pub constraints: Vec<Box<dyn Constraint>>,
    pub objective: Objective,
    pub locations: HashMap<String, Location>,
    pub latency_weights: HashMap<String, f64>,
    pub engine: Arc<dyn ConstraintEngine>,
}

impl std::fmt::Debug for SolverRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolverRequest")
            .field("demands", &self.demands.iter().map(|d| &d.name).collect::<Vec<_>>())
            .field("constraints", &self.constraints.len())
            .field("goal", &self.objective.goal)
            .finish()
    }
}

impl SolverRequest {
    /// Validate a plan and resolve its constraint types, operators and
    /// functions. All template errors surface here rather than mid-search.
    pub fn from_plan(plan: PlanSpec, engine: Arc<dyn ConstraintEngine>) -> SolverResult<Self> {
        let mut names = HashSet::new();
        let mut demands = Vec::with_capacity(plan.demands.len());
        for demand in plan.demands {
            if !names.insert(demand.name.clone()) {
                return Err(CoreError::DuplicateDemand(demand.name).into());
            }
            // Re-run the constructor to drop duplicate candidate ids.
            let before = demand.candidates.len();
            let cleaned = Demand::new(&demand.name, demand.candidates).with_sort_key(demand.sort_key);
            if cleaned.candidates.len() != before {
                warn!(
                    demand = %cleaned.name,
                    dropped = before - cleaned.candidates.len(),
                    "duplicate candidate ids dropped"
                );
            }
            demands.push(cleaned);
        }
        demands.sort_by_key(|d| d.sort_key);

        for location in plan.locations.values() {
            location.validate()?;
        }

        let mut constraints = Vec::with_capacity(plan.constraints.len());
        for spec in &plan.constraints {
            if let Some(unknown) = spec.demands.iter().find(|d| !names.contains(*d)) {
                return Err(SolverError::UnknownDemand(unknown.clone()));
            }
            constraints.push(build_constraint(spec)?);
        }
        constraints.sort_by_key(|c| c.priority());

        let objective = Objective::from_spec(
            &plan.objective,
            &ObjectiveScope {
                demands: &names,
                locations: &plan.locations,
            },
        )?;

        debug!(
            demands = demands.len(),
            constraints = constraints.len(),
            "plan validated"
        );

        Ok(Self {
            demands,
            constraints,
            objective,
            locations: plan.locations,
            latency_weights: plan.latency_weights,
            engine,
        })
    }

    /// Constraints scoped to `demand`, in application order.
    pub fn constraints_for<'a>(&'a self, demand: &'a str) -> impl Iterator<Item = &'a dyn Constraint> + 'a {
        self.constraints
            .iter()
            .filter(move |c| c.info().applies_to(demand))
            .map(|c| &**c)
    }

    pub fn demand(&self, name: &str) -> Option<&Demand> {
        self.demands.iter().find(|d| d.name == name)
    }
}
