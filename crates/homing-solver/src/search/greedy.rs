//! Greedy search: one pass over the demands, best candidate per demand,
//! no backtracking. The result depends on demand order and is not
//! globally optimal.

use tracing::{debug, info, warn};

use homing_core::Candidate;

use super::{SearchStrategy, apply_constraints};
use crate::decision_path::DecisionPath;
use crate::error::SolverResult;
use crate::objective::Goal;
use crate::request::SolverRequest;

#[derive(Debug, Clone, Copy, Default)]
pub struct Greedy;

impl SearchStrategy for Greedy {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn search(&self, request: &SolverRequest) -> SolverResult<Option<DecisionPath>> {
        let goal = request.objective.goal;
        let mut path = DecisionPath::new();

        for demand in &request.demands {
            path.current_demand = Some(demand.name.clone());

            let candidates = apply_constraints(&path, demand, request)?;
            if candidates.is_empty() {
                warn!(demand = %demand.name, "no candidate survives constraints");
                return Ok(None);
            }

            let mut bound = match goal {
                Goal::Minimize => f64::MAX,
                Goal::Maximize => f64::NEG_INFINITY,
            };
            let mut best: Option<Candidate> = None;

            for candidate in candidates {
                path.assume(&demand.name, candidate.clone())?;
                match request.objective.compute(&mut path, request) {
                    Ok(()) => {}
                    Err(e) if e.is_candidate_mismatch() => {
                        debug!(
                            demand = %demand.name,
                            candidate = %candidate.candidate_id,
                            error = %e,
                            "candidate cannot be scored"
                        );
                        continue;
                    }
                    Err(e) => return Err(e),
                }
                let improves = match goal {
                    Goal::Minimize => path.total_value < bound,
                    Goal::Maximize => path.total_value > bound,
                };
                if improves {
                    bound = path.total_value;
                    best = Some(candidate);
                }
            }
            path.retract(&demand.name);

            let Some(best) = best else {
                warn!(demand = %demand.name, "no candidate improves on the initial bound");
                return Ok(None);
            };
            debug!(
                demand = %demand.name,
                candidate = %best.candidate_id,
                value = bound,
                "demand resolved"
            );
            path.commit(&demand.name, best)?;
            path.total_value = bound;
        }

        path.current_demand = None;
        info!(
            decision_id = %path.decision_id,
            total_value = path.total_value,
            "greedy search complete"
        );
        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cei::StaticEngine;
    use crate::constraints::test_support::DownEngine;
    use crate::request::PlanSpec;
    use serde_json::{Value, json};

    fn candidate(id: &str, cost: f64, extra: Value) -> Value {
        let mut c = json!({"candidate_id": id, "inventory_provider": "aai", "inventory_type": "cloud", "cost": cost});
        if let (Value::Object(base), Value::Object(more)) = (&mut c, extra) {
            base.extend(more);
        }
        c
    }

    fn cost_objective(goal: &str, demands: &[&str]) -> Value {
        let operands: Vec<Value> = demands
            .iter()
            .map(|d| json!({"function": "cost", "params": {"demand": d}}))
            .collect();
        json!({"goal": goal, "operation_function": {"operator": "sum", "operands": operands}})
    }

    fn build(plan: Value) -> SolverRequest {
        let plan: PlanSpec = serde_json::from_value(plan).unwrap();
        SolverRequest::from_plan(plan, Arc::new(StaticEngine)).unwrap()
    }

    #[test]
    fn picks_cheapest_per_demand() {
        let request = build(json!({
            "demands": [
                {"name": "a", "candidates": [candidate("a1", 3.0, json!({})), candidate("a2", 1.0, json!({}))]},
                {"name": "b", "candidates": [candidate("b1", 2.0, json!({})), candidate("b2", 5.0, json!({}))]}
            ],
            "objective": cost_objective("minimize", &["a", "b"])
        }));
        let path = Greedy.search(&request).unwrap().unwrap();
        assert_eq!(path.decisions["a"].candidate_id, "a2");
        assert_eq!(path.decisions["b"].candidate_id, "b1");
        assert_eq!(path.decision_id, "a:a2>b:b1>");
        assert_eq!(path.total_value, 3.0);
    }

    #[test]
    fn maximize_handles_negative_scores() {
        let request = build(json!({
            "demands": [{"name": "a", "candidates": [
                candidate("a1", 1.0, json!({"margin": -5})),
                candidate("a2", 1.0, json!({"margin": -2}))
            ]}],
            "objective": {"goal": "maximize", "operation_function": {"operator": "sum", "operands": [
                {"function": "attribute", "params": {"demand": "a", "attribute": "margin"}}
            ]}}
        }));
        let path = Greedy.search(&request).unwrap().unwrap();
        assert_eq!(path.decisions["a"].candidate_id, "a2");
        assert_eq!(path.total_value, -2.0);
    }

    #[test]
    fn empty_pool_after_constraints_is_infeasible() {
        let request = build(json!({
            "demands": [
                {"name": "a", "candidates": [candidate("a1", 1.0, json!({}))]},
                {"name": "b", "candidates": [candidate("b1", 9.0, json!({}))]}
            ],
            "constraints": [{"name": "cheap", "type": "threshold", "demands": ["b"],
                             "properties": {"attribute": "cost", "threshold": 5, "operator": "lte"}}],
            "objective": cost_objective("minimize", &["a", "b"])
        }));
        assert!(Greedy.search(&request).unwrap().is_none());
    }

    #[test]
    fn earlier_decisions_shape_later_pools() {
        let request = build(json!({
            "demands": [
                {"name": "gw", "candidates": [
                    candidate("gw-east", 1.0, json!({"region": "east"})),
                    candidate("gw-west", 2.0, json!({"region": "west"}))
                ]},
                {"name": "fw", "candidates": [
                    candidate("fw-west", 1.0, json!({"region": "west"})),
                    candidate("fw-east", 4.0, json!({"region": "east"}))
                ]}
            ],
            "constraints": [{"name": "together", "type": "zone", "demands": ["gw", "fw"],
                             "properties": {"qualifier": "same", "category": "region"}}],
            "objective": cost_objective("minimize", &["gw", "fw"])
        }));
        // Greedy commits gw-east first and is then stuck with fw-east,
        // although west/west would be cheaper overall.
        let path = Greedy.search(&request).unwrap().unwrap();
        assert_eq!(path.decisions["gw"].candidate_id, "gw-east");
        assert_eq!(path.decisions["fw"].candidate_id, "fw-east");
        assert_eq!(path.total_value, 5.0);
    }

    #[test]
    fn unscorable_candidate_is_skipped() {
        let request = build(json!({
            "demands": [{"name": "a", "candidates": [
                candidate("a1", 1.0, json!({"latency": 3})),
                candidate("a2", 1.0, json!({}))
            ]}],
            "objective": {"goal": "minimize", "operation_function": {"operator": "sum", "operands": [
                {"function": "attribute", "params": {"demand": "a", "attribute": "latency"}}
            ]}}
        }));
        let path = Greedy.search(&request).unwrap().unwrap();
        assert_eq!(path.decisions["a"].candidate_id, "a1");
        assert_eq!(path.total_value, 3.0);
    }

    #[test]
    fn all_unscorable_is_infeasible() {
        let request = build(json!({
            "demands": [{"name": "a", "candidates": [candidate("a1", 1.0, json!({"latency": "slow"}))]}],
            "objective": {"goal": "minimize", "operation_function": {"operator": "sum", "operands": [
                {"function": "attribute", "params": {"demand": "a", "attribute": "latency"}}
            ]}}
        }));
        assert!(Greedy.search(&request).unwrap().is_none());
    }

    #[test]
    fn engine_failure_during_scoring_propagates() {
        let plan: PlanSpec = serde_json::from_value(json!({
            "demands": [{"name": "a", "candidates": [candidate("a1", 1.0, json!({}))]}],
            "objective": {"goal": "minimize", "operation_function": {"operator": "sum", "operands": [
                {"function": "distance_between", "params": {"demand": "a", "location": "hq"}}
            ]}},
            "locations": {"hq": {"latitude": 0.0, "longitude": 0.0}}
        }))
        .unwrap();
        let request = SolverRequest::from_plan(plan, Arc::new(DownEngine)).unwrap();
        assert!(matches!(
            Greedy.search(&request),
            Err(crate::error::SolverError::Engine(_))
        ));
    }

    #[test]
    fn runs_are_deterministic() {
        let plan = json!({
            "demands": [
                {"name": "a", "candidates": [
                    candidate("a1", 1.0, json!({})), candidate("a2", 1.0, json!({})), candidate("a3", 0.5, json!({}))
                ]},
                {"name": "b", "candidates": [candidate("b1", 1.0, json!({})), candidate("b2", 1.0, json!({}))]}
            ],
            "objective": cost_objective("minimize", &["a", "b"])
        });
        let first = Greedy.search(&build(plan.clone())).unwrap().unwrap();
        let second = Greedy.search(&build(plan)).unwrap().unwrap();
        assert_eq!(first.to_decision(), second.to_decision());
        // Ties keep the first candidate in pool order.
        assert_eq!(first.decisions["b"].candidate_id, "b1");
    }

    #[test]
    fn non_finite_scores_never_win() {
        let request = build(json!({
            "demands": [{"name": "a", "candidates": [candidate("a1", 1.0, json!({"score": "NaN"}))]}],
            "objective": {"goal": "minimize", "operation_function": {"operator": "sum", "operands": [
                {"function": "attribute", "params": {"demand": "a", "attribute": "score"}}
            ]}}
        }));
        assert!(Greedy.search(&request).unwrap().is_none());
    }
}
