//! Attribute constraint: keep candidates whose attributes satisfy an
//! evaluation map, as judged by the constraint engine.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use homing_core::Candidate;

use super::{Constraint, ConstraintInfo, parse_properties};
use crate::decision_path::DecisionPath;
use crate::error::SolverResult;
use crate::request::SolverRequest;

#[derive(Debug, Deserialize)]
struct AttributeProperties {
    evaluate: Map<String, Value>,
}

#[derive(Debug)]
pub struct AttributeConstraint {
    info: ConstraintInfo,
    evaluate: Map<String, Value>,
}

impl AttributeConstraint {
    pub fn new(info: ConstraintInfo, properties: &Value) -> SolverResult<Self> {
        let props: AttributeProperties = parse_properties(&info, properties)?;
        if props.evaluate.is_empty() {
            return Err(info.invalid("evaluate is empty"));
        }
        Ok(Self {
            info,
            evaluate: props.evaluate,
        })
    }
}

impl Constraint for AttributeConstraint {
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
        let matched = request
            .engine
            .get_candidates_by_attributes(demand, &candidates, &self.evaluate)?;

        // Keep input order and never admit a candidate the engine invented.
        let filtered: Vec<Candidate> = candidates
            .into_iter()
            .filter(|c| matched.iter().any(|m| m.candidate_id == c.candidate_id))
            .collect();
        debug!(constraint = %self.info.name, demand, remaining = filtered.len(), "attribute filter");
        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::ConstraintKind;
    use crate::constraints::test_support::*;
    use serde_json::json;

    fn constraint(evaluate: Value) -> AttributeConstraint {
        let info = ConstraintInfo {
            name: "attr".into(),
            kind: ConstraintKind::Attribute,
            demands: vec!["vgw".into()],
            priority: 4,
        };
        AttributeConstraint::new(info, &json!({ "evaluate": evaluate })).unwrap()
    }

    #[test]
    fn keeps_matching_candidates_in_order() {
        let c = constraint(json!({"cloud_owner": "att", "region": ["r1", "r3"]}));
        let candidates = vec![
            cand("a").with_attribute("cloud_owner", "att").with_attribute("region", "r3"),
            cand("b").with_attribute("cloud_owner", "att").with_attribute("region", "r2"),
            cand("c").with_attribute("cloud_owner", "att").with_attribute("region", "r1"),
            cand("d").with_attribute("region", "r1"),
        ];
        let out = c
            .solve(&path_at("vgw", vec![]), candidates, &request(&["vgw"]))
            .unwrap();
        assert_eq!(ids(&out), vec!["a", "c"]);
    }

    #[test]
    fn empty_evaluate_is_invalid() {
        let info = ConstraintInfo {
            name: "attr".into(),
            kind: ConstraintKind::Attribute,
            demands: vec!["vgw".into()],
            priority: 4,
        };
        assert!(AttributeConstraint::new(info, &json!({"evaluate": {}})).is_err());
    }
}
