//! Zone constraint: place demands in the same (affinity) or different
//! (anti-affinity) zones, where the zone is a candidate attribute such as
//! `region` or `complex`.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use homing_core::Candidate;

use super::{Constraint, ConstraintInfo, parse_properties};
use crate::decision_path::DecisionPath;
use crate::error::SolverResult;
use crate::request::SolverRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneQualifier {
    Same,
    Different,
}

#[derive(Debug, Deserialize)]
struct ZoneProperties {
    qualifier: ZoneQualifier,
    category: String,
}

#[derive(Debug)]
pub struct ZoneConstraint {
    info: ConstraintInfo,
    qualifier: ZoneQualifier,
    category: String,
}

impl ZoneConstraint {
    pub fn new(info: ConstraintInfo, properties: &Value) -> SolverResult<Self> {
        let props: ZoneProperties = parse_properties(&info, properties)?;
        if props.category.is_empty() {
            return Err(info.invalid("category is empty"));
        }
        Ok(Self {
            info,
            qualifier: props.qualifier,
            category: props.category,
        })
    }
}

impl Constraint for ZoneConstraint {
    fn info(&self) -> &ConstraintInfo {
        &self.info
    }

    fn solve(
        &self,
        path: &DecisionPath,
        candidates: Vec<Candidate>,
        _request: &SolverRequest,
    ) -> SolverResult<Vec<Candidate>> {
        let siblings = self.info.decided_siblings(path);
        if siblings.is_empty() {
            return Ok(candidates);
        }
        let sibling_zones: Vec<Option<String>> = siblings
            .iter()
            .map(|(_, c)| c.text(&self.category))
            .collect();

        let filtered: Vec<Candidate> = candidates
            .into_iter()
            .filter(|c| {
                let Some(zone) = c.text(&self.category) else {
                    return false;
                };
                sibling_zones.iter().all(|other| match self.qualifier {
                    ZoneQualifier::Same => other.as_deref() == Some(zone.as_str()),
                    ZoneQualifier::Different => other.as_deref() != Some(zone.as_str()),
                })
            })
            .collect();
        debug!(
            constraint = %self.info.name,
            category = %self.category,
            remaining = filtered.len(),
            "zone filter"
        );
        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::ConstraintKind;
    use crate::constraints::test_support::*;
    use serde_json::json;

    fn constraint(qualifier: &str) -> ZoneConstraint {
        let info = ConstraintInfo {
            name: "zone".into(),
            kind: ConstraintKind::Zone,
            demands: vec!["vgw".into(), "vfw".into()],
            priority: 6,
        };
        ZoneConstraint::new(info, &json!({"qualifier": qualifier, "category": "region"})).unwrap()
    }

    fn pool() -> Vec<Candidate> {
        vec![
            cand("east").with_attribute("region", "us-east"),
            cand("west").with_attribute("region", "us-west"),
            cand("nowhere"),
        ]
    }

    #[test]
    fn same_zone() {
        let path = path_at("vfw", vec![("vgw", cand("g").with_attribute("region", "us-east"))]);
        let out = constraint("same")
            .solve(&path, pool(), &request(&["vgw", "vfw"]))
            .unwrap();
        assert_eq!(ids(&out), vec!["east"]);
    }

    #[test]
    fn different_zone() {
        let path = path_at("vfw", vec![("vgw", cand("g").with_attribute("region", "us-east"))]);
        let out = constraint("different")
            .solve(&path, pool(), &request(&["vgw", "vfw"]))
            .unwrap();
        assert_eq!(ids(&out), vec!["west"]);
    }

    #[test]
    fn pass_through_before_siblings_decide() {
        let out = constraint("same")
            .solve(&path_at("vgw", vec![]), pool(), &request(&["vgw", "vfw"]))
            .unwrap();
        assert_eq!(out.len(), 3);
    }
}
