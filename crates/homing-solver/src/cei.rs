//! Constraint engine interface (CEI).
//!
//! Constraints and objective functions ask the constraint engine for facts
//! that are not present in the bare candidate record: hardware platform
//! matches, VIM capacity, service controller confirmation, and candidate
//! locations. In production the engine fronts remote inventory systems;
//! [`StaticEngine`] answers from the candidate attributes themselves.
//!
//! Every call is synchronous. `Ok(None)` (or an empty list) means "no
//! match"; `Err` is a collaborator failure and aborts the search.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use homing_core::{Candidate, Location, value_as_f64};

use crate::comparator::{Comparator, loose_eq};
use crate::error::EngineError;

pub type EngineResult<T> = Result<T, EngineError>;

/// One per-VM hardware platform awareness requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HpaRequirement {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub directives: Vec<Value>,
    #[serde(rename = "flavorProperties", alias = "flavor_properties", default)]
    pub flavor_properties: Vec<FlavorProperty>,
}

/// A hardware feature the chosen flavor must (or should) expose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlavorProperty {
    #[serde(rename = "hpa-feature", alias = "feature")]
    pub feature: String,
    /// Either a bool or the strings "True"/"False". Missing means mandatory.
    #[serde(default)]
    pub mandatory: Option<Value>,
    #[serde(default)]
    pub architecture: Option<String>,
    #[serde(rename = "hpa-feature-attributes", alias = "attributes", default)]
    pub attributes: Vec<FeatureAttribute>,
}

impl FlavorProperty {
    pub fn is_mandatory(&self) -> bool {
        match &self.mandatory {
            None => true,
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
            Some(_) => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureAttribute {
    #[serde(rename = "hpa-attribute-key", alias = "key")]
    pub key: String,
    #[serde(rename = "hpa-attribute-value", alias = "value")]
    pub value: Value,
    #[serde(default)]
    pub operator: Comparator,
}

/// Capacity a VIM must have free to host the demand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VimCapacityRequest {
    #[serde(default)]
    pub controller: Option<String>,
    #[serde(rename = "vCPUs", alias = "vcpus", default)]
    pub vcpus: f64,
    #[serde(rename = "Memory", alias = "memory_mb", default)]
    pub memory_mb: f64,
    #[serde(rename = "Storage", alias = "storage_gb", default)]
    pub storage_gb: f64,
}

/// A service controller lookup issued by the service constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceQuery<'a> {
    pub constraint_name: &'a str,
    pub constraint_type: &'a str,
    pub controller: &'a str,
    pub inventory_type: &'a str,
    pub request: &'a Value,
    pub cost: f64,
    pub demand_name: &'a str,
}

/// The contract the solver needs from its external resolver.
pub trait ConstraintEngine: Send + Sync {
    /// Keep the candidates whose attributes satisfy `evaluate`.
    fn get_candidates_by_attributes(
        &self,
        demand_name: &str,
        candidates: &[Candidate],
        evaluate: &Map<String, Value>,
    ) -> EngineResult<Vec<Candidate>>;

    /// Resolve where a candidate lives.
    fn get_candidate_location(&self, candidate: &Candidate) -> EngineResult<Option<Location>>;

    /// Match candidates against one HPA requirement. Matched candidates may
    /// come back annotated with the selected flavor.
    fn get_candidates_with_hpa(
        &self,
        requirement: &HpaRequirement,
        candidates: &[Candidate],
    ) -> EngineResult<Option<Vec<Candidate>>>;

    /// Keep the candidates whose VIM has the requested capacity free.
    fn get_candidates_with_vim_capacity(
        &self,
        candidates: &[Candidate],
        request: &VimCapacityRequest,
    ) -> EngineResult<Option<Vec<Candidate>>>;

    /// Ask a service controller which candidates it can serve.
    fn get_candidates_from_service(
        &self,
        query: &ServiceQuery<'_>,
        candidates: &[Candidate],
    ) -> EngineResult<Option<Vec<Candidate>>>;
}

/// A constraint engine that answers from candidate attributes.
///
/// - attributes: equality, or membership when the expected value is an array
/// - location: `latitude` / `longitude`
/// - HPA: `flavors`, an object of flavor name → feature attributes
/// - VIM capacity: `vim_capacity` with `vcpus`, `memory_mb`, `storage_gb`
/// - service: `service_controllers`, an array of controller names
#[derive(Debug, Clone, Default)]
pub struct StaticEngine;

impl StaticEngine {
    pub fn new() -> Self {
        Self
    }

    fn flavor_matches(flavor: &Map<String, Value>, requirement: &HpaRequirement) -> bool {
        requirement
            .flavor_properties
            .iter()
            .filter(|p| p.is_mandatory())
            .all(|property| {
                let arch_ok = match (&property.architecture, flavor.get("architecture")) {
                    (None, _) => true,
                    (Some(want), Some(have)) => loose_eq(have, &Value::String(want.clone())),
                    (Some(_), None) => false,
                };
                arch_ok
                    && property.attributes.iter().all(|attr| {
                        flavor
                            .get(&attr.key)
                            .is_some_and(|have| attr.operator.holds_value(have, &attr.value))
                    })
            })
    }
}

impl ConstraintEngine for StaticEngine {
    fn get_candidates_by_attributes(
        &self,
        demand_name: &str,
        candidates: &[Candidate],
        evaluate: &Map<String, Value>,
    ) -> EngineResult<Vec<Candidate>> {
        let matched: Vec<Candidate> = candidates
            .iter()
            .filter(|c| {
                evaluate.iter().all(|(key, expected)| {
                    let Some(actual) = c.attribute(key) else {
                        return false;
                    };
                    match expected {
                        Value::Array(options) => options.iter().any(|o| loose_eq(&actual, o)),
                        other => loose_eq(&actual, other),
                    }
                })
            })
            .cloned()
            .collect();
        debug!(
            demand = demand_name,
            before = candidates.len(),
            after = matched.len(),
            "attribute evaluation"
        );
        Ok(matched)
    }

    fn get_candidate_location(&self, candidate: &Candidate) -> EngineResult<Option<Location>> {
        let (Some(lat), Some(lon)) = (candidate.number("latitude"), candidate.number("longitude"))
        else {
            return Ok(None);
        };
        Ok(Location::new(lat, lon).ok())
    }

    fn get_candidates_with_hpa(
        &self,
        requirement: &HpaRequirement,
        candidates: &[Candidate],
    ) -> EngineResult<Option<Vec<Candidate>>> {
        let mut matched = Vec::new();
        for candidate in candidates {
            let Some(Value::Object(flavors)) = candidate.attributes.get("flavors") else {
                continue;
            };
            let chosen = flavors.iter().find_map(|(name, flavor)| match flavor {
                Value::Object(f) if Self::flavor_matches(f, requirement) => Some(name.clone()),
                _ => None,
            });
            let Some(flavor_name) = chosen else { continue };

            let mut annotated = candidate.clone();
            let flavor_map = annotated
                .attributes
                .entry("flavor_map")
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(map) = flavor_map {
                map.insert(requirement.id.clone(), Value::String(flavor_name.clone()));
            }
            let directives = annotated
                .attributes
                .entry("all_directives")
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(list) = directives {
                list.push(serde_json::json!({
                    "vnfc_directives": [{
                        "id": requirement.id,
                        "type": requirement.kind,
                        "directives": requirement.directives,
                        "flavor": flavor_name,
                    }]
                }));
            }
            matched.push(annotated);
        }

        if matched.is_empty() {
            Ok(None)
        } else {
            Ok(Some(matched))
        }
    }

    fn get_candidates_with_vim_capacity(
        &self,
        candidates: &[Candidate],
        request: &VimCapacityRequest,
    ) -> EngineResult<Option<Vec<Candidate>>> {
        let matched: Vec<Candidate> = candidates
            .iter()
            .filter(|c| {
                let Some(Value::Object(free)) = c.attributes.get("vim_capacity") else {
                    return false;
                };
                let has = |key: &str, want: f64| {
                    free.get(key)
                        .and_then(value_as_f64)
                        .is_some_and(|v| v >= want)
                };
                has("vcpus", request.vcpus)
                    && has("memory_mb", request.memory_mb)
                    && has("storage_gb", request.storage_gb)
            })
            .cloned()
            .collect();
        if matched.is_empty() {
            Ok(None)
        } else {
            Ok(Some(matched))
        }
    }

    fn get_candidates_from_service(
        &self,
        query: &ServiceQuery<'_>,
        candidates: &[Candidate],
    ) -> EngineResult<Option<Vec<Candidate>>> {
        let matched: Vec<Candidate> = candidates
            .iter()
            .filter(|c| match c.attributes.get("service_controllers") {
                Some(Value::Array(controllers)) => controllers
                    .iter()
                    .any(|v| v.as_str() == Some(query.controller)),
                _ => false,
            })
            .cloned()
            .collect();
        debug!(
            demand = query.demand_name,
            controller = query.controller,
            confirmed = matched.len(),
            "service controller lookup"
        );
        if matched.is_empty() {
            Ok(None)
        } else {
            Ok(Some(matched))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cand(id: &str) -> Candidate {
        Candidate::new(id, "aai", "cloud", 1.0)
    }

    #[test]
    fn attributes_equality_and_membership() {
        let candidates = vec![
            cand("a").with_attribute("region", "us-east").with_attribute("tier", 1),
            cand("b").with_attribute("region", "eu-west").with_attribute("tier", "1"),
            cand("c").with_attribute("tier", 1),
        ];
        let evaluate = json!({"region": ["us-east", "eu-west"], "tier": 1});
        let out = StaticEngine
            .get_candidates_by_attributes("vgw", &candidates, evaluate.as_object().unwrap())
            .unwrap();
        let ids: Vec<_> = out.iter().map(|c| c.candidate_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn location_from_coordinates() {
        let c = cand("a").with_attribute("latitude", 45.0).with_attribute("longitude", "7.5");
        let loc = StaticEngine.get_candidate_location(&c).unwrap().unwrap();
        assert_eq!(loc.latitude, 45.0);
        assert_eq!(loc.longitude, 7.5);

        assert!(StaticEngine.get_candidate_location(&cand("b")).unwrap().is_none());
        let bad = cand("x").with_attribute("latitude", 123.0).with_attribute("longitude", 0.0);
        assert!(StaticEngine.get_candidate_location(&bad).unwrap().is_none());
    }

    #[test]
    fn hpa_selects_flavor_and_annotates() {
        let requirement: HpaRequirement = serde_json::from_value(json!({
            "id": "vfw",
            "type": "vnfc",
            "directives": [],
            "flavorProperties": [{
                "hpa-feature": "basicCapabilities",
                "mandatory": "True",
                "hpa-feature-attributes": [
                    {"hpa-attribute-key": "numVirtualCpu", "hpa-attribute-value": "4", "operator": ">="}
                ]
            }]
        }))
        .unwrap();
        let candidates = vec![
            cand("small").with_attribute("flavors", json!({"f.small": {"numVirtualCpu": 2}})),
            cand("big").with_attribute(
                "flavors",
                json!({"f.big": {"numVirtualCpu": 8}, "f.small": {"numVirtualCpu": 2}}),
            ),
        ];
        let out = StaticEngine
            .get_candidates_with_hpa(&requirement, &candidates)
            .unwrap()
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].candidate_id, "big");
        assert_eq!(out[0].attributes["flavor_map"]["vfw"], "f.big");
    }

    #[test]
    fn optional_hpa_features_are_ignored() {
        let requirement: HpaRequirement = serde_json::from_value(json!({
            "id": "vfw",
            "type": "vnfc",
            "flavorProperties": [{
                "hpa-feature": "sriovNICNetwork",
                "mandatory": false,
                "hpa-feature-attributes": [
                    {"hpa-attribute-key": "pciCount", "hpa-attribute-value": 2}
                ]
            }]
        }))
        .unwrap();
        let candidates = vec![cand("a").with_attribute("flavors", json!({"f1": {}}))];
        let out = StaticEngine.get_candidates_with_hpa(&requirement, &candidates).unwrap();
        assert_eq!(out.map(|v| v.len()), Some(1));
    }

    #[test]
    fn vim_capacity_checks_every_dimension() {
        let request = VimCapacityRequest {
            controller: None,
            vcpus: 4.0,
            memory_mb: 4096.0,
            storage_gb: 40.0,
        };
        let candidates = vec![
            cand("ok").with_attribute(
                "vim_capacity",
                json!({"vcpus": 8, "memory_mb": 8192, "storage_gb": 100}),
            ),
            cand("low-disk").with_attribute(
                "vim_capacity",
                json!({"vcpus": 8, "memory_mb": 8192, "storage_gb": 10}),
            ),
            cand("unknown"),
        ];
        let out = StaticEngine
            .get_candidates_with_vim_capacity(&candidates, &request)
            .unwrap()
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].candidate_id, "ok");
    }

    #[test]
    fn service_lookup_by_controller() {
        let request = json!({});
        let query = ServiceQuery {
            constraint_name: "svc",
            constraint_type: "service",
            controller: "sdnc",
            inventory_type: "service",
            request: &request,
            cost: 0.0,
            demand_name: "vgw",
        };
        let candidates = vec![
            cand("a").with_attribute("service_controllers", json!(["sdnc"])),
            cand("b").with_attribute("service_controllers", json!(["other"])),
        ];
        let out = StaticEngine
            .get_candidates_from_service(&query, &candidates)
            .unwrap()
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].candidate_id, "a");
    }
}
