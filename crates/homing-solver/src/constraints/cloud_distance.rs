//! Distance between demands: a candidate must lie within (or beyond) a
//! configured distance of every sibling demand that is already placed.
//!
//! Passes everything through while no sibling is decided.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use homing_core::Candidate;
use homing_core::geo::DistanceUnit;

use super::{Constraint, ConstraintInfo, parse_properties};
use crate::comparator::Comparator;
use crate::decision_path::DecisionPath;
use crate::error::{SolverError, SolverResult};
use crate::request::SolverRequest;

/// `distance(candidate, sibling) <operator> value` in `unit`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceRule {
    pub value: f64,
    pub operator: Comparator,
    pub unit: DistanceUnit,
}

impl DistanceRule {
    /// Parse the compact template form, e.g. `"< 250 km"`.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.split_whitespace();
        let operator = Comparator::parse(parts.next()?)?;
        let value = parts.next()?.parse::<f64>().ok()?;
        let unit = match parts.next() {
            Some(u) => DistanceUnit::parse(u)?,
            None => DistanceUnit::Km,
        };
        if parts.next().is_some() {
            return None;
        }
        Some(Self {
            value,
            operator,
            unit,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DistanceSpec {
    Structured {
        value: f64,
        operator: Comparator,
        #[serde(default)]
        unit: DistanceUnit,
    },
    Compact(String),
}

#[derive(Debug, Deserialize)]
struct DistanceProperties {
    distance: DistanceSpec,
}

#[derive(Debug)]
pub struct CloudDistanceConstraint {
    info: ConstraintInfo,
    rule: DistanceRule,
}

impl CloudDistanceConstraint {
    pub fn new(info: ConstraintInfo, properties: &Value) -> SolverResult<Self> {
        let props: DistanceProperties = parse_properties(&info, properties)?;
        let rule = match props.distance {
            DistanceSpec::Structured {
                value,
                operator,
                unit,
            } => DistanceRule {
                value,
                operator,
                unit,
            },
            DistanceSpec::Compact(text) => DistanceRule::parse(&text)
                .ok_or_else(|| info.invalid(format!("cannot parse distance {text:?}")))?,
        };
        if !rule.value.is_finite() || rule.value < 0.0 {
            return Err(info.invalid("distance must be a non-negative number"));
        }
        Ok(Self { info, rule })
    }

    pub fn rule(&self) -> DistanceRule {
        self.rule
    }
}

impl Constraint for CloudDistanceConstraint {
    fn info(&self) -> &ConstraintInfo {
        &self.info
    }

    fn solve(
        &self,
        path: &DecisionPath,
        candidates: Vec<Candidate>,
        request: &SolverRequest,
    ) -> SolverResult<Vec<Candidate>> {
        let siblings = self.info.decided_siblings(path);
        if siblings.is_empty() {
            return Ok(candidates);
        }

        let mut sibling_locations = Vec::with_capacity(siblings.len());
        for (demand, chosen) in &siblings {
            let location = request
                .engine
                .get_candidate_location(chosen)?
                .ok_or_else(|| SolverError::MissingLocation(format!("{demand}:{}", chosen.candidate_id)))?;
            sibling_locations.push(location);
        }

        let mut filtered = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let Some(location) = request.engine.get_candidate_location(&candidate)? else {
                debug!(candidate = %candidate.candidate_id, "no location, rejecting");
                continue;
            };
            let fits = sibling_locations.iter().all(|other| {
                let d = self.rule.unit.distance(&location, other);
                self.rule.operator.holds(d, self.rule.value)
            });
            if fits {
                filtered.push(candidate);
            }
        }
        debug!(
            constraint = %self.info.name,
            siblings = siblings.len(),
            remaining = filtered.len(),
            "distance filter"
        );
        Ok(filtered)
    }
}
