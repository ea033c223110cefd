//! Constraint library.
//!
//! Each constraint type is a filter over one demand's candidate list:
//! `solve(path, candidates, request) -> candidates'`. Constraints are built
//! once per plan from a [`ConstraintSpec`] and hold only read-only,
//! construction-time-parsed properties afterwards, so one plan's
//! constraints can be shared across concurrent searches.
//!
//! # Types
//!
//! | tag | filter |
//! |---|---|
//! | `attribute` | candidate attributes, evaluated by the constraint engine |
//! | `threshold` | one numeric attribute against a fixed threshold |
//! | `distance_between_demands` | distance to already-placed sibling demands |
//! | `aggregation` | aggregate attribute across the constraint's demands |
//! | `hpa` | hardware platform awareness, via the constraint engine |
//! | `vim_fit` | VIM capacity, via the constraint engine |
//! | `service` | service controller confirmation for one inventory type |
//! | `zone` | same/different zone as already-placed sibling demands |

mod aggregation;
mod attribute;
mod cloud_distance;
mod hpa;
mod service;
mod threshold;
mod vim_fit;
mod zone;

pub use aggregation::{AggregationConstraint, AggregationFunction, AggregationRule};
pub use attribute::AttributeConstraint;
pub use cloud_distance::{CloudDistanceConstraint, DistanceRule};
pub use hpa::HpaConstraint;
pub use service::ServiceConstraint;
pub use threshold::ThresholdConstraint;
pub use vim_fit::VimFitConstraint;
pub use zone::{ZoneConstraint, ZoneQualifier};

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use homing_core::Candidate;

use crate::decision_path::DecisionPath;
use crate::error::{SolverError, SolverResult};
use crate::request::SolverRequest;

/// Descriptor of a constraint as handed over by the template translator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub demands: Vec<String>,
    /// Application order, ascending. Defaults per type.
    #[serde(default)]
    pub priority: Option<u32>,
    #[serde(default)]
    pub properties: Value,
}

/// Registered constraint types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    Attribute,
    Threshold,
    DistanceBetweenDemands,
    Aggregation,
    Hpa,
    VimFit,
    Service,
    Zone,
}

impl ConstraintKind {
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "attribute" => Some(Self::Attribute),
            "threshold" => Some(Self::Threshold),
            "distance_between_demands" | "cloud_distance" => Some(Self::DistanceBetweenDemands),
            "aggregation" | "cross_demand_attribute_aggregation" => Some(Self::Aggregation),
            "hpa" => Some(Self::Hpa),
            "vim_fit" => Some(Self::VimFit),
            "service" => Some(Self::Service),
            "zone" => Some(Self::Zone),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Attribute => "attribute",
            Self::Threshold => "threshold",
            Self::DistanceBetweenDemands => "distance_between_demands",
            Self::Aggregation => "aggregation",
            Self::Hpa => "hpa",
            Self::VimFit => "vim_fit",
            Self::Service => "service",
            Self::Zone => "zone",
        }
    }

    /// Rank used when a descriptor does not set `priority`.
    pub fn default_priority(self) -> u32 {
        match self {
            Self::VimFit => 1,
            Self::Hpa => 2,
            Self::Service => 3,
            Self::Attribute => 4,
            Self::Threshold => 5,
            Self::Zone => 6,
            Self::DistanceBetweenDemands => 7,
            Self::Aggregation => 8,
        }
    }

    /// Types that compare decisions across demands need at least two.
    fn requires_multiple_demands(self) -> bool {
        matches!(
            self,
            Self::DistanceBetweenDemands | Self::Aggregation | Self::Zone
        )
    }
}

impl std::fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fields every constraint carries.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintInfo {
    pub name: String,
    pub kind: ConstraintKind,
    pub demands: Vec<String>,
    pub priority: u32,
}

impl ConstraintInfo {
    pub fn applies_to(&self, demand: &str) -> bool {
        self.demands.iter().any(|d| d == demand)
    }

    /// Sibling demands in scope that already have a committed decision.
    pub fn decided_siblings<'p>(&self, path: &'p DecisionPath) -> Vec<(&str, &'p Candidate)> {
        let current = path.current_demand.as_deref();
        self.demands
            .iter()
            .filter(|d| Some(d.as_str()) != current)
            .filter_map(|d| path.decided(d).map(|c| (d.as_str(), c)))
            .collect()
    }

    pub(crate) fn invalid(&self, reason: impl Into<String>) -> SolverError {
        SolverError::InvalidConstraint {
            name: self.name.clone(),
            reason: reason.into(),
        }
    }
}

/// A candidate filter for one demand.
pub trait Constraint: Send + Sync + std::fmt::Debug {
    fn info(&self) -> &ConstraintInfo;

    /// Filter `candidates` for `path.current_demand`.
    ///
    /// The result holds no candidate that was not in the input. Types that
    /// delegate to the constraint engine may return engine-annotated copies.
    fn solve(
        &self,
        path: &DecisionPath,
        candidates: Vec<Candidate>,
        request: &SolverRequest,
    ) -> SolverResult<Vec<Candidate>>;

    fn name(&self) -> &str {
        &self.info().name
    }

    fn priority(&self) -> u32 {
        self.info().priority
    }
}

/// Resolve a descriptor into its constraint implementation.
pub fn build_constraint(spec: &ConstraintSpec) -> SolverResult<Box<dyn Constraint>> {
    let kind = ConstraintKind::parse(&spec.kind).ok_or_else(|| {
        SolverError::UnknownConstraintType {
            name: spec.name.clone(),
            kind: spec.kind.clone(),
        }
    })?;

    let info = ConstraintInfo {
        name: spec.name.clone(),
        kind,
        demands: spec.demands.clone(),
        priority: spec.priority.unwrap_or_else(|| kind.default_priority()),
    };

    if info.demands.is_empty() {
        return Err(info.invalid("no demands in scope"));
    }
    let distinct: HashSet<&str> = info.demands.iter().map(String::as_str).collect();
    if kind.requires_multiple_demands() && distinct.len() <= 1 {
        return Err(info.invalid(format!("{kind} needs at least two demands")));
    }

    let props = &spec.properties;
    let constraint: Box<dyn Constraint> = match kind {
        ConstraintKind::Attribute => Box::new(AttributeConstraint::new(info, props)?),
        ConstraintKind::Threshold => Box::new(ThresholdConstraint::new(info, props)?),
        ConstraintKind::DistanceBetweenDemands => {
            Box::new(CloudDistanceConstraint::new(info, props)?)
        }
        ConstraintKind::Aggregation => Box::new(AggregationConstraint::new(info, props)?),
        ConstraintKind::Hpa => Box::new(HpaConstraint::new(info, props)?),
        ConstraintKind::VimFit => Box::new(VimFitConstraint::new(info, props)?),
        ConstraintKind::Service => Box::new(ServiceConstraint::new(info, props)?),
        ConstraintKind::Zone => Box::new(ZoneConstraint::new(info, props)?),
    };
    Ok(constraint)
}

/// Deserialize type-specific properties, reporting failures against the
/// constraint's name.
pub(crate) fn parse_properties<T: DeserializeOwned>(
    info: &ConstraintInfo,
    properties: &Value,
) -> SolverResult<T> {
    serde_json::from_value(properties.clone())
        .map_err(|e| info.invalid(format!("bad properties: {e}")))
}
