//! Objective functions: the leaves of an objective tree.
//!
//! A function turns its template parameters into arguments against the
//! current decision path (`get_args_from_params`) and reduces those to a
//! number (`compute`). Functions are looked up by name once, when the plan
//! is built.

use serde::{Deserialize, Serialize};

use homing_core::geo::air_distance_km;
use homing_core::{Candidate, Location};

use crate::decision_path::DecisionPath;
use crate::error::{SolverError, SolverResult};
use crate::request::SolverRequest;

/// Parameter bindings of a function leaf.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionParams {
    #[serde(default)]
    pub demand: Option<String>,
    #[serde(default)]
    pub demands: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub attribute: Option<String>,
}

impl FunctionParams {
    /// Every demand this leaf reads, in binding order.
    pub fn referenced_demands(&self) -> Vec<&str> {
        self.demand
            .iter()
            .chain(self.demands.iter())
            .map(String::as_str)
            .collect()
    }
}

/// A resolved function argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Candidate(Candidate),
    Location(Location),
    Number(f64),
    Text(String),
}

pub trait ObjectiveFunction: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &'static str;

    /// Check the parameter shape at plan build time.
    fn validate(&self, params: &FunctionParams) -> SolverResult<()>;

    /// Bind parameters against the path. A demand parameter resolves to the
    /// candidate decided (or assumed) for it; a location parameter to the
    /// plan's named location.
    fn get_args_from_params(
        &self,
        path: &DecisionPath,
        request: &SolverRequest,
        params: &FunctionParams,
    ) -> SolverResult<Vec<Argument>>;

    fn compute(&self, args: &[Argument]) -> SolverResult<f64>;
}

/// Function registry.
pub fn lookup(name: &str) -> Option<Box<dyn ObjectiveFunction>> {
    match name {
        "distance_between" => Some(Box::new(DistanceBetween)),
        "latency_between" => Some(Box::new(LatencyBetween)),
        "attribute" => Some(Box::new(AttributeOf)),
        "cost" => Some(Box::new(CostOf)),
        _ => None,
    }
}

fn decided<'p>(path: &'p DecisionPath, demand: &str) -> SolverResult<&'p Candidate> {
    path.decisions
        .get(demand)
        .ok_or_else(|| SolverError::UndecidedDemand(demand.to_string()))
}

fn named_location(request: &SolverRequest, name: &str) -> SolverResult<Location> {
    request
        .locations
        .get(name)
        .copied()
        .ok_or_else(|| SolverError::UnknownLocation(name.to_string()))
}

fn candidate_location(request: &SolverRequest, candidate: &Candidate) -> SolverResult<Location> {
    request
        .engine
        .get_candidate_location(candidate)?
        .ok_or_else(|| SolverError::MissingLocation(candidate.candidate_id.clone()))
}

fn shape_error(function: &str, expected: &str) -> SolverError {
    SolverError::InvalidObjective(format!("{function} expects {expected}"))
}

fn require_demand<'a>(function: &str, params: &'a FunctionParams) -> SolverResult<&'a str> {
    params
        .demand
        .as_deref()
        .ok_or_else(|| shape_error(function, "a demand parameter"))
}

/// Great-circle distance in km between two endpoints: a demand and a
/// location, or two demands.
#[derive(Debug)]
pub struct DistanceBetween;

impl ObjectiveFunction for DistanceBetween {
    fn name(&self) -> &'static str {
        "distance_between"
    }

    fn validate(&self, params: &FunctionParams) -> SolverResult<()> {
        let endpoints = params.referenced_demands().len() + usize::from(params.location.is_some());
        if endpoints == 2 {
            Ok(())
        } else {
            Err(shape_error(self.name(), "exactly two endpoints (demands or a location)"))
        }
    }

    fn get_args_from_params(
        &self,
        path: &DecisionPath,
        request: &SolverRequest,
        params: &FunctionParams,
    ) -> SolverResult<Vec<Argument>> {
        let mut args = Vec::with_capacity(2);
        for demand in params.referenced_demands() {
            let candidate = decided(path, demand)?;
            args.push(Argument::Location(candidate_location(request, candidate)?));
        }
        if let Some(location) = &params.location {
            args.push(Argument::Location(named_location(request, location)?));
        }
        Ok(args)
    }

    fn compute(&self, args: &[Argument]) -> SolverResult<f64> {
        match args {
            [Argument::Location(a), Argument::Location(b)] => Ok(air_distance_km(a, b)),
            _ => Err(shape_error(self.name(), "two locations")),
        }
    }
}

/// Latency weight between a demand's candidate and a location, looked up
/// by the candidate's `country` in the plan's latency table. Unknown
/// countries get the worst weight in the table.
#[derive(Debug)]
pub struct LatencyBetween;

impl ObjectiveFunction for LatencyBetween {
    fn name(&self) -> &'static str {
        "latency_between"
    }

    fn validate(&self, params: &FunctionParams) -> SolverResult<()> {
        if params.demand.is_some() && params.demands.is_empty() && params.location.is_some() {
            Ok(())
        } else {
            Err(shape_error(self.name(), "a demand and a location"))
        }
    }

    fn get_args_from_params(
        &self,
        path: &DecisionPath,
        request: &SolverRequest,
        params: &FunctionParams,
    ) -> SolverResult<Vec<Argument>> {
        let candidate = decided(path, require_demand(self.name(), params)?)?;
        if let Some(location) = &params.location {
            named_location(request, location)?;
        }
        let worst = request
            .latency_weights
            .values()
            .copied()
            .fold(0.0_f64, f64::max);
        let weight = candidate
            .text("country")
            .and_then(|country| request.latency_weights.get(&country).copied())
            .unwrap_or(worst);
        Ok(vec![Argument::Number(weight)])
    }

    fn compute(&self, args: &[Argument]) -> SolverResult<f64> {
        match args {
            [Argument::Number(weight)] => Ok(*weight),
            _ => Err(shape_error(self.name(), "one latency weight")),
        }
    }
}

/// A numeric attribute of a demand's candidate.
#[derive(Debug)]
pub struct AttributeOf;

impl ObjectiveFunction for AttributeOf {
    fn name(&self) -> &'static str {
        "attribute"
    }

    fn validate(&self, params: &FunctionParams) -> SolverResult<()> {
        if params.demand.is_some() && params.demands.is_empty() && params.attribute.is_some() {
            Ok(())
        } else {
            Err(shape_error(self.name(), "a demand and an attribute"))
        }
    }

    fn get_args_from_params(
        &self,
        path: &DecisionPath,
        _request: &SolverRequest,
        params: &FunctionParams,
    ) -> SolverResult<Vec<Argument>> {
        let candidate = decided(path, require_demand(self.name(), params)?)?;
        let attribute = params
            .attribute
            .clone()
            .ok_or_else(|| shape_error(self.name(), "an attribute parameter"))?;
        Ok(vec![
            Argument::Candidate(candidate.clone()),
            Argument::Text(attribute),
        ])
    }

    fn compute(&self, args: &[Argument]) -> SolverResult<f64> {
        match args {
            [Argument::Candidate(candidate), Argument::Text(attribute)] => {
                Ok(candidate.require_number(attribute)?)
            }
            _ => Err(shape_error(self.name(), "a candidate and an attribute name")),
        }
    }
}

/// The inventory cost of a demand's candidate.
#[derive(Debug)]
pub struct CostOf;

impl ObjectiveFunction for CostOf {
    fn name(&self) -> &'static str {
        "cost"
    }

    fn validate(&self, params: &FunctionParams) -> SolverResult<()> {
        if params.demand.is_some() && params.demands.is_empty() {
            Ok(())
        } else {
            Err(shape_error(self.name(), "a demand"))
        }
    }

    fn get_args_from_params(
        &self,
        path: &DecisionPath,
        _request: &SolverRequest,
        params: &FunctionParams,
    ) -> SolverResult<Vec<Argument>> {
        let candidate = decided(path, require_demand(self.name(), params)?)?;
        Ok(vec![Argument::Number(candidate.cost)])
    }

    fn compute(&self, args: &[Argument]) -> SolverResult<f64> {
        match args {
            [Argument::Number(cost)] => Ok(*cost),
            _ => Err(shape_error(self.name(), "a cost")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::test_support::*;

    fn params(demand: &str) -> FunctionParams {
        FunctionParams {
            demand: Some(demand.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn registry_knows_builtin_functions() {
        for name in ["distance_between", "latency_between", "attribute", "cost"] {
            assert_eq!(lookup(name).map(|f| f.name()), Some(name));
        }
        assert!(lookup("hpa_score").is_none());
    }

    #[test]
    fn distance_between_demand_and_location() {
        let mut request = request(&["vgw"]);
        request
            .locations
            .insert("customer".into(), Location::new(1.0, 0.0).unwrap());
        let mut path = path_at("vgw", vec![]);
        path.assume(
            "vgw",
            cand("a").with_attribute("latitude", 0.0).with_attribute("longitude", 0.0),
        )
        .unwrap();

        let p = FunctionParams {
            location: Some("customer".into()),
            ..params("vgw")
        };
        let f = DistanceBetween;
        f.validate(&p).unwrap();
        let args = f.get_args_from_params(&path, &request, &p).unwrap();
        let d = f.compute(&args).unwrap();
        assert!((d - 111.19).abs() < 0.01, "got {d}");
    }

    #[test]
    fn distance_between_needs_two_endpoints() {
        assert!(DistanceBetween.validate(&params("vgw")).is_err());
        let three = FunctionParams {
            demands: vec!["a".into(), "b".into()],
            location: Some("x".into()),
            ..params("c")
        };
        assert!(DistanceBetween.validate(&three).is_err());
    }

    #[test]
    fn undecided_demand_fails_fast() {
        let request = request(&["vgw"]);
        let path = DecisionPath::new();
        let p = FunctionParams {
            attribute: Some("latency".into()),
            ..params("vgw")
        };
        let err = AttributeOf
            .get_args_from_params(&path, &request, &p)
            .unwrap_err();
        assert!(matches!(err, SolverError::UndecidedDemand(_)));
    }

    #[test]
    fn attribute_requires_numeric_value() {
        let args = vec![
            Argument::Candidate(cand("a").with_attribute("latency", "slow")),
            Argument::Text("latency".into()),
        ];
        assert!(matches!(
            AttributeOf.compute(&args),
            Err(SolverError::Core(_))
        ));
    }

    #[test]
    fn latency_uses_country_weight_or_worst() {
        let mut request = request(&["vgw"]);
        request
            .locations
            .insert("customer".into(), Location::new(0.0, 0.0).unwrap());
        request.latency_weights.insert("US".into(), 1.0);
        request.latency_weights.insert("FR".into(), 4.0);
        let p = FunctionParams {
            location: Some("customer".into()),
            ..params("vgw")
        };

        let mut path = path_at("vgw", vec![]);
        path.assume("vgw", cand("us").with_attribute("country", "US")).unwrap();
        let args = LatencyBetween.get_args_from_params(&path, &request, &p).unwrap();
        assert_eq!(LatencyBetween.compute(&args).unwrap(), 1.0);

        path.assume("vgw", cand("jp").with_attribute("country", "JP")).unwrap();
        let args = LatencyBetween.get_args_from_params(&path, &request, &p).unwrap();
        assert_eq!(LatencyBetween.compute(&args).unwrap(), 4.0);
    }

    #[test]
    fn cost_reads_candidate_cost() {
        let request = request(&["vgw"]);
        let mut path = path_at("vgw", vec![]);
        path.assume("vgw", Candidate::new("a", "aai", "cloud", 3.5)).unwrap();
        let args = CostOf.get_args_from_params(&path, &request, &params("vgw")).unwrap();
        assert_eq!(CostOf.compute(&args).unwrap(), 3.5);
    }
}
