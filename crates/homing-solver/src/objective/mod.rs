//! Generic objective evaluator.
//!
//! An objective is a goal plus a tree of operation nodes. Each node reduces
//! its operands with an operator; an operand is either a function leaf or
//! a nested node, optionally rescaled by a linear normalization range and a
//! weight:
//!
//! ```text
//! operand = weight * (raw - start) / (end - start)
//! ```
//!
//! During a search, a leaf only contributes once every demand it references
//! is decided (or assumed) on the path. Leaves that are not active yet are
//! left out of their parent's reduction, and a node with no active operand
//! is itself inactive.

pub mod functions;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use homing_core::Location;

use crate::decision_path::DecisionPath;
use crate::error::{SolverError, SolverResult};
use crate::request::SolverRequest;

pub use functions::{Argument, FunctionParams, ObjectiveFunction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Goal {
    #[default]
    #[serde(alias = "min")]
    Minimize,
    #[serde(alias = "max")]
    Maximize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Sum,
    Min,
    Max,
    Product,
    Average,
}

impl Operator {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sum" => Some(Self::Sum),
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            "product" | "multiply" => Some(Self::Product),
            "average" | "avg" => Some(Self::Average),
            _ => None,
        }
    }

    /// Reduce a non-empty list of operand values.
    pub fn reduce(self, values: &[f64]) -> f64 {
        match self {
            Self::Sum => values.iter().sum(),
            Self::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Self::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Self::Product => values.iter().product(),
            Self::Average => values.iter().sum::<f64>() / values.len() as f64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Normalization {
    pub start: f64,
    pub end: f64,
}

impl Normalization {
    /// Linear rescale. Not clamped.
    pub fn apply(&self, value: f64) -> f64 {
        (value - self.start) / (self.end - self.start)
    }
}

// ── Template descriptors ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveSpec {
    pub goal: Goal,
    pub operation_function: OperationSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationSpec {
    pub operator: String,
    pub operands: Vec<OperandSpec>,
}

/// Exactly one of `function` or `operation_function` must be set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OperandSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<FunctionParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_function: Option<OperationSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalization: Option<Normalization>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

/// What an objective may reference, checked while building it.
pub struct ObjectiveScope<'a> {
    pub demands: &'a HashSet<String>,
    pub locations: &'a HashMap<String, Location>,
}

// ── Resolved tree ───────────────────────────────────────────────────

#[derive(Debug)]
pub struct Objective {
    pub goal: Goal,
    root: OperationNode,
}

#[derive(Debug)]
struct OperationNode {
    operator: Operator,
    operands: Vec<Operand>,
}

#[derive(Debug)]
struct Operand {
    kind: OperandKind,
    normalization: Option<Normalization>,
    weight: Option<f64>,
}

#[derive(Debug)]
enum OperandKind {
    Function {
        function: Box<dyn ObjectiveFunction>,
        params: FunctionParams,
    },
    Operation(OperationNode),
}

impl Objective {
    /// Resolve operator and function names and check every reference.
    pub fn from_spec(spec: &ObjectiveSpec, scope: &ObjectiveScope<'_>) -> SolverResult<Self> {
        Ok(Self {
            goal: spec.goal,
            root: OperationNode::from_spec(&spec.operation_function, scope)?,
        })
    }

    /// An objective that always scores zero.
    pub fn empty() -> Self {
        Self {
            goal: Goal::Minimize,
            root: OperationNode {
                operator: Operator::Sum,
                operands: Vec::new(),
            },
        }
    }

    /// Score the path. No active operand scores `0.0`.
    pub fn evaluate(&self, path: &DecisionPath, request: &SolverRequest) -> SolverResult<f64> {
        Ok(self.root.evaluate(path, request)?.unwrap_or(0.0))
    }

    /// Set `cumulated_value` to the score and refresh the totals.
    pub fn compute(&self, path: &mut DecisionPath, request: &SolverRequest) -> SolverResult<()> {
        path.cumulated_value = self.evaluate(path, request)?;
        path.refresh_totals();
        Ok(())
    }

    /// Every demand referenced anywhere in the tree.
    pub fn referenced_demands(&self) -> HashSet<String> {
        let mut out = HashSet::new();
        self.root.collect_demands(&mut out);
        out
    }
}

impl OperationNode {
    fn from_spec(spec: &OperationSpec, scope: &ObjectiveScope<'_>) -> SolverResult<Self> {
        let operator = Operator::parse(&spec.operator)
            .ok_or_else(|| SolverError::UnknownOperator(spec.operator.clone()))?;
        if spec.operands.is_empty() {
            return Err(SolverError::InvalidObjective(format!(
                "operator {} has no operands",
                spec.operator
            )));
        }
        let operands = spec
            .operands
            .iter()
            .map(|o| Operand::from_spec(o, scope))
            .collect::<SolverResult<Vec<_>>>()?;
        Ok(Self { operator, operands })
    }

    fn evaluate(&self, path: &DecisionPath, request: &SolverRequest) -> SolverResult<Option<f64>> {
        let mut values = Vec::with_capacity(self.operands.len());
        for operand in &self.operands {
            if let Some(v) = operand.evaluate(path, request)? {
                values.push(v);
            }
        }
        if values.is_empty() {
            Ok(None)
        } else {
            Ok(Some(self.operator.reduce(&values)))
        }
    }

    fn collect_demands(&self, out: &mut HashSet<String>) {
        for operand in &self.operands {
            match &operand.kind {
                OperandKind::Function { params, .. } => {
                    out.extend(params.referenced_demands().into_iter().map(String::from));
                }
                OperandKind::Operation(node) => node.collect_demands(out),
            }
        }
    }
}

impl Operand {
    fn from_spec(spec: &OperandSpec, scope: &ObjectiveScope<'_>) -> SolverResult<Self> {
        if let Some(n) = &spec.normalization {
            if !(n.start.is_finite() && n.end.is_finite()) || n.start == n.end {
                return Err(SolverError::InvalidObjective(format!(
                    "normalization range [{}, {}] is empty",
                    n.start, n.end
                )));
            }
        }
        if let Some(w) = spec.weight {
            if !w.is_finite() {
                return Err(SolverError::InvalidObjective("weight must be finite".into()));
            }
        }

        let kind = match (&spec.function, &spec.operation_function) {
            (Some(name), None) => {
                let function = functions::lookup(name)
                    .ok_or_else(|| SolverError::UnknownFunction(name.clone()))?;
                let params = spec.params.clone().unwrap_or_default();
                function.validate(&params)?;
                for demand in params.referenced_demands() {
                    if !scope.demands.contains(demand) {
                        return Err(SolverError::UnknownDemand(demand.to_string()));
                    }
                }
                if let Some(location) = &params.location {
                    if !scope.locations.contains_key(location) {
                        return Err(SolverError::UnknownLocation(location.clone()));
                    }
                }
                OperandKind::Function { function, params }
            }
            (None, Some(nested)) => OperandKind::Operation(OperationNode::from_spec(nested, scope)?),
            _ => {
                return Err(SolverError::InvalidObjective(
                    "operand needs exactly one of function or operation_function".into(),
                ));
            }
        };

        Ok(Self {
            kind,
            normalization: spec.normalization,
            weight: spec.weight,
        })
    }

    fn evaluate(&self, path: &DecisionPath, request: &SolverRequest) -> SolverResult<Option<f64>> {
        let raw = match &self.kind {
            OperandKind::Function { function, params } => {
                let active = params
                    .referenced_demands()
                    .iter()
                    .all(|d| path.decisions.contains_key(*d));
                if !active {
                    return Ok(None);
                }
                let args = function.get_args_from_params(path, request, params)?;
                function.compute(&args)?
            }
            OperandKind::Operation(node) => match node.evaluate(path, request)? {
                Some(v) => v,
                None => return Ok(None),
            },
        };

        let mut value = raw;
        if let Some(n) = &self.normalization {
            value = n.apply(value);
        }
        if let Some(w) = self.weight {
            value *= w;
        }
        Ok(Some(value))
    }
}
