//! Homing solver: constraint pipeline, objective evaluation, search.
//!
//! Given a translated plan (demands with candidate pools, constraints, one
//! objective), this crate picks one candidate per demand such that every
//! constraint holds and the objective is optimized along the way. Facts that
//! are not on the candidate record come from a [`cei::ConstraintEngine`].
//!
//! # Components
//!
//! - **`request`**: Plan ingestion and validation
//! - **`constraints`**: Candidate filters (attribute, threshold, distance, zone, HPA, ...)
//! - **`objective`**: Objective trees and their function leaves
//! - **`decision_path`**: Search state and the final decision record
//! - **`search`**: Greedy and random-pick strategies
//! - **`solver`**: Strategy selection and the search deadline
//! - **`cei`**: Constraint engine interface and a static implementation

pub mod cei;
pub mod comparator;
pub mod constraints;
pub mod decision_path;
pub mod error;
pub mod objective;
pub mod request;
pub mod search;
pub mod solver;

pub use cei::{ConstraintEngine, StaticEngine};
pub use comparator::Comparator;
pub use constraints::{Constraint, ConstraintKind, ConstraintSpec, build_constraint};
pub use decision_path::{Decision, DecisionPath};
pub use error::{EngineError, SolverError, SolverResult};
pub use objective::{Goal, Objective, ObjectiveSpec, Operator};
pub use request::{PlanSpec, SolverRequest};
pub use search::{Greedy, RandomPick, SearchStrategy, apply_constraints, strategy_for};
pub use solver::{SolveOutcome, Solver};
