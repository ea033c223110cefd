//! Solver error types.

use thiserror::Error;

/// Errors that can occur while building or solving a plan.
///
/// Infeasibility is not an error: searches report it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("invalid constraint {name}: {reason}")]
    InvalidConstraint { name: String, reason: String },

    #[error("unknown constraint type {kind} in constraint {name}")]
    UnknownConstraintType { name: String, kind: String },

    #[error("unknown demand: {0}")]
    UnknownDemand(String),

    #[error("unknown location: {0}")]
    UnknownLocation(String),

    #[error("unknown objective function: {0}")]
    UnknownFunction(String),

    #[error("unknown operator: {0}")]
    UnknownOperator(String),

    #[error("invalid objective: {0}")]
    InvalidObjective(String),

    #[error("demand {0} is referenced before it is decided")]
    UndecidedDemand(String),

    #[error("demand {0} is already decided on this path")]
    AlreadyDecided(String),

    #[error("no location for candidate {0}")]
    MissingLocation(String),

    #[error("constraint engine error: {0}")]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Core(#[from] homing_core::CoreError),

    #[error("search task failed: {0}")]
    Join(String),
}

impl SolverError {
    /// A candidate record lacks what the objective reads. The candidate is
    /// unscorable, the plan is not broken.
    pub fn is_candidate_mismatch(&self) -> bool {
        matches!(
            self,
            Self::MissingLocation(_)
                | Self::Core(
                    homing_core::CoreError::MissingAttribute { .. }
                        | homing_core::CoreError::NotNumeric { .. }
                )
        )
    }
}

pub type SolverResult<T> = Result<T, SolverError>;

/// Failures of the external constraint engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("constraint engine unavailable: {0}")]
    Unavailable(String),

    #[error("bad response from constraint engine: {0}")]
    BadResponse(String),
}
