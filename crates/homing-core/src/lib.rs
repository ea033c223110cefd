pub mod config;
pub mod error;
pub mod geo;
pub mod types;

pub use config::{SolverConfig, StrategyKind};
pub use error::{CoreError, CoreResult};
pub use types::*;
