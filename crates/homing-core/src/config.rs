//! homing.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolverConfig {
    #[serde(default)]
    pub solver: SolverSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverSection {
    #[serde(default)]
    pub strategy: StrategyKind,
    /// Wall-clock budget for one search invocation. Absent means unbounded.
    pub deadline_secs: Option<u64>,
    /// Seed for the random-pick strategy. Absent means seeded from entropy.
    pub random_seed: Option<u64>,
}

impl Default for SolverSection {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::Greedy,
            deadline_secs: None,
            random_seed: None,
        }
    }
}

/// Which search strategy resolves a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Per-demand best candidate, constraint-filtered, no backtracking.
    #[default]
    Greedy,
    /// Uniformly random candidate per demand. Ignores constraints.
    RandomPick,
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Greedy => write!(f, "greedy"),
            Self::RandomPick => write!(f, "random_pick"),
        }
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "greedy" => Ok(Self::Greedy),
            "random_pick" | "random" => Ok(Self::RandomPick),
            other => Err(format!("unknown strategy: {other}")),
        }
    }
}

impl SolverConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SolverConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Scaffold a config with the defaults spelled out.
    pub fn scaffold() -> Self {
        SolverConfig {
            solver: SolverSection {
                strategy: StrategyKind::Greedy,
                deadline_secs: Some(30),
                random_seed: None,
            },
        }
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.solver.deadline_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_scaffold() {
        let config = SolverConfig::scaffold();
        let toml_str = config.to_toml_string().unwrap();
        assert!(toml_str.contains("greedy"));
        assert!(toml_str.contains("deadline_secs = 30"));
    }

    #[test]
    fn test_parse_minimal() {
        let config: SolverConfig = toml::from_str("").unwrap();
        assert_eq!(config.solver.strategy, StrategyKind::Greedy);
        assert!(config.deadline().is_none());
    }

    #[test]
    fn test_parse_random_pick() {
        let toml_str = r#"
[solver]
strategy = "random_pick"
random_seed = 7
deadline_secs = 5
"#;
        let config: SolverConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.solver.strategy, StrategyKind::RandomPick);
        assert_eq!(config.solver.random_seed, Some(7));
        assert_eq!(config.deadline(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[solver]\nstrategy = \"greedy\"\ndeadline_secs = 12").unwrap();
        let config = SolverConfig::from_file(file.path()).unwrap();
        assert_eq!(config.deadline(), Some(Duration::from_secs(12)));
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("greedy".parse::<StrategyKind>(), Ok(StrategyKind::Greedy));
        assert_eq!("random".parse::<StrategyKind>(), Ok(StrategyKind::RandomPick));
        assert!("annealing".parse::<StrategyKind>().is_err());
    }
}
