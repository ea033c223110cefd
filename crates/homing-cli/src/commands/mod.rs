pub mod init;
pub mod solve;
pub mod validate;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use homing_solver::{PlanSpec, SolverRequest, StaticEngine};

/// Read a plan file and validate it into a request.
pub fn load_request(path: &Path) -> anyhow::Result<SolverRequest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading plan {}", path.display()))?;
    let plan: PlanSpec = serde_json::from_str(&content)
        .with_context(|| format!("parsing plan {}", path.display()))?;
    let request = SolverRequest::from_plan(plan, Arc::new(StaticEngine::new()))?;
    Ok(request)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::path::PathBuf;

    use tempfile::TempDir;

    pub const PLAN: &str = r#"{
        "demands": [
            {"name": "vgw", "candidates": [
                {"candidate_id": "east", "inventory_provider": "aai", "inventory_type": "cloud",
                 "cost": 3.0, "region": "us-east", "latitude": 40.7, "longitude": -74.0},
                {"candidate_id": "west", "inventory_provider": "aai", "inventory_type": "cloud",
                 "cost": 1.0, "region": "us-west", "latitude": 37.8, "longitude": -122.4}
            ]}
        ],
        "constraints": [
            {"name": "east-only", "type": "attribute", "demands": ["vgw"],
             "properties": {"evaluate": {"region": "us-east"}}}
        ],
        "objective": {"goal": "minimize", "operation_function": {"operator": "sum", "operands": [
            {"function": "cost", "params": {"demand": "vgw"}}
        ]}}
    }"#;

    pub fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }
}
