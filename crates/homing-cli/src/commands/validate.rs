use std::path::Path;

use serde_json::json;

pub fn validate(plan: &Path) -> anyhow::Result<()> {
    let summary = summarize(plan)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn summarize(plan: &Path) -> anyhow::Result<serde_json::Value> {
    let request = super::load_request(plan)?;
    let demands: Vec<&str> = request.demands.iter().map(|d| d.name.as_str()).collect();
    let constraints: Vec<_> = request
        .constraints
        .iter()
        .map(|c| json!({"name": c.name(), "type": c.info().kind.as_str(), "priority": c.priority()}))
        .collect();
    Ok(json!({
        "status": "valid",
        "goal": request.objective.goal,
        "demands": demands,
        "constraints": constraints,
    }))
}
