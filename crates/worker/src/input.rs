use anyhow::Context;
use premarket_core::domain::contract::{validate_plan, validate_snapshot};
use premarket_core::domain::overnight::OvernightMarketSnapshot;
use premarket_core::domain::recommendation::TradingPlan;
use serde::de::DeserializeOwned;
use std::path::Path;

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {what} file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("{what} file {} is not valid JSON for its schema", path.display()))
}

pub fn load_plan(path: &Path) -> anyhow::Result<TradingPlan> {
    let plan: TradingPlan = read_json(path, "plan")?;
    validate_plan(&plan).with_context(|| format!("plan file {} rejected", path.display()))?;
    Ok(plan)
}

pub fn load_overnight(path: &Path) -> anyhow::Result<OvernightMarketSnapshot> {
    let snapshot: OvernightMarketSnapshot = read_json(path, "overnight")?;
    validate_snapshot(&snapshot)
        .with_context(|| format!("overnight file {} rejected", path.display()))?;
    Ok(snapshot)
}

pub fn write_output(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}
