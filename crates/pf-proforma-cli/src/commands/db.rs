use serde_json::{json, Value};

use pf_proforma_core::store::seed_snapshot;

use super::RunContext;

/// Recreate the store from scratch with the sample projects. Any previous
/// projects and results at the same path are replaced.
pub fn run_init_db(ctx: &RunContext) -> Result<Value, Box<dyn std::error::Error>> {
    let snapshot = seed_snapshot();
    let (projects, financing) = (snapshot.projects.len(), snapshot.financing.len());
    ctx.store.create(snapshot)?;

    Ok(json!({
        "result": {
            "store": ctx.store.to_string(),
            "projects": projects,
            "financing": financing,
        }
    }))
}
