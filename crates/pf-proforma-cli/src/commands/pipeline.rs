use clap::Args;
use serde_json::{json, Value};
use std::path::PathBuf;

use super::model::{self, RunModelArgs, SummarizeArgs};
use super::sensitivity::{self, SensitivityArgs};
use super::RunContext;

/// Arguments for the full pipeline
#[derive(Args)]
pub struct AllArgs {
    /// Project id in the store
    #[arg(long)]
    pub project_id: i64,

    /// Directory for the summary and CSV (defaults to reports.dir)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

/// Model run, then summary, then sensitivity. The first failing stage aborts.
pub fn run_all(args: AllArgs, ctx: &RunContext) -> Result<Value, Box<dyn std::error::Error>> {
    let project_id = args.project_id;

    tracing::info!(project_id, "Running model");
    let run = model::run_model(RunModelArgs { project_id }, ctx)?;

    tracing::info!(project_id, "Generating summary");
    let summary = model::run_summarize(
        SummarizeArgs {
            project_id,
            out_dir: args.out_dir.clone(),
        },
        ctx,
    )?;

    tracing::info!(project_id, "Running sensitivity");
    let sweep = sensitivity::run_sensitivity(
        SensitivityArgs {
            project_id,
            out_dir: args.out_dir,
        },
        ctx,
    )?;

    tracing::info!(project_id, "Pipeline complete");

    let mut result = run.get("result").cloned().unwrap_or(Value::Null);
    if let Value::Object(ref mut map) = result {
        map.insert("summary_path".into(), summary["result"]["summary_path"].clone());
        map.insert("csv_path".into(), sweep["csv_path"].clone());
        map.insert("sensitivity_failed".into(), sweep["failed"].clone());
    }

    let mut warnings: Vec<Value> = Vec::new();
    for stage in [&run, &sweep] {
        if let Some(Value::Array(ws)) = stage.get("warnings") {
            warnings.extend(ws.iter().cloned());
        }
    }

    Ok(json!({
        "result": result,
        "methodology": run.get("methodology").cloned().unwrap_or(Value::Null),
        "warnings": warnings,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::db::run_init_db;
    use crate::config::Settings;
    use pf_proforma_core::store::StoreLocation;
    use rust_decimal_macros::dec;
    use std::fs;

    fn sqlite_context(dir: &std::path::Path) -> RunContext {
        let mut settings = Settings::default();
        settings.database.url = Some(format!("sqlite:///{}", dir.join("proforma.db").display()));
        settings.reports.dir = dir.join("reports");
        RunContext::new(settings, None).unwrap()
    }

    #[test]
    fn test_pipeline_against_sqlite_store() {
        let dir = std::env::temp_dir().join(format!("pf-cli-pipeline-{}", std::process::id()));
        let ctx = sqlite_context(&dir);
        assert_eq!(ctx.store, StoreLocation::Sqlite(dir.join("proforma.db")));

        let init = run_init_db(&ctx).unwrap();
        assert_eq!(init["result"]["projects"], 3);

        let out = run_all(AllArgs { project_id: 1, out_dir: None }, &ctx).unwrap();
        assert_eq!(out["result"]["result_id"], 1);
        assert_eq!(out["result"]["sensitivity_failed"], 0);

        let summary = dir.join("reports").join("project_1_summary.md");
        assert!(fs::read_to_string(&summary).unwrap().contains("- NPV (8% discount):"));
        assert!(dir.join("reports").join("sensitivity_project_1.csv").is_file());

        // A later settings change must not relabel the stored run
        let mut rerated = sqlite_context(&dir);
        rerated.model.discount_rate = dec!(0.10);
        model::run_summarize(SummarizeArgs { project_id: 1, out_dir: None }, &rerated).unwrap();
        let md = fs::read_to_string(&summary).unwrap();
        assert!(md.contains("- NPV (8% discount):"), "{md}");
        assert!(!md.contains("10% discount"));

        let _ = fs::remove_dir_all(&dir);
    }
}
