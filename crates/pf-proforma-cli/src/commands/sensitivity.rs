use clap::Args;
use serde_json::{json, Value};
use std::path::PathBuf;

use pf_proforma_core::sensitivity::{self, SensitivityGrid};
use pf_proforma_core::store::ProjectStore;

use super::RunContext;
use crate::output::csv_out::{self, SensitivityCsvRow};

/// Arguments for the sensitivity sweep
#[derive(Args)]
pub struct SensitivityArgs {
    /// Project id in the store
    #[arg(long)]
    pub project_id: i64,

    /// Directory for the CSV export (defaults to reports.dir)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

pub fn run_sensitivity(
    args: SensitivityArgs,
    ctx: &RunContext,
) -> Result<Value, Box<dyn std::error::Error>> {
    let store = ctx.open_store()?;
    let project = store.project(args.project_id)?;
    let financing = store.financing(args.project_id)?;

    let output = sensitivity::run_sensitivity(
        &project.inputs,
        &financing.inputs,
        &ctx.model,
        &SensitivityGrid::default(),
    )?;

    let rows = &output.result.rows;
    let path = csv_out::export_sensitivity_csv(
        ctx.out_dir(args.out_dir.as_deref()),
        args.project_id,
        rows,
    )?;
    tracing::info!(path = %path.display(), rows = rows.len(), "Sensitivity CSV written");

    let failures: Vec<Value> = rows
        .iter()
        .filter_map(|r| {
            r.error.as_ref().map(|e| {
                json!({
                    "ppa_mult": r.ppa_mult,
                    "capex_mult": r.capex_mult,
                    "debt_pct": r.debt_pct,
                    "error": e,
                })
            })
        })
        .collect();
    let results: Vec<SensitivityCsvRow> = rows.iter().map(SensitivityCsvRow::from).collect();

    Ok(json!({
        "project_id": args.project_id,
        "csv_path": path.display().to_string(),
        "evaluated": output.result.evaluated,
        "failed": output.result.failed,
        "results": results,
        "failures": failures,
        "warnings": output.warnings,
    }))
}
