use clap::Args;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;

use pf_proforma_core::proforma::{evaluate_project, FinancingInputs, ModelConfig, ProjectInputs};
use pf_proforma_core::store::{NewResult, ProjectStore};

use super::RunContext;
use crate::input;
use crate::output::markdown;

/// Arguments for a stored-project model run
#[derive(Args)]
pub struct RunModelArgs {
    /// Project id in the store
    #[arg(long)]
    pub project_id: i64,
}

/// Arguments for the Markdown summary
#[derive(Args)]
pub struct SummarizeArgs {
    /// Project id in the store
    #[arg(long)]
    pub project_id: i64,

    /// Directory for the summary file (defaults to reports.dir)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

/// Arguments for an ad-hoc evaluation
#[derive(Args)]
pub struct EvaluateArgs {
    /// Path to JSON input file with `project`, `financing` and optional `config`
    #[arg(long)]
    pub input: Option<String>,
}

/// Scenario document accepted by `evaluate`.
#[derive(Debug, Deserialize)]
pub struct ScenarioInput {
    pub project: ProjectInputs,
    pub financing: FinancingInputs,
    #[serde(default)]
    pub config: Option<ModelConfig>,
}

pub fn run_model(args: RunModelArgs, ctx: &RunContext) -> Result<Value, Box<dyn std::error::Error>> {
    let mut store = ctx.open_store()?;
    let project = store.project(args.project_id)?;
    let financing = store.financing(args.project_id)?;

    let output = evaluate_project(&project.inputs, &financing.inputs, &ctx.model)?;
    let metrics = output.result.metrics.clone();
    let row = store.record_result(NewResult::now(
        args.project_id,
        ctx.model.discount_rate,
        metrics,
    ))?;

    Ok(json!({
        "result": {
            "project_id": row.project_id,
            "name": project.name,
            "result_id": row.result_id,
            "run_date": row.run_date.to_rfc3339(),
            "discount_rate": row.discount_rate,
            "irr": row.irr,
            "irr_converged": row.irr_converged,
            "npv": row.npv,
            "payback_year": row.payback_year,
            "min_dscr": row.min_dscr,
        },
        "methodology": output.methodology,
        "warnings": output.warnings,
    }))
}

pub fn run_summarize(args: SummarizeArgs, ctx: &RunContext) -> Result<Value, Box<dyn std::error::Error>> {
    let store = ctx.open_store()?;
    let project = store.project(args.project_id)?;
    let latest = store.latest_result(args.project_id)?;

    let contents = markdown::render_summary(&project, &latest);
    let path = markdown::write_summary(ctx.out_dir(args.out_dir.as_deref()), args.project_id, &contents)?;
    tracing::info!(path = %path.display(), "Summary written");

    Ok(json!({
        "result": {
            "project_id": args.project_id,
            "result_id": latest.result_id,
            "summary_path": path.display().to_string(),
        }
    }))
}

pub fn run_evaluate(args: EvaluateArgs, ctx: &RunContext) -> Result<Value, Box<dyn std::error::Error>> {
    let scenario: ScenarioInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(scenario) = input::stdin::read_stdin()? {
        scenario
    } else {
        return Err("--input <file.json> or stdin required for evaluate".into());
    };

    let config = scenario.config.unwrap_or_else(|| ctx.model.clone());
    let output = evaluate_project(&scenario.project, &scenario.financing, &config)?;
    Ok(serde_json::to_value(output)?)
}
