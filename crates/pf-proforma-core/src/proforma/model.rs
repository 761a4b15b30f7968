use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::cash_flow::{build_cash_flows, ProjectCashFlows};
use super::inputs::{FinancingInputs, ModelConfig, ProjectInputs};
use super::metrics::{compute_metrics, ProformaResult};
use crate::types::{with_metadata, ComputationOutput};
use crate::ProjectFinanceResult;

/// Metrics together with the projection they were computed from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProformaRun {
    pub metrics: ProformaResult,
    pub cash_flows: ProjectCashFlows,
}

/// Evaluate one scenario down to its return metrics.
///
/// Pure: shared by the single-run path and every sensitivity grid point.
pub fn run_proforma(
    project: &ProjectInputs,
    financing: &FinancingInputs,
    config: &ModelConfig,
) -> ProjectFinanceResult<ProformaResult> {
    let cash_flows = build_cash_flows(project, financing, config)?;
    compute_metrics(&cash_flows, config.discount_rate)
}

/// Run the levered pro forma for a single project and wrap the result with
/// the full projection, warnings and computation metadata.
pub fn evaluate_project(
    project: &ProjectInputs,
    financing: &FinancingInputs,
    config: &ModelConfig,
) -> ProjectFinanceResult<ComputationOutput<ProformaRun>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let cash_flows = build_cash_flows(project, financing, config)?;
    let metrics = compute_metrics(&cash_flows, config.discount_rate)?;

    tracing::debug!(
        irr = %metrics.irr,
        npv = %metrics.npv,
        payback_year = ?metrics.payback_year,
        "Pro forma evaluated"
    );

    // ── Warnings ─────────────────────────────────────────────────────
    if !metrics.irr_converged {
        warnings.push(format!(
            "IRR did not converge after {} iterations; {} is approximate",
            metrics.irr_iterations, metrics.irr
        ));
    }
    if let Some(dscr) = metrics.min_dscr {
        if dscr < dec!(1.2) {
            warnings.push(format!(
                "Minimum DSCR of {} is below 1.2x; lender covenant risk",
                dscr.round_dp(2)
            ));
        }
    }
    if metrics.payback_year.is_none() {
        warnings.push(format!(
            "Equity is not paid back within the {}-year horizon",
            config.project_life_years
        ));
    }

    let output = ProformaRun {
        metrics,
        cash_flows,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Levered Project Finance Pro Forma (annual, straight-line depreciation)",
        &serde_json::json!({
            "capacity_mw": project.capacity_mw.to_string(),
            "capex": project.capex.to_string(),
            "ppa_price": project.ppa_price.to_string(),
            "debt_pct": financing.debt_pct.to_string(),
            "interest_rate": financing.interest_rate.to_string(),
            "term_years": financing.term_years,
            "discount_rate": config.discount_rate.to_string(),
            "tax_rate": config.tax_rate.to_string(),
            "project_life_years": config.project_life_years,
            "opex_escalation": config.opex_escalation.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}
