use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::grid::{GridPoint, SensitivityGrid};
use crate::proforma::{run_proforma, FinancingInputs, ModelConfig, ProformaResult, ProjectInputs};
use crate::types::{with_metadata, ComputationOutput, Multiple, Rate};
use crate::{ProjectFinanceError, ProjectFinanceResult};

/// One evaluated grid point. Exactly one of `result` / `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityRow {
    pub ppa_mult: Multiple,
    pub capex_mult: Multiple,
    pub debt_pct: Rate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ProformaResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SensitivityRow {
    pub fn is_ok(&self) -> bool {
        self.result.is_some()
    }
}

/// Full sweep output, rows in canonical enumeration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityOutput {
    pub rows: Vec<SensitivityRow>,
    pub evaluated: usize,
    pub failed: usize,
}

/// Evaluate a single grid point against the base case.
pub fn evaluate_point(
    project: &ProjectInputs,
    financing: &FinancingInputs,
    config: &ModelConfig,
    point: GridPoint,
) -> SensitivityRow {
    match run_point(project, financing, config, point) {
        Ok(result) => SensitivityRow {
            ppa_mult: point.ppa_mult,
            capex_mult: point.capex_mult,
            debt_pct: point.debt_pct,
            result: Some(result),
            error: None,
        },
        Err(e) => {
            tracing::warn!(
                ppa_mult = %point.ppa_mult,
                capex_mult = %point.capex_mult,
                debt_pct = %point.debt_pct,
                error = %e,
                "Sensitivity point failed"
            );
            SensitivityRow {
                ppa_mult: point.ppa_mult,
                capex_mult: point.capex_mult,
                debt_pct: point.debt_pct,
                result: None,
                error: Some(e.to_string()),
            }
        }
    }
}

fn run_point(
    project: &ProjectInputs,
    financing: &FinancingInputs,
    config: &ModelConfig,
    point: GridPoint,
) -> ProjectFinanceResult<ProformaResult> {
    let ppa_price = project
        .ppa_price
        .checked_mul(point.ppa_mult)
        .ok_or_else(|| ProjectFinanceError::overflow("scenario PPA price"))?;
    let capex = project
        .capex
        .checked_mul(point.capex_mult)
        .ok_or_else(|| ProjectFinanceError::overflow("scenario capex"))?;
    let scenario_project = project.with_ppa_price(ppa_price).with_capex(capex);
    let scenario_financing = financing.with_debt_pct(point.debt_pct);

    run_proforma(&scenario_project, &scenario_financing, config)
}

/// Sweep PPA price, capex and debt fraction around a base case.
///
/// Only an invalid grid fails the whole call. A failure at an individual
/// point is recorded on its row and the sweep continues.
pub fn run_sensitivity(
    project: &ProjectInputs,
    financing: &FinancingInputs,
    config: &ModelConfig,
    grid: &SensitivityGrid,
) -> ProjectFinanceResult<ComputationOutput<SensitivityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    grid.validate()?;

    let rows: Vec<SensitivityRow> = grid
        .points(financing.debt_pct)
        .into_iter()
        .map(|point| evaluate_point(project, financing, config, point))
        .collect();

    let failed = rows.iter().filter(|r| !r.is_ok()).count();
    let non_converged = rows
        .iter()
        .filter_map(|r| r.result.as_ref())
        .filter(|m| !m.irr_converged)
        .count();

    if failed > 0 {
        warnings.push(format!(
            "{failed} of {} sensitivity points failed; see row errors",
            rows.len()
        ));
    }
    if non_converged > 0 {
        warnings.push(format!(
            "IRR is approximate (did not converge) for {non_converged} points"
        ));
    }

    tracing::debug!(points = rows.len(), failed, "Sensitivity sweep complete");

    let output = SensitivityOutput {
        evaluated: rows.len(),
        failed,
        rows,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "PPA Price x Capex x Leverage Sensitivity Sweep",
        &serde_json::json!({
            "base_ppa_price": project.ppa_price.to_string(),
            "base_capex": project.capex.to_string(),
            "base_debt_pct": financing.debt_pct.to_string(),
            "ppa_multipliers": grid.ppa_multipliers,
            "capex_multipliers": grid.capex_multipliers,
            "debt_levels": grid.debt_levels(financing.debt_pct),
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn base_case() -> (ProjectInputs, FinancingInputs) {
        (
            ProjectInputs {
                capacity_mw: dec!(10),
                capex: dec!(8_000_000),
                opex_annual: dec!(80_000),
                ppa_price: dec!(0.028),
                degradation_pct: dec!(0.004),
                cf_year1: dec!(0.22),
                cod_year: Some(2027),
            },
            FinancingInputs {
                debt_pct: dec!(0.65),
                interest_rate: dec!(0.0475),
                term_years: 12,
                tax_credit_pct: dec!(0.30),
            },
        )
    }

    #[test]
    fn test_sweep_row_count_and_order() {
        let (p, f) = base_case();
        let out = run_sensitivity(&p, &f, &ModelConfig::default(), &SensitivityGrid::default())
            .unwrap();
        let rows = &out.result.rows;
        assert_eq!(rows.len(), 45);
        assert_eq!(out.result.failed, 0);
        assert_eq!(rows[0].ppa_mult, dec!(0.90));
        assert_eq!(rows[0].capex_mult, dec!(0.90));
        assert_eq!(rows[0].debt_pct, dec!(0.55));
        assert_eq!(rows[44].debt_pct, dec!(0.75));
    }

    #[test]
    fn test_base_point_matches_single_run() {
        let (p, f) = base_case();
        let cfg = ModelConfig::default();
        let out = run_sensitivity(&p, &f, &cfg, &SensitivityGrid::default()).unwrap();
        // ppa 1.00 (index 2), capex 1.00 (index 1), base debt (index 1)
        let base_row = &out.result.rows[2 * 9 + 3 + 1];
        assert_eq!(base_row.ppa_mult, dec!(1.00));
        assert_eq!(base_row.capex_mult, dec!(1.00));
        assert_eq!(base_row.debt_pct, dec!(0.65));
        let swept = base_row.result.as_ref().unwrap();
        let single = run_proforma(&p, &f, &cfg).unwrap();
        assert!((swept.irr - single.irr).abs() < dec!(0.0000001));
        assert!((swept.npv - single.npv).abs() < dec!(0.0001));
        assert_eq!(swept.payback_year, single.payback_year);
    }

    #[test]
    fn test_higher_ppa_raises_npv() {
        let (p, f) = base_case();
        let out = run_sensitivity(&p, &f, &ModelConfig::default(), &SensitivityGrid::default())
            .unwrap();
        let rows = &out.result.rows;
        // Same capex and debt, stepping through the PPA axis
        for i in 0..4 {
            let lo = rows[i * 9].result.as_ref().unwrap().npv;
            let hi = rows[(i + 1) * 9].result.as_ref().unwrap().npv;
            assert!(hi > lo, "NPV should rise with PPA price: {lo} -> {hi}");
        }
    }

    #[test]
    fn test_failed_point_does_not_abort_sweep() {
        let (p, mut f) = base_case();
        // Base above 100% debt: the low level stays valid, the base level fails
        f.debt_pct = dec!(1.05);
        let grid = SensitivityGrid {
            debt_cap: dec!(1.10),
            ..SensitivityGrid::default()
        };
        let out = run_sensitivity(&p, &f, &ModelConfig::default(), &grid).unwrap();
        let rows = &out.result.rows;
        assert_eq!(rows.len(), 45);
        // 0.95 is valid; 1.05 and 1.10 are not
        assert_eq!(out.result.failed, 30);
        assert!(rows[0].is_ok());
        assert!(rows[1].error.as_ref().unwrap().contains("debt_pct"));
        assert!(out.warnings.iter().any(|w| w.contains("30 of 45")));
    }

    #[test]
    fn test_zero_debt_row_has_undefined_dscr() {
        let (p, mut f) = base_case();
        f.debt_pct = dec!(0.05);
        let out = run_sensitivity(&p, &f, &ModelConfig::default(), &SensitivityGrid::default())
            .unwrap();
        let first = &out.result.rows[0];
        assert_eq!(first.debt_pct, Decimal::ZERO);
        assert_eq!(first.result.as_ref().unwrap().min_dscr, None);
        assert!(out.result.rows[1].result.as_ref().unwrap().min_dscr.is_some());
    }

    #[test]
    fn test_overflowing_point_is_recorded_on_its_row() {
        let (mut p, f) = base_case();
        p.capex = Decimal::from_i128_with_scale(75 * 10_i128.pow(27), 0);
        let out = run_sensitivity(&p, &f, &ModelConfig::default(), &SensitivityGrid::default())
            .unwrap();
        let rows = &out.result.rows;
        assert_eq!(rows.len(), 45);
        for row in rows.iter().filter(|r| r.capex_mult == dec!(1.10)) {
            let err = row.error.as_deref().unwrap();
            assert!(err.contains("overflow"), "{err}");
            assert!(row.result.is_none());
        }
        assert!(out.result.failed >= 15);
    }

    #[test]
    fn test_long_project_life_sweeps_cleanly() {
        let (p, f) = base_case();
        let cfg = ModelConfig {
            project_life_years: 1000,
            ..ModelConfig::default()
        };
        let out = run_sensitivity(&p, &f, &cfg, &SensitivityGrid::default()).unwrap();
        assert_eq!(out.result.rows.len(), 45);
        assert_eq!(out.result.failed, 0);
    }
}
