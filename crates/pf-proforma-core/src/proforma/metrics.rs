use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cash_flow::ProjectCashFlows;
use crate::error::ProjectFinanceError;
use crate::time_value::{irr, npv, IRR_GUESS};
use crate::types::{Money, Rate};
use crate::ProjectFinanceResult;

/// Investment return metrics for one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProformaResult {
    /// Levered equity IRR (decimal)
    pub irr: Rate,
    /// False when the IRR is a best-effort estimate
    pub irr_converged: bool,
    /// Newton-Raphson iterations used
    pub irr_iterations: u32,
    /// NPV of the equity series at the configured discount rate
    pub npv: Money,
    /// First year the cumulative series turns positive; `None` if never
    pub payback_year: Option<u32>,
    /// Minimum (revenue - opex) / debt service; `None` without debt service
    pub min_dscr: Option<Decimal>,
}

/// First year index `t >= 1` at which the running total of the series,
/// including the year-0 outflow, is strictly positive.
pub fn payback_year(series: &[Money]) -> ProjectFinanceResult<Option<u32>> {
    let mut cumulative = Decimal::ZERO;
    for (t, cf) in series.iter().enumerate() {
        cumulative = cumulative
            .checked_add(*cf)
            .ok_or_else(|| ProjectFinanceError::overflow(format!("cumulative cash flow at year {t}")))?;
        if t >= 1 && cumulative > Decimal::ZERO {
            return Ok(Some(t as u32));
        }
    }
    Ok(None)
}

/// Minimum debt service coverage over years with positive debt service.
pub fn min_dscr(
    revenue: &[Money],
    opex: &[Money],
    debt_service: &[Money],
) -> ProjectFinanceResult<Option<Decimal>> {
    if revenue.len() != opex.len() || revenue.len() != debt_service.len() {
        return Err(ProjectFinanceError::InvalidInput {
            field: "series".into(),
            reason: format!(
                "Revenue ({}), opex ({}) and debt service ({}) series must have equal length",
                revenue.len(),
                opex.len(),
                debt_service.len()
            ),
        });
    }

    let mut min: Option<Decimal> = None;
    for (year, ((rev, op), ds)) in revenue.iter().zip(opex).zip(debt_service).enumerate() {
        if *ds <= Decimal::ZERO {
            continue;
        }
        let dscr = rev
            .checked_sub(*op)
            .and_then(|cfads| cfads.checked_div(*ds))
            .ok_or_else(|| ProjectFinanceError::overflow(format!("DSCR in year {}", year + 1)))?;
        min = Some(min.map_or(dscr, |m| m.min(dscr)));
    }

    Ok(min)
}

/// Compute NPV, IRR, payback and min DSCR from a cash-flow projection.
pub fn compute_metrics(
    cash_flows: &ProjectCashFlows,
    discount_rate: Rate,
) -> ProjectFinanceResult<ProformaResult> {
    compute_metrics_from_series(
        &cash_flows.series,
        &cash_flows.revenue_series(),
        &cash_flows.opex_series(),
        &cash_flows.debt_service_series(),
        discount_rate,
    )
}

/// Same as [`compute_metrics`] on raw series. `series` carries year 0; the
/// auxiliary series start at year 1.
pub fn compute_metrics_from_series(
    series: &[Money],
    revenue: &[Money],
    opex: &[Money],
    debt_service: &[Money],
    discount_rate: Rate,
) -> ProjectFinanceResult<ProformaResult> {
    let irr_est = irr(series, IRR_GUESS)?;
    if !irr_est.converged {
        tracing::warn!(
            rate = %irr_est.rate,
            iterations = irr_est.iterations,
            "IRR did not converge; returning best-effort estimate"
        );
    }

    Ok(ProformaResult {
        irr: irr_est.rate,
        irr_converged: irr_est.converged,
        irr_iterations: irr_est.iterations,
        npv: npv(discount_rate, series)?,
        payback_year: payback_year(series)?,
        min_dscr: min_dscr(revenue, opex, debt_service)?,
    })
}
