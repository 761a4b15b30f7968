use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::amortization::{loan_schedule, LoanScheduleEntry};
use super::inputs::{validate_inputs, FinancingInputs, ModelConfig, ProjectInputs};
use crate::types::{Money, Mwh};
use crate::{ProjectFinanceError, ProjectFinanceResult};

/// Hours in a non-leap year.
pub const HOURS_PER_YEAR: Decimal = dec!(8760);
/// MWh to kWh, since PPA prices are quoted per kWh.
pub const KWH_PER_MWH: Decimal = dec!(1000);

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One operating year of the levered cash-flow build-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowYear {
    /// Operating year (1-based)
    pub year: u32,
    /// Net energy delivered after degradation
    pub production_mwh: Mwh,
    /// PPA revenue
    pub revenue: Money,
    /// Escalated operating expenditure
    pub opex: Money,
    /// Loan payment (zero after the loan term)
    pub debt_service: Money,
    /// Straight-line depreciation over the project life
    pub depreciation: Money,
    /// Revenue - opex - depreciation - debt service
    pub taxable_income: Money,
    /// Tax payable, floored at zero
    pub tax: Money,
    /// Cash to equity after debt service and tax
    pub after_tax_cashflow: Money,
}

/// Full levered cash-flow projection for one scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectCashFlows {
    /// Sponsor equity at year 0
    pub equity: Money,
    /// Loan principal drawn at year 0
    pub debt_principal: Money,
    /// Amortization schedule for the loan
    pub loan_schedule: Vec<LoanScheduleEntry>,
    /// Year-by-year build-up, years 1..=project_life_years
    pub years: Vec<CashFlowYear>,
    /// `[-equity, cf_1, ..., cf_n]`, the series IRR and NPV run on
    pub series: Vec<Money>,
}

impl ProjectCashFlows {
    pub fn revenue_series(&self) -> Vec<Money> {
        self.years.iter().map(|y| y.revenue).collect()
    }

    pub fn opex_series(&self) -> Vec<Money> {
        self.years.iter().map(|y| y.opex).collect()
    }

    pub fn debt_service_series(&self) -> Vec<Money> {
        self.years.iter().map(|y| y.debt_service).collect()
    }

    pub fn production_series(&self) -> Vec<Mwh> {
        self.years.iter().map(|y| y.production_mwh).collect()
    }
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Build the levered after-tax cash flows for a generation project.
///
/// Degradation and opex escalation compound geometrically from year 1.
/// Depreciation is straight-line over the whole project life, independent of
/// the loan term. Tax is never negative: losses are neither carried forward
/// nor credited.
pub fn build_cash_flows(
    project: &ProjectInputs,
    financing: &FinancingInputs,
    config: &ModelConfig,
) -> ProjectFinanceResult<ProjectCashFlows> {
    validate_inputs(project, financing, config)?;

    let years = config.project_life_years;
    let debt_principal = checked(project.capex.checked_mul(financing.debt_pct), "debt principal", 0)?;
    let equity = project.capex - debt_principal;

    let loan = loan_schedule(debt_principal, financing.interest_rate, financing.term_years)?;

    let production_year1 = checked(
        project
            .capacity_mw
            .checked_mul(project.cf_year1)
            .and_then(|mw| mw.checked_mul(HOURS_PER_YEAR)),
        "production",
        1,
    )?;
    let depreciation = project.capex / Decimal::from(years);
    let retention = Decimal::ONE - project.degradation_pct;
    let escalation = checked(
        Decimal::ONE.checked_add(config.opex_escalation),
        "opex escalation",
        1,
    )?;

    let mut rows: Vec<CashFlowYear> = Vec::with_capacity(years as usize);
    let mut series: Vec<Money> = Vec::with_capacity(years as usize + 1);
    series.push(-equity);

    let mut production_mwh = production_year1;
    let mut opex = project.opex_annual;

    for year in 1..=years {
        if year > 1 {
            production_mwh = checked(production_mwh.checked_mul(retention), "production", year)?;
            opex = checked(opex.checked_mul(escalation), "opex", year)?;
        }

        let revenue = checked(
            production_mwh
                .checked_mul(KWH_PER_MWH)
                .and_then(|kwh| kwh.checked_mul(project.ppa_price)),
            "revenue",
            year,
        )?;
        let debt_service = loan
            .get((year - 1) as usize)
            .map(|entry| entry.payment)
            .unwrap_or(Decimal::ZERO);

        let taxable_income = checked(
            revenue
                .checked_sub(opex)
                .and_then(|v| v.checked_sub(depreciation))
                .and_then(|v| v.checked_sub(debt_service)),
            "taxable income",
            year,
        )?;
        let tax = checked(taxable_income.checked_mul(config.tax_rate), "tax", year)?
            .max(Decimal::ZERO);
        let after_tax_cashflow = checked(
            revenue
                .checked_sub(opex)
                .and_then(|v| v.checked_sub(debt_service))
                .and_then(|v| v.checked_sub(tax))
                .and_then(|v| v.checked_add(depreciation)),
            "after-tax cash flow",
            year,
        )?;

        series.push(after_tax_cashflow);
        rows.push(CashFlowYear {
            year,
            production_mwh,
            revenue,
            opex,
            debt_service,
            depreciation,
            taxable_income,
            tax,
            after_tax_cashflow,
        });
    }

    Ok(ProjectCashFlows {
        equity,
        debt_principal,
        loan_schedule: loan,
        years: rows,
        series,
    })
}

fn checked(value: Option<Decimal>, what: &str, year: u32) -> ProjectFinanceResult<Decimal> {
    value.ok_or_else(|| ProjectFinanceError::overflow(format!("{what} in year {year}")))
}
