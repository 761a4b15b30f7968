use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;

use super::schema::{financing, projects, proforma_results};
use crate::error::ProjectFinanceError;
use crate::proforma::{FinancingInputs, ProjectInputs};
use crate::store::records::{FinancingRecord, NewResult, ProjectRecord, ResultRow};
use crate::ProjectFinanceResult;

#[derive(Debug, Queryable, Selectable, Insertable)]
#[diesel(table_name = projects)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ProjectRow {
    pub project_id: i32,
    pub name: String,
    pub location: Option<String>,
    pub capacity_mw: String,
    pub capex: String,
    pub opex_annual: String,
    pub ppa_price: String,
    pub degradation_pct: String,
    pub cf_year1: String,
    pub cod_year: Option<i32>,
}

#[derive(Debug, Queryable, Selectable, Insertable)]
#[diesel(table_name = financing)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct FinancingRow {
    pub financing_id: i32,
    pub project_id: i32,
    pub tax_credit_pct: String,
    pub debt_pct: String,
    pub interest_rate: String,
    pub term_years: i32,
}

#[derive(Debug, Queryable, Selectable, Insertable)]
#[diesel(table_name = proforma_results)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct StoredResultRow {
    pub result_id: i32,
    pub project_id: i32,
    pub run_date: String,
    pub discount_rate: String,
    pub npv: String,
    pub irr: String,
    pub irr_converged: bool,
    pub payback_year: Option<i32>,
    pub min_dscr: Option<String>,
}

/// Result insert without an id; SQLite assigns it.
#[derive(Debug, Insertable)]
#[diesel(table_name = proforma_results)]
pub struct NewResultRow {
    pub project_id: i32,
    pub run_date: String,
    pub discount_rate: String,
    pub npv: String,
    pub irr: String,
    pub irr_converged: bool,
    pub payback_year: Option<i32>,
    pub min_dscr: Option<String>,
}

// ---------------------------------------------------------------------------
// Column conversions
// ---------------------------------------------------------------------------

fn decimal(column: &str, value: &str) -> ProjectFinanceResult<Decimal> {
    value.parse().map_err(|e| {
        ProjectFinanceError::Storage(format!("Column {column} holds {value:?}, not a decimal: {e}"))
    })
}

fn db_int<T>(column: &str, value: T) -> ProjectFinanceResult<i32>
where
    T: TryInto<i32> + Copy + std::fmt::Display,
{
    value.try_into().map_err(|_| {
        ProjectFinanceError::Storage(format!("Column {column} cannot hold {value}"))
    })
}

fn u32_column(column: &str, value: i32) -> ProjectFinanceResult<u32> {
    u32::try_from(value).map_err(|_| {
        ProjectFinanceError::Storage(format!("Column {column} holds negative value {value}"))
    })
}

/// RFC 3339 with microseconds and a `Z` suffix. Every row uses the same
/// width, so text order is time order.
pub fn run_date_text(run_date: &DateTime<Utc>) -> String {
    run_date.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_run_date(value: &str) -> ProjectFinanceResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| ProjectFinanceError::Storage(format!("Bad run_date {value:?}: {e}")))
}

// ---------------------------------------------------------------------------
// Row <-> record
// ---------------------------------------------------------------------------

impl TryFrom<ProjectRow> for ProjectRecord {
    type Error = ProjectFinanceError;

    fn try_from(row: ProjectRow) -> ProjectFinanceResult<Self> {
        Ok(ProjectRecord {
            project_id: i64::from(row.project_id),
            name: row.name,
            location: row.location,
            inputs: ProjectInputs {
                capacity_mw: decimal("capacity_mw", &row.capacity_mw)?,
                capex: decimal("capex", &row.capex)?,
                opex_annual: decimal("opex_annual", &row.opex_annual)?,
                ppa_price: decimal("ppa_price", &row.ppa_price)?,
                degradation_pct: decimal("degradation_pct", &row.degradation_pct)?,
                cf_year1: decimal("cf_year1", &row.cf_year1)?,
                cod_year: row.cod_year,
            },
        })
    }
}

impl TryFrom<&ProjectRecord> for ProjectRow {
    type Error = ProjectFinanceError;

    fn try_from(record: &ProjectRecord) -> ProjectFinanceResult<Self> {
        let p = &record.inputs;
        Ok(ProjectRow {
            project_id: db_int("project_id", record.project_id)?,
            name: record.name.clone(),
            location: record.location.clone(),
            capacity_mw: p.capacity_mw.to_string(),
            capex: p.capex.to_string(),
            opex_annual: p.opex_annual.to_string(),
            ppa_price: p.ppa_price.to_string(),
            degradation_pct: p.degradation_pct.to_string(),
            cf_year1: p.cf_year1.to_string(),
            cod_year: p.cod_year,
        })
    }
}

impl TryFrom<FinancingRow> for FinancingRecord {
    type Error = ProjectFinanceError;

    fn try_from(row: FinancingRow) -> ProjectFinanceResult<Self> {
        Ok(FinancingRecord {
            financing_id: i64::from(row.financing_id),
            project_id: i64::from(row.project_id),
            inputs: FinancingInputs {
                debt_pct: decimal("debt_pct", &row.debt_pct)?,
                interest_rate: decimal("interest_rate", &row.interest_rate)?,
                term_years: u32_column("term_years", row.term_years)?,
                tax_credit_pct: decimal("tax_credit_pct", &row.tax_credit_pct)?,
            },
        })
    }
}

impl TryFrom<&FinancingRecord> for FinancingRow {
    type Error = ProjectFinanceError;

    fn try_from(record: &FinancingRecord) -> ProjectFinanceResult<Self> {
        let f = &record.inputs;
        Ok(FinancingRow {
            financing_id: db_int("financing_id", record.financing_id)?,
            project_id: db_int("project_id", record.project_id)?,
            tax_credit_pct: f.tax_credit_pct.to_string(),
            debt_pct: f.debt_pct.to_string(),
            interest_rate: f.interest_rate.to_string(),
            term_years: db_int("term_years", f.term_years)?,
        })
    }
}

impl TryFrom<StoredResultRow> for ResultRow {
    type Error = ProjectFinanceError;

    fn try_from(row: StoredResultRow) -> ProjectFinanceResult<Self> {
        Ok(ResultRow {
            result_id: i64::from(row.result_id),
            project_id: i64::from(row.project_id),
            run_date: parse_run_date(&row.run_date)?,
            discount_rate: decimal("discount_rate", &row.discount_rate)?,
            npv: decimal("npv", &row.npv)?,
            irr: decimal("irr", &row.irr)?,
            irr_converged: row.irr_converged,
            payback_year: row
                .payback_year
                .map(|y| u32_column("payback_year", y))
                .transpose()?,
            min_dscr: row
                .min_dscr
                .as_deref()
                .map(|d| decimal("min_dscr", d))
                .transpose()?,
        })
    }
}

impl TryFrom<&ResultRow> for StoredResultRow {
    type Error = ProjectFinanceError;

    fn try_from(row: &ResultRow) -> ProjectFinanceResult<Self> {
        Ok(StoredResultRow {
            result_id: db_int("result_id", row.result_id)?,
            project_id: db_int("project_id", row.project_id)?,
            run_date: run_date_text(&row.run_date),
            discount_rate: row.discount_rate.to_string(),
            npv: row.npv.to_string(),
            irr: row.irr.to_string(),
            irr_converged: row.irr_converged,
            payback_year: row
                .payback_year
                .map(|y| db_int("payback_year", y))
                .transpose()?,
            min_dscr: row.min_dscr.map(|d| d.to_string()),
        })
    }
}

impl TryFrom<&NewResult> for NewResultRow {
    type Error = ProjectFinanceError;

    fn try_from(result: &NewResult) -> ProjectFinanceResult<Self> {
        let m = &result.metrics;
        Ok(NewResultRow {
            project_id: db_int("project_id", result.project_id)?,
            run_date: run_date_text(&result.run_date),
            discount_rate: result.discount_rate.to_string(),
            npv: m.npv.to_string(),
            irr: m.irr.to_string(),
            irr_converged: m.irr_converged,
            payback_year: m
                .payback_year
                .map(|y| db_int("payback_year", y))
                .transpose()?,
            min_dscr: m.min_dscr.map(|d| d.to_string()),
        })
    }
}
