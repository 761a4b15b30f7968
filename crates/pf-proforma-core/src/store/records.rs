use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::proforma::{FinancingInputs, ProformaResult, ProjectInputs};
use crate::types::{Money, Rate};

/// A stored generation project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub project_id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub inputs: ProjectInputs,
}

/// Financing terms attached to a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancingRecord {
    pub financing_id: i64,
    pub project_id: i64,
    pub inputs: FinancingInputs,
}

/// A persisted pro forma run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub result_id: i64,
    pub project_id: i64,
    pub run_date: DateTime<Utc>,
    /// Rate the NPV was discounted at
    pub discount_rate: Rate,
    pub npv: Money,
    pub irr: Rate,
    pub irr_converged: bool,
    pub payback_year: Option<u32>,
    pub min_dscr: Option<Decimal>,
}

/// Result row before the store assigns an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewResult {
    pub project_id: i64,
    pub run_date: DateTime<Utc>,
    pub discount_rate: Rate,
    pub metrics: ProformaResult,
}

impl NewResult {
    /// Stamp a result with the current UTC time.
    pub fn now(project_id: i64, discount_rate: Rate, metrics: ProformaResult) -> Self {
        Self {
            project_id,
            run_date: Utc::now(),
            discount_rate,
            metrics,
        }
    }
}

/// Everything a store holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub projects: Vec<ProjectRecord>,
    #[serde(default)]
    pub financing: Vec<FinancingRecord>,
    #[serde(default)]
    pub results: Vec<ResultRow>,
}
