use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ProjectFinanceError;
use crate::types::{Money, Rate};
use crate::ProjectFinanceResult;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Physical and operating assumptions for a generation asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectInputs {
    /// Nameplate capacity in MW
    pub capacity_mw: Decimal,
    /// Total capital expenditure
    pub capex: Money,
    /// Year-1 operating expenditure
    pub opex_annual: Money,
    /// Contracted PPA price per kWh
    pub ppa_price: Money,
    /// Annual output degradation (decimal, e.g. 0.005 = 0.5%)
    pub degradation_pct: Rate,
    /// Year-1 capacity factor (decimal)
    pub cf_year1: Decimal,
    /// Commercial operation year. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cod_year: Option<i32>,
}

/// Capital structure and loan terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancingInputs {
    /// Fraction of capex funded with debt
    pub debt_pct: Rate,
    /// Annual fixed interest rate on the loan
    pub interest_rate: Rate,
    /// Loan tenor in years
    pub term_years: u32,
    /// Investment tax credit percentage. Carried for reporting; not applied to cash flows.
    #[serde(default)]
    pub tax_credit_pct: Rate,
}

/// Model-wide discounting, tax and horizon assumptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub discount_rate: Rate,
    pub tax_rate: Rate,
    pub project_life_years: u32,
    pub opex_escalation: Rate,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            discount_rate: dec!(0.08),
            tax_rate: dec!(0.21),
            project_life_years: 25,
            opex_escalation: dec!(0.02),
        }
    }
}

// ---------------------------------------------------------------------------
// Derivations
// ---------------------------------------------------------------------------

impl ProjectInputs {
    /// Copy of these inputs with a different PPA price.
    pub fn with_ppa_price(&self, ppa_price: Money) -> Self {
        Self {
            ppa_price,
            ..self.clone()
        }
    }

    /// Copy of these inputs with a different capex.
    pub fn with_capex(&self, capex: Money) -> Self {
        Self {
            capex,
            ..self.clone()
        }
    }
}

impl FinancingInputs {
    /// Copy of these terms with a different debt fraction.
    pub fn with_debt_pct(&self, debt_pct: Rate) -> Self {
        Self {
            debt_pct,
            ..self.clone()
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate all input constraints. Nothing is clamped.
pub fn validate_inputs(
    project: &ProjectInputs,
    financing: &FinancingInputs,
    config: &ModelConfig,
) -> ProjectFinanceResult<()> {
    if project.capacity_mw <= Decimal::ZERO {
        return Err(ProjectFinanceError::invalid(
            "capacity_mw",
            "Capacity must be positive",
        ));
    }
    if project.capex <= Decimal::ZERO {
        return Err(ProjectFinanceError::invalid("capex", "Capex must be positive"));
    }
    if project.opex_annual < Decimal::ZERO {
        return Err(ProjectFinanceError::invalid(
            "opex_annual",
            "Operating expenditure cannot be negative",
        ));
    }
    if project.ppa_price <= Decimal::ZERO {
        return Err(ProjectFinanceError::invalid(
            "ppa_price",
            "PPA price must be positive",
        ));
    }
    if project.degradation_pct < Decimal::ZERO || project.degradation_pct >= Decimal::ONE {
        return Err(ProjectFinanceError::invalid(
            "degradation_pct",
            "Degradation must be in [0, 1)",
        ));
    }
    if project.cf_year1 <= Decimal::ZERO || project.cf_year1 > Decimal::ONE {
        return Err(ProjectFinanceError::invalid(
            "cf_year1",
            "Capacity factor must be in (0, 1]",
        ));
    }

    if financing.debt_pct < Decimal::ZERO || financing.debt_pct > Decimal::ONE {
        return Err(ProjectFinanceError::invalid(
            "debt_pct",
            format!("Debt fraction {} is outside [0, 1]", financing.debt_pct),
        ));
    }
    if financing.interest_rate < Decimal::ZERO {
        return Err(ProjectFinanceError::invalid(
            "interest_rate",
            "Interest rate cannot be negative",
        ));
    }
    if financing.term_years == 0 {
        return Err(ProjectFinanceError::invalid(
            "term_years",
            "Loan term must be at least 1 year",
        ));
    }

    if config.project_life_years == 0 {
        return Err(ProjectFinanceError::invalid(
            "project_life_years",
            "Project life must be at least 1 year",
        ));
    }
    if financing.term_years > config.project_life_years {
        return Err(ProjectFinanceError::invalid(
            "term_years",
            format!(
                "Loan term ({}) exceeds project life ({})",
                financing.term_years, config.project_life_years
            ),
        ));
    }
    if config.tax_rate < Decimal::ZERO || config.tax_rate > Decimal::ONE {
        return Err(ProjectFinanceError::invalid(
            "tax_rate",
            "Tax rate must be in [0, 1]",
        ));
    }
    if config.discount_rate <= dec!(-1) {
        return Err(ProjectFinanceError::invalid(
            "discount_rate",
            "Discount rate must be greater than -100%",
        ));
    }
    if config.opex_escalation <= dec!(-1) {
        return Err(ProjectFinanceError::invalid(
            "opex_escalation",
            "Escalation must be greater than -100%",
        ));
    }

    Ok(())
}
