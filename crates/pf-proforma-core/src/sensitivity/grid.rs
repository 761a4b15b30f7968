use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ProjectFinanceError;
use crate::types::{Multiple, Rate};
use crate::ProjectFinanceResult;

/// Axes of the PPA × capex × leverage sweep.
///
/// Debt levels are derived from the base case: `base - step`, `base`,
/// `base + step`, with the shifted levels clamped to `[debt_floor, debt_cap]`.
/// The base level itself is never clamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityGrid {
    pub ppa_multipliers: Vec<Multiple>,
    pub capex_multipliers: Vec<Multiple>,
    pub debt_step: Rate,
    pub debt_floor: Rate,
    pub debt_cap: Rate,
}

impl Default for SensitivityGrid {
    fn default() -> Self {
        Self {
            ppa_multipliers: vec![dec!(0.90), dec!(0.95), dec!(1.00), dec!(1.05), dec!(1.10)],
            capex_multipliers: vec![dec!(0.90), dec!(1.00), dec!(1.10)],
            debt_step: dec!(0.10),
            debt_floor: Decimal::ZERO,
            debt_cap: dec!(0.95),
        }
    }
}

/// One coordinate in the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    pub ppa_mult: Multiple,
    pub capex_mult: Multiple,
    pub debt_pct: Rate,
}

impl SensitivityGrid {
    /// Low, base and high debt fractions around `base_debt`.
    pub fn debt_levels(&self, base_debt: Rate) -> [Rate; 3] {
        [
            base_debt.saturating_sub(self.debt_step).max(self.debt_floor),
            base_debt,
            base_debt.saturating_add(self.debt_step).min(self.debt_cap),
        ]
    }

    /// Number of points the sweep will evaluate.
    pub fn len(&self) -> usize {
        self.ppa_multipliers.len() * self.capex_multipliers.len() * 3
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Enumerate points in canonical order: PPA outer, capex middle, debt inner.
    pub fn points(&self, base_debt: Rate) -> Vec<GridPoint> {
        let debt_levels = self.debt_levels(base_debt);
        let mut points = Vec::with_capacity(self.len());
        for &ppa_mult in &self.ppa_multipliers {
            for &capex_mult in &self.capex_multipliers {
                for &debt_pct in &debt_levels {
                    points.push(GridPoint {
                        ppa_mult,
                        capex_mult,
                        debt_pct,
                    });
                }
            }
        }
        points
    }

    pub fn validate(&self) -> ProjectFinanceResult<()> {
        if self.ppa_multipliers.is_empty() || self.capex_multipliers.is_empty() {
            return Err(ProjectFinanceError::InvalidInput {
                field: "grid".into(),
                reason: "PPA and capex multiplier axes must be non-empty".into(),
            });
        }
        if self.debt_step < Decimal::ZERO {
            return Err(ProjectFinanceError::InvalidInput {
                field: "debt_step".into(),
                reason: "Debt step cannot be negative".into(),
            });
        }
        if self.debt_floor > self.debt_cap {
            return Err(ProjectFinanceError::InvalidInput {
                field: "debt_floor".into(),
                reason: format!(
                    "Debt floor ({}) exceeds debt cap ({})",
                    self.debt_floor, self.debt_cap
                ),
            });
        }
        Ok(())
    }
}
