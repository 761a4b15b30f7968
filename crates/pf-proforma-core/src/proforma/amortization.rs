use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ProjectFinanceError;
use crate::time_value::annuity_payment;
use crate::types::{Money, Rate};
use crate::ProjectFinanceResult;

/// A single year in a level-payment loan schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanScheduleEntry {
    pub year: u32,
    pub payment: Money,
    pub interest: Money,
    pub principal_paid: Money,
    pub ending_balance: Money,
}

/// Build an annual amortization schedule for a fixed-rate, fixed-term loan.
///
/// Returns exactly `term_years` entries. A zero principal produces an
/// all-zero schedule rather than an error.
pub fn loan_schedule(
    principal: Money,
    annual_rate: Rate,
    term_years: u32,
) -> ProjectFinanceResult<Vec<LoanScheduleEntry>> {
    if term_years == 0 {
        return Err(ProjectFinanceError::invalid(
            "term_years",
            "Loan term must be at least 1 year",
        ));
    }
    if principal < Decimal::ZERO {
        return Err(ProjectFinanceError::invalid(
            "principal",
            "Loan principal cannot be negative",
        ));
    }
    if annual_rate < Decimal::ZERO {
        return Err(ProjectFinanceError::invalid(
            "annual_rate",
            "Interest rate cannot be negative",
        ));
    }

    let payment = annuity_payment(principal, annual_rate, term_years)?;

    let mut schedule = Vec::with_capacity(term_years as usize);
    let mut balance = principal;

    for year in 1..=term_years {
        let interest = balance
            .checked_mul(annual_rate)
            .ok_or_else(|| ProjectFinanceError::overflow(format!("loan interest in year {year}")))?;
        let principal_paid = payment - interest;
        balance = balance
            .checked_sub(principal_paid)
            .ok_or_else(|| ProjectFinanceError::overflow(format!("loan balance in year {year}")))?
            .max(Decimal::ZERO);

        schedule.push(LoanScheduleEntry {
            year,
            payment,
            interest,
            principal_paid,
            ending_balance: balance,
        });
    }

    Ok(schedule)
}
