use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ProjectFinanceError;
use crate::types::{Money, Rate};
use crate::ProjectFinanceResult;

/// Starting guess for the IRR solver.
pub const IRR_GUESS: Rate = dec!(0.08);
/// Convergence tolerance on the difference between successive iterates.
pub const IRR_TOLERANCE: Decimal = dec!(0.000001);
/// Hard cap on Newton-Raphson iterations.
pub const MAX_IRR_ITERATIONS: u32 = 200;
/// Derivative magnitude below which the solver stops stepping.
const FLAT_DERIVATIVE: Decimal = dec!(0.000000000001);

/// Outcome of the IRR root-find.
///
/// `rate` is always the solver's last iterate. When `converged` is false the
/// value is a best-effort estimate: the iteration cap was hit, the NPV curve
/// went flat, or discounting overflowed at an extreme rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrrEstimate {
    pub rate: Rate,
    pub converged: bool,
    pub iterations: u32,
}

/// `(1 + rate)^periods` by repeated multiplication.
pub fn compound_factor(rate: Rate, periods: u32) -> ProjectFinanceResult<Decimal> {
    let overflow = || ProjectFinanceError::overflow(format!("(1 + {rate})^{periods}"));
    let one_plus_r = Decimal::ONE.checked_add(rate).ok_or_else(overflow)?;
    let mut factor = Decimal::ONE;
    for _ in 0..periods {
        factor = factor.checked_mul(one_plus_r).ok_or_else(overflow)?;
    }
    Ok(factor)
}

/// `1 / (1 + rate)^periods` by repeated division. For positive rates this
/// shrinks toward zero instead of overflowing.
fn discount_factor(rate: Rate, periods: u32) -> Option<Decimal> {
    let one_plus_r = Decimal::ONE.checked_add(rate)?;
    let mut factor = Decimal::ONE;
    for _ in 0..periods {
        factor = factor.checked_div(one_plus_r)?;
    }
    Some(factor)
}

/// Net Present Value of a series of cash flows. Index 0 is undiscounted.
///
/// Late flows at high rates discount toward zero. Only a result that cannot
/// be represented (negative rates over long horizons) is an error.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> ProjectFinanceResult<Money> {
    if rate <= dec!(-1) {
        return Err(ProjectFinanceError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }

    let one_plus_r = Decimal::ONE
        .checked_add(rate)
        .ok_or_else(|| ProjectFinanceError::overflow("NPV discount rate"))?;
    let mut result = Decimal::ZERO;
    let mut df = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            df = df.checked_div(one_plus_r).ok_or_else(|| {
                ProjectFinanceError::overflow(format!("NPV discount factor at period {t}"))
            })?;
        }
        result = cf
            .checked_mul(df)
            .and_then(|pv| result.checked_add(pv))
            .ok_or_else(|| ProjectFinanceError::overflow(format!("NPV at period {t}")))?;
    }

    Ok(result)
}

/// NPV and its first derivative with respect to the rate, or `None` if any
/// term overflows Decimal range.
fn npv_with_derivative(rate: Rate, cash_flows: &[Money]) -> Option<(Decimal, Decimal)> {
    let one_plus_r = Decimal::ONE.checked_add(rate)?;
    if one_plus_r.is_zero() {
        return None;
    }

    let mut npv_val = Decimal::ZERO;
    let mut dnpv = Decimal::ZERO;
    let mut df = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            df = df.checked_div(one_plus_r)?;
        }
        let pv = cf.checked_mul(df)?;
        npv_val = npv_val.checked_add(pv)?;

        if t > 0 {
            let term = Decimal::from(t as u64)
                .checked_mul(pv)?
                .checked_div(one_plus_r)?;
            dnpv = dnpv.checked_sub(term)?;
        }
    }

    Some((npv_val, dnpv))
}

/// Internal Rate of Return using Newton-Raphson.
///
/// Never fails for numeric reasons: see [`IrrEstimate`]. Series with several
/// sign changes may have several roots; the one found depends on the guess.
pub fn irr(cash_flows: &[Money], guess: Rate) -> ProjectFinanceResult<IrrEstimate> {
    if cash_flows.len() < 2 {
        return Err(ProjectFinanceError::InsufficientData(
            "IRR requires at least 2 cash flows".into(),
        ));
    }

    let mut rate = guess;

    for i in 0..MAX_IRR_ITERATIONS {
        let Some((npv_val, dnpv)) = npv_with_derivative(rate, cash_flows) else {
            tracing::debug!(iteration = i, %rate, "IRR discounting overflowed");
            return Ok(IrrEstimate {
                rate,
                converged: false,
                iterations: i,
            });
        };

        if dnpv.abs() < FLAT_DERIVATIVE {
            return Ok(IrrEstimate {
                rate,
                converged: false,
                iterations: i,
            });
        }

        let next = match npv_val.checked_div(dnpv).and_then(|step| rate.checked_sub(step)) {
            Some(next) => next,
            None => {
                return Ok(IrrEstimate {
                    rate,
                    converged: false,
                    iterations: i,
                })
            }
        };

        if next.checked_sub(rate).is_some_and(|step| step.abs() < IRR_TOLERANCE) {
            return Ok(IrrEstimate {
                rate: next,
                converged: true,
                iterations: i + 1,
            });
        }
        rate = next;
    }

    Ok(IrrEstimate {
        rate,
        converged: false,
        iterations: MAX_IRR_ITERATIONS,
    })
}

/// Constant annual payment that retires `principal` over `periods` years.
///
/// Computed as `P * r / (1 - (1 + r)^-n)`, which stays finite for any
/// positive rate. Falls back to straight division when `rate` is exactly zero.
pub fn annuity_payment(principal: Money, rate: Rate, periods: u32) -> ProjectFinanceResult<Money> {
    if periods == 0 {
        return Err(ProjectFinanceError::InvalidInput {
            field: "periods".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        return Ok(principal / Decimal::from(periods));
    }

    let overflow = || ProjectFinanceError::overflow("annuity payment");
    let denom = Decimal::ONE - discount_factor(rate, periods).ok_or_else(overflow)?;
    if denom.is_zero() {
        return Err(ProjectFinanceError::DivisionByZero {
            context: "annuity factor".into(),
        });
    }

    principal
        .checked_mul(rate)
        .and_then(|interest| interest.checked_div(denom))
        .ok_or_else(overflow)
}
