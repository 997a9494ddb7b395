use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::FinanceError;
use crate::types::{Money, Rate};
use crate::FinanceResult;

/// Starting guess for the IRR iteration (10%).
pub const IRR_DEFAULT_GUESS: Rate = dec!(0.10);
const IRR_MAX_ITERATIONS: u32 = 50;
const IRR_TOLERANCE: Decimal = dec!(0.00001);

/// Outcome of the Newton-Raphson IRR search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrrSolution {
    /// Best available iterate, as a decimal rate.
    pub rate: Rate,
    pub iterations: u32,
    /// False when the derivative vanished, arithmetic overflowed, or the
    /// iteration budget ran out; `rate` is then the last iterate.
    pub converged: bool,
}

/// (1 + rate)^periods
pub fn compound_factor(rate: Rate, periods: u32) -> FinanceResult<Decimal> {
    (Decimal::ONE + rate)
        .checked_powi(i64::from(periods))
        .ok_or_else(|| FinanceError::NumericOverflow {
            context: format!("compound factor (1 + {rate})^{periods}"),
        })
}

/// Net Present Value of a series of cash flows, the first one undiscounted.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> FinanceResult<Money> {
    if rate <= dec!(-1) {
        return Err(FinanceError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }

    let mut result = Decimal::ZERO;
    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount = discount
                .checked_mul(one_plus_r)
                .ok_or_else(|| FinanceError::NumericOverflow {
                    context: format!("NPV discount factor at period {t}"),
                })?;
        }
        if discount.is_zero() {
            return Err(FinanceError::DivisionByZero {
                context: format!("NPV discount factor at period {t}"),
            });
        }
        result = cf
            .checked_div(discount)
            .and_then(|pv| result.checked_add(pv))
            .ok_or_else(|| FinanceError::NumericOverflow {
                context: format!("NPV present value at period {t}"),
            })?;
    }

    Ok(result)
}

/// Internal Rate of Return using Newton-Raphson.
///
/// Fixed budget of 50 iterations with no bracketing fallback. The search
/// stops early when the derivative magnitude drops below 1e-5 (reported as
/// not converged) or when successive iterates differ by less than 1e-5.
/// Cash-flow patterns with several sign changes can settle on any root or
/// wander; the last iterate is returned either way.
pub fn irr(cash_flows: &[Money], guess: Rate) -> IrrSolution {
    let mut rate = guess;

    for i in 0..IRR_MAX_ITERATIONS {
        let Some((npv_val, dnpv)) = npv_with_derivative(cash_flows, rate) else {
            debug!(iteration = i, %rate, "IRR evaluation overflowed; keeping last iterate");
            return IrrSolution { rate, iterations: i, converged: false };
        };

        if dnpv.abs() < IRR_TOLERANCE {
            debug!(iteration = i, %rate, "IRR derivative vanished");
            return IrrSolution { rate, iterations: i, converged: false };
        }

        let Some((step, next)) = npv_val
            .checked_div(dnpv)
            .and_then(|step| rate.checked_sub(step).map(|next| (step, next)))
        else {
            debug!(iteration = i, %rate, "IRR step overflowed; keeping last iterate");
            return IrrSolution { rate, iterations: i, converged: false };
        };

        // |next - rate| == |step|
        if step.abs() < IRR_TOLERANCE {
            return IrrSolution {
                rate: next,
                iterations: i + 1,
                converged: true,
            };
        }
        rate = next;
    }

    warn!(%rate, "IRR did not converge within {IRR_MAX_ITERATIONS} iterations");
    IrrSolution {
        rate,
        iterations: IRR_MAX_ITERATIONS,
        converged: false,
    }
}

/// NPV at `rate` and its derivative with respect to `rate`.
/// `None` when any term overflows or divides by zero.
fn npv_with_derivative(cash_flows: &[Money], rate: Rate) -> Option<(Decimal, Decimal)> {
    let one_plus_r = Decimal::ONE.checked_add(rate)?;
    let mut npv_val = Decimal::ZERO;
    let mut dnpv = Decimal::ZERO;

    for (t, cf) in cash_flows.iter().enumerate() {
        let t = t as i64;
        let discount = one_plus_r.checked_powi(t)?;
        npv_val = npv_val.checked_add(cf.checked_div(discount)?)?;

        let slope = Decimal::from(-t).checked_mul(*cf)?;
        let discount_next = one_plus_r.checked_powi(t + 1)?;
        dnpv = dnpv.checked_add(slope.checked_div(discount_next)?)?;
    }

    Some((npv_val, dnpv))
}

/// Level payment that retires `principal` over `nper` periods at `rate`.
///
/// Zero rate falls back to a straight linear split.
pub fn annuity_payment(principal: Money, rate: Rate, nper: u32) -> FinanceResult<Money> {
    if nper == 0 {
        return Err(FinanceError::InvalidInput {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        return Ok(principal / Decimal::from(nper));
    }

    let factor = compound_factor(rate, nper)?;
    let annuity_factor = factor - Decimal::ONE;

    if annuity_factor.is_zero() {
        return Err(FinanceError::DivisionByZero {
            context: "annuity factor".into(),
        });
    }

    // principal × rate × factor / (factor − 1), grouped so the ratio stays near 1
    factor
        .checked_div(annuity_factor)
        .and_then(|ratio| principal.checked_mul(rate)?.checked_mul(ratio))
        .ok_or_else(|| FinanceError::NumericOverflow {
            context: format!("annuity payment on {principal} at {rate} over {nper} periods"),
        })
}

/// Per-period rate equivalent to an annual rate compounded `periods_per_year` times.
pub fn periodic_equivalent(annual: Rate, periods_per_year: u32) -> FinanceResult<Rate> {
    if annual.is_zero() || periods_per_year == 1 {
        return Ok(annual);
    }
    let base = Decimal::ONE + annual;
    if base <= Decimal::ZERO {
        return Err(FinanceError::InvalidInput {
            field: "annual_rate".into(),
            reason: "Annual rate must be greater than -100%".into(),
        });
    }
    let exponent = Decimal::ONE / Decimal::from(periods_per_year);
    let root = base
        .checked_powd(exponent)
        .ok_or_else(|| FinanceError::NumericOverflow {
            context: format!("periodic equivalent of {annual}"),
        })?;
    Ok(root - Decimal::ONE)
}
