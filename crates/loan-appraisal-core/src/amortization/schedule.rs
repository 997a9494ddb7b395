//! Period-by-period amortization schedule.
//!
//! Supports annuity, reducing-balance and flat-rate repayment, an
//! interest-only grace phase, and a balloon payment landing with the final
//! installment. The final period absorbs any accumulated drift so the closing
//! balance is exactly zero.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use super::inputs::{LoanInputs, RepaymentMethod, UserType};
use crate::error::FinanceError;
use crate::time_value::{annuity_payment, periodic_equivalent};
use crate::types::{pct_to_rate, with_metadata, ComputationOutput, Money, Rate};
use crate::FinanceResult;

/// Balances below one currency unit are treated as fully repaid.
const BALANCE_TOLERANCE: Money = dec!(1);
const MONTHS_PER_YEAR: u32 = 12;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// A single period of the schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// 1-based period index.
    pub period: u32,
    pub payment: Money,
    pub principal: Money,
    pub interest: Money,
    /// Balance remaining after this period's payment.
    pub balance: Money,
    /// Interest × tax rate for business borrowers, zero otherwise.
    pub tax_shield: Money,
    /// Payment deflated by cumulative inflation to period 0 money.
    pub real_payment: Money,
}

/// Schedule plus aggregate totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub total_interest: Money,
    pub total_payment: Money,
    pub total_tax_shield: Money,
    /// Sum of inflation-deflated payments.
    pub real_pv: Money,
    pub schedule: Vec<ScheduleRow>,
    /// Steady-state installment: first post-grace payment when a grace phase
    /// exists, otherwise the first payment.
    pub display_payment: Money,
}

impl CalculationResult {
    pub fn is_empty(&self) -> bool {
        self.schedule.is_empty()
    }

    pub fn total_principal(&self) -> Money {
        self.schedule.iter().map(|r| r.principal).sum()
    }

    pub fn final_balance(&self) -> Money {
        self.schedule
            .last()
            .map(|r| r.balance)
            .unwrap_or(Decimal::ZERO)
    }
}

// ---------------------------------------------------------------------------
// Period arithmetic
// ---------------------------------------------------------------------------

/// Period counts derived from the term, frequency and grace length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodPlan {
    pub total_periods: u32,
    pub grace_periods: u32,
    pub amortization_periods: u32,
}

impl PeriodPlan {
    /// `None` when the loan cannot be scheduled: non-positive amount or term,
    /// or a grace phase that leaves no amortization periods.
    pub fn for_inputs(inputs: &LoanInputs) -> Option<Self> {
        if inputs.amount <= Decimal::ZERO || inputs.term_months == 0 {
            debug!(amount = %inputs.amount, term = inputs.term_months, "non-positive amount or term");
            return None;
        }

        let per_year = inputs.frequency.periods_per_year();
        let total_periods = (inputs.term_months * per_year).div_ceil(MONTHS_PER_YEAR);
        let grace_periods = inputs
            .grace_period_months
            .div_ceil(inputs.frequency.months_per_period());

        if grace_periods >= total_periods {
            debug!(
                grace_periods,
                total_periods, "grace phase consumes the whole term"
            );
            return None;
        }

        Some(PeriodPlan {
            total_periods,
            grace_periods,
            amortization_periods: total_periods - grace_periods,
        })
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build the amortization schedule for `inputs`.
///
/// Never fails: inputs that cannot be scheduled yield an empty schedule with
/// all totals at zero.
pub fn compute_schedule(inputs: &LoanInputs) -> CalculationResult {
    let Some(plan) = PeriodPlan::for_inputs(inputs) else {
        return CalculationResult::default();
    };

    match generate(inputs, &plan) {
        Ok(result) => result,
        Err(e) => {
            warn!(error = %e, "schedule generation failed; returning empty schedule");
            CalculationResult::default()
        }
    }
}

/// Validate inputs, build the schedule, and wrap it with warnings and metadata.
pub fn analyze_loan(inputs: &LoanInputs) -> FinanceResult<ComputationOutput<CalculationResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_loan_inputs(inputs)?;

    let plan = PeriodPlan::for_inputs(inputs);
    let result = match plan {
        Some(plan) => generate(inputs, &plan)?,
        None => {
            warnings.push(
                "Loan cannot be scheduled (non-positive amount or term, or grace period covering the whole term); schedule is empty."
                    .into(),
            );
            CalculationResult::default()
        }
    };

    if inputs.balloon_amount > inputs.amount {
        warnings.push(format!(
            "Balloon {} exceeds the loan amount; clamped to {}.",
            inputs.balloon_amount, inputs.amount
        ));
    }
    if inputs.user_type == UserType::Personal && !inputs.tax_rate.is_zero() {
        warnings.push("Tax rate ignored for personal borrowers; tax shield is zero.".into());
    }
    if let Some(last) = result.schedule.last() {
        if last.payment > result.display_payment * dec!(3) && !inputs.balloon_amount.is_zero() {
            warnings.push(format!(
                "Final payment {} is more than three times the regular installment.",
                last.payment
            ));
        }
    }

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "periodic_rate": "annual_rate / periods_per_year",
        "flat_rate_interest": "amount × annual_rate × years / total_periods",
        "final_period": "absorbs balloon and rounding drift so the closing balance is zero",
        "balance_tolerance": BALANCE_TOLERANCE.to_string(),
        "plan": plan.map(|p| serde_json::json!({
            "total_periods": p.total_periods,
            "grace_periods": p.grace_periods,
            "amortization_periods": p.amortization_periods,
        })),
    });

    Ok(with_metadata(
        "Loan amortization (annuity / reducing balance / flat rate)",
        &assumptions,
        warnings,
        elapsed,
        result,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_loan_inputs(inputs: &LoanInputs) -> FinanceResult<()> {
    if inputs.annual_rate < Decimal::ZERO {
        return Err(FinanceError::InvalidInput {
            field: "annual_rate".into(),
            reason: "Interest rate cannot be negative.".into(),
        });
    }
    if inputs.balloon_amount < Decimal::ZERO {
        return Err(FinanceError::InvalidInput {
            field: "balloon_amount".into(),
            reason: "Balloon amount cannot be negative.".into(),
        });
    }
    if inputs.inflation <= dec!(-100) {
        return Err(FinanceError::InvalidInput {
            field: "inflation".into(),
            reason: "Inflation must be greater than -100%.".into(),
        });
    }
    if inputs.tax_rate < Decimal::ZERO || inputs.tax_rate > dec!(100) {
        return Err(FinanceError::InvalidInput {
            field: "tax_rate".into(),
            reason: "Tax rate must be between 0 and 100 percent.".into(),
        });
    }
    if inputs.monthly_income < Decimal::ZERO {
        return Err(FinanceError::InvalidInput {
            field: "monthly_income".into(),
            reason: "Monthly income cannot be negative.".into(),
        });
    }
    Ok(())
}

/// Per-method parameters fixed for the whole amortization phase.
struct PhaseTerms {
    periodic_rate: Rate,
    balloon: Money,
    /// Level installment (annuity only; `None` when nothing is amortized).
    level_payment: Option<Money>,
    fixed_principal: Money,
    flat_interest: Money,
}

impl PhaseTerms {
    fn new(inputs: &LoanInputs, plan: &PeriodPlan) -> FinanceResult<Self> {
        let per_year = Decimal::from(inputs.frequency.periods_per_year());
        let annual_rate = pct_to_rate(inputs.annual_rate);
        let periodic_rate = annual_rate / per_year;

        let balloon = inputs.balloon_amount.max(Decimal::ZERO).min(inputs.amount);
        let to_amortize = inputs.amount - balloon;
        let amort_periods = Decimal::from(plan.amortization_periods);

        let level_payment = match inputs.repayment_method {
            RepaymentMethod::Annuity if !to_amortize.is_zero() => Some(annuity_payment(
                to_amortize,
                periodic_rate,
                plan.amortization_periods,
            )?),
            _ => None,
        };

        let years = Decimal::from(inputs.term_months) / Decimal::from(MONTHS_PER_YEAR);
        let flat_interest = inputs
            .amount
            .checked_mul(annual_rate)
            .and_then(|v| v.checked_mul(years))
            .and_then(|v| v.checked_div(Decimal::from(plan.total_periods)))
            .ok_or_else(|| overflow("flat-rate interest"))?;

        Ok(PhaseTerms {
            periodic_rate,
            balloon,
            level_payment,
            fixed_principal: to_amortize / amort_periods,
            flat_interest,
        })
    }

    /// (principal, interest, payment) for an amortization-phase period.
    fn split(&self, method: RepaymentMethod, interest_on_balance: Money) -> (Money, Money, Money) {
        match method {
            RepaymentMethod::Annuity => match self.level_payment {
                Some(pmt) => (pmt - interest_on_balance, interest_on_balance, pmt),
                None => (Decimal::ZERO, interest_on_balance, interest_on_balance),
            },
            RepaymentMethod::ReducingBalance => (
                self.fixed_principal,
                interest_on_balance,
                self.fixed_principal + interest_on_balance,
            ),
            RepaymentMethod::FlatRate => (
                self.fixed_principal,
                self.flat_interest,
                self.fixed_principal + self.flat_interest,
            ),
        }
    }
}

fn overflow(context: impl Into<String>) -> FinanceError {
    FinanceError::NumericOverflow {
        context: context.into(),
    }
}

fn accumulate(total: Money, value: Money, what: &str) -> FinanceResult<Money> {
    total.checked_add(value).ok_or_else(|| overflow(what))
}

fn generate(inputs: &LoanInputs, plan: &PeriodPlan) -> FinanceResult<CalculationResult> {
    let terms = PhaseTerms::new(inputs, plan)?;
    let inflation_per_period = periodic_equivalent(
        pct_to_rate(inputs.inflation),
        inputs.frequency.periods_per_year(),
    )?;
    let deflation_step = Decimal::ONE + inflation_per_period;
    let tax_rate = match inputs.user_type {
        UserType::Business => pct_to_rate(inputs.tax_rate),
        UserType::Personal => Decimal::ZERO,
    };

    let mut schedule: Vec<ScheduleRow> = Vec::with_capacity(plan.total_periods as usize);
    let mut result = CalculationResult::default();
    let mut balance = inputs.amount;
    let mut deflator = Decimal::ONE;

    for period in 1..=plan.total_periods {
        let interest_on_balance = balance
            .checked_mul(terms.periodic_rate)
            .ok_or_else(|| overflow(format!("interest at period {period}")))?;

        let (mut principal, interest, mut payment) = if period <= plan.grace_periods {
            (Decimal::ZERO, interest_on_balance, interest_on_balance)
        } else {
            terms.split(inputs.repayment_method, interest_on_balance)
        };

        if period == plan.total_periods {
            principal += terms.balloon;
            payment += terms.balloon;

            // Fold accumulated drift into the last installment.
            let correction = balance - principal;
            principal += correction;
            payment += correction;
        }

        balance -= principal;
        if balance < BALANCE_TOLERANCE {
            balance = Decimal::ZERO;
        }

        let tax_shield = interest
            .checked_mul(tax_rate)
            .ok_or_else(|| overflow(format!("tax shield at period {period}")))?;

        deflator = deflator
            .checked_mul(deflation_step)
            .ok_or_else(|| overflow(format!("inflation deflator at period {period}")))?;
        let real_payment =
            payment
                .checked_div(deflator)
                .ok_or_else(|| FinanceError::DivisionByZero {
                    context: format!("inflation deflator at period {period}"),
                })?;

        result.total_interest = accumulate(result.total_interest, interest, "total interest")?;
        result.total_payment = accumulate(result.total_payment, payment, "total payment")?;
        result.total_tax_shield =
            accumulate(result.total_tax_shield, tax_shield, "total tax shield")?;
        result.real_pv = accumulate(result.real_pv, real_payment, "real present value")?;

        schedule.push(ScheduleRow {
            period,
            payment,
            principal,
            interest,
            balance,
            tax_shield,
            real_payment,
        });
    }

    let display_index = if plan.grace_periods > 0 && schedule.len() > plan.grace_periods as usize {
        plan.grace_periods as usize
    } else {
        0
    };
    result.display_payment = schedule
        .get(display_index)
        .map(|r| r.payment)
        .unwrap_or(Decimal::ZERO);
    result.schedule = schedule;

    Ok(result)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
