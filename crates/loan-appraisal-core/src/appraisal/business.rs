//! Business project viability: equity cash-flow series, NPV, IRR, DSCR and
//! the NPV/DSCR recommendation matrix.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use super::advice::{render, AdviceClause, VerdictFigures};
use super::{InvestmentInputs, InvestmentResult, Recommendation, YearlyCashFlow};
use crate::amortization::{CalculationResult, LoanInputs, PaymentFrequency, ScheduleRow};
use crate::error::FinanceError;
use crate::time_value::{irr, npv, IRR_DEFAULT_GUESS};
use crate::types::{pct_to_rate, rate_to_pct, Money, Multiple};
use crate::FinanceResult;

/// Minimum DSCR lenders conventionally accept.
pub const DSCR_SAFE: Multiple = dec!(1.2);
/// Upper edge of the thin-coverage band that triggers the refinancing note.
const DSCR_BALLOON_WATCH: Multiple = dec!(1.5);

/// Sum scheduled payments into `years` yearly buckets (period p falls in
/// year ceil(p / periods_per_year)). Periods beyond the last year are dropped.
pub fn debt_service_by_year(
    schedule: &[ScheduleRow],
    frequency: PaymentFrequency,
    years: usize,
) -> Vec<Money> {
    let per_year = frequency.periods_per_year();
    let mut buckets = vec![Decimal::ZERO; years];
    for row in schedule.iter().filter(|r| r.period > 0) {
        let year_index = ((row.period - 1) / per_year) as usize;
        if let Some(bucket) = buckets.get_mut(year_index) {
            *bucket += row.payment;
        }
    }
    buckets
}

/// Number of whole or partial years the appraisal covers.
pub fn appraisal_years(inputs: &LoanInputs) -> usize {
    inputs.term_months.div_ceil(12) as usize
}

/// Per-year operating cash flow against debt service.
///
/// A coverage ratio past the representable range saturates at `Decimal::MAX`
/// (or `Decimal::MIN` for a negative operating cash flow).
pub fn yearly_cash_flows(
    operating_cash_flow: Money,
    debt_service: &[Money],
) -> FinanceResult<Vec<YearlyCashFlow>> {
    debt_service
        .iter()
        .enumerate()
        .map(|(i, ds)| -> FinanceResult<YearlyCashFlow> {
            let year = i as u32 + 1;
            let net_cash_flow = operating_cash_flow.checked_sub(*ds).ok_or_else(|| {
                FinanceError::NumericOverflow {
                    context: format!("net cash flow in year {year}"),
                }
            })?;
            let dscr = if ds.is_zero() {
                None
            } else {
                let bound = if operating_cash_flow.is_sign_negative() {
                    Decimal::MIN
                } else {
                    Decimal::MAX
                };
                Some(operating_cash_flow.checked_div(*ds).unwrap_or(bound))
            };
            Ok(YearlyCashFlow {
                year,
                operating_cash_flow,
                debt_service: *ds,
                net_cash_flow,
                dscr,
            })
        })
        .collect()
}

/// Equity outflow at t=0 followed by each year's net cash flow.
pub fn cash_flow_series(equity: Money, years: &[YearlyCashFlow]) -> Vec<Money> {
    std::iter::once(-equity)
        .chain(years.iter().map(|y| y.net_cash_flow))
        .collect()
}

/// Lowest DSCR among years that carry debt service; `None` if none do.
pub fn binding_dscr(years: &[YearlyCashFlow]) -> Option<Multiple> {
    years.iter().filter_map(|y| y.dscr).min()
}

/// Cash-flow series the business appraisal discounts.
pub fn project_cash_flows(
    investment: &InvestmentInputs,
    loan: &CalculationResult,
    inputs: &LoanInputs,
) -> FinanceResult<Vec<Money>> {
    let debt_service = debt_service_by_year(&loan.schedule, inputs.frequency, appraisal_years(inputs));
    let years = yearly_cash_flows(investment.projected_cashflow, &debt_service)?;
    Ok(cash_flow_series(investment.equity, &years))
}

pub(crate) fn appraise(
    investment: &InvestmentInputs,
    loan: &CalculationResult,
    inputs: &LoanInputs,
) -> FinanceResult<InvestmentResult> {
    if investment.equity <= Decimal::ZERO {
        debug!(equity = %investment.equity, "business appraisal needs positive equity");
        return Ok(InvestmentResult::inconclusive(AdviceClause::MissingEquity));
    }

    let debt_service =
        debt_service_by_year(&loan.schedule, inputs.frequency, appraisal_years(inputs));
    let years = yearly_cash_flows(investment.projected_cashflow, &debt_service)?;
    let flows = cash_flow_series(investment.equity, &years);
    let min_dscr = binding_dscr(&years);

    let npv_value = npv(pct_to_rate(investment.wacc), &flows)?;
    let irr_solution = irr(&flows, IRR_DEFAULT_GUESS);
    let irr_pct = rate_to_pct(irr_solution.rate);

    let dscr_safe = min_dscr.map_or(true, |d| d >= DSCR_SAFE);
    let positive_npv = npv_value > Decimal::ZERO;
    debug!(%npv_value, ?min_dscr, %irr_pct, converged = irr_solution.converged, "business appraisal");

    let figures = VerdictFigures {
        npv: npv_value,
        min_dscr,
        irr_pct,
        wacc_pct: investment.wacc,
    };
    let (recommendation, verdict) = match (positive_npv, dscr_safe) {
        (true, true) => (Recommendation::Invest, AdviceClause::StrongInvestment(figures)),
        (false, false) => (Recommendation::Reject, AdviceClause::ValueDestroying(figures)),
        (true, false) => (Recommendation::Caution, AdviceClause::RestructureDebt(figures)),
        (false, true) => (Recommendation::Caution, AdviceClause::StrategicOnly(figures)),
    };

    let mut clauses = vec![verdict];
    if inputs.balloon_amount > Decimal::ZERO {
        if let Some(d) = min_dscr.filter(|d| *d > DSCR_SAFE && *d < DSCR_BALLOON_WATCH) {
            clauses.push(AdviceClause::BalloonRefinancing { min_dscr: d });
        }
    }

    Ok(InvestmentResult {
        npv: npv_value,
        irr: irr_pct,
        min_dscr: min_dscr.unwrap_or(Decimal::ZERO),
        dti: Decimal::ZERO,
        recommendation,
        advice: render(&clauses),
        advice_clauses: clauses,
        yearly_cash_flows: years,
        income_allocation: None,
        irr_solution: Some(irr_solution),
    })
}
