//! Personal affordability: debt-to-income tiering and advice.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use super::advice::{render, AdviceClause};
use super::{IncomeAllocation, InvestmentResult, Recommendation};
use crate::amortization::{CalculationResult, LoanInputs, LoanPurpose};
use crate::types::{Money, Percentage};

const DTI_SAFE_MAX: Percentage = dec!(30);
const DTI_CAUTION_MAX: Percentage = dec!(45);
const CAR_RUNNING_COST_DTI: Percentage = dec!(30);
const HOME_TERM_EXTENSION_DTI: Percentage = dec!(40);

/// Installment as a percentage of monthly income; zero when income is not
/// positive, `Decimal::MAX` when the ratio exceeds the representable range.
pub fn debt_to_income(payment: Money, monthly_income: Money) -> Percentage {
    if monthly_income <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    payment
        .checked_div(monthly_income)
        .and_then(|ratio| ratio.checked_mul(dec!(100)))
        .unwrap_or_else(|| {
            debug!(%payment, %monthly_income, "DTI out of range; saturating");
            Decimal::MAX
        })
}

pub fn tier(dti: Percentage) -> Recommendation {
    if dti <= DTI_SAFE_MAX {
        Recommendation::Safe
    } else if dti <= DTI_CAUTION_MAX {
        Recommendation::Caution
    } else {
        Recommendation::Risky
    }
}

pub(crate) fn appraise(loan: &CalculationResult, inputs: &LoanInputs) -> InvestmentResult {
    let payment = loan.display_payment;
    let dti = debt_to_income(payment, inputs.monthly_income);
    let recommendation = tier(dti);
    debug!(%dti, ?recommendation, "personal affordability");

    let mut clauses = vec![match recommendation {
        Recommendation::Safe => AdviceClause::DtiSafe { dti },
        Recommendation::Caution => AdviceClause::DtiModerate { dti },
        _ => AdviceClause::DtiExcessive { dti },
    }];
    if inputs.purpose == LoanPurpose::CarBuying && dti > CAR_RUNNING_COST_DTI {
        clauses.push(AdviceClause::CarRunningCosts);
    }
    if inputs.purpose == LoanPurpose::HomeBuying && dti > HOME_TERM_EXTENSION_DTI {
        clauses.push(AdviceClause::ExtendHomeLoanTerm);
    }
    if inputs.grace_period_months > 0 {
        clauses.push(AdviceClause::GracePaymentShock {
            grace_months: inputs.grace_period_months,
        });
    }
    if inputs.balloon_amount > Decimal::ZERO {
        clauses.push(AdviceClause::BalloonPayoff {
            balloon: inputs.balloon_amount,
        });
    }

    let remaining_income = if inputs.monthly_income > payment {
        inputs.monthly_income - payment
    } else {
        Decimal::ZERO
    };

    InvestmentResult {
        dti,
        recommendation,
        advice: render(&clauses),
        advice_clauses: clauses,
        income_allocation: Some(IncomeAllocation {
            debt_payment: payment,
            remaining_income,
        }),
        ..InvestmentResult::default()
    }
}
