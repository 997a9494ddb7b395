//! Investment appraisal over a computed loan schedule.
//!
//! Personal borrowers get a debt-to-income affordability verdict; business
//! borrowers get an NPV / IRR / DSCR project-viability verdict. Both come
//! with generated advice.

pub mod advice;
pub mod business;
pub mod personal;
pub mod profile;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::warn;

use crate::amortization::{analyze_loan, CalculationResult, LoanInputs, UserType};
use crate::error::FinanceError;
use crate::time_value::IrrSolution;
use crate::types::{with_metadata, ComputationOutput, Money, Multiple, Percentage};
use crate::FinanceResult;

pub use advice::{AdviceClause, VerdictFigures};
pub use profile::{npv_profile, NpvProfilePoint};

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentInputs {
    /// Owner's equity put in at t=0 (business only).
    pub equity: Money,
    /// Operating cash flow per year, held flat over the loan term.
    pub projected_cashflow: Money,
    /// Weighted average cost of capital, percent per year.
    pub wacc: Percentage,
}

impl Default for InvestmentInputs {
    fn default() -> Self {
        InvestmentInputs {
            equity: dec!(1_000_000_000),
            projected_cashflow: dec!(600_000_000),
            wacc: dec!(12),
        }
    }
}

/// Loan and investment inputs appraised together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppraisalInput {
    pub loan: LoanInputs,
    #[serde(default)]
    pub investment: InvestmentInputs,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    // Business
    Invest,
    Reject,
    // Shared
    #[default]
    Caution,
    // Personal
    Safe,
    Risky,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Invest => "INVEST",
            Self::Reject => "REJECT",
            Self::Caution => "CAUTION",
            Self::Safe => "SAFE",
            Self::Risky => "RISKY",
        };
        write!(f, "{s}")
    }
}

/// One appraisal year of the business cash-flow series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyCashFlow {
    /// 1-based year.
    pub year: u32,
    pub operating_cash_flow: Money,
    pub debt_service: Money,
    pub net_cash_flow: Money,
    /// `None` for a year without debt service.
    pub dscr: Option<Multiple>,
}

/// How the steady-state installment splits a personal borrower's income.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeAllocation {
    pub debt_payment: Money,
    pub remaining_income: Money,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvestmentResult {
    pub npv: Money,
    /// Percentage.
    pub irr: Percentage,
    /// Lowest DSCR across years with debt service; zero when no year has any.
    pub min_dscr: Multiple,
    /// Percentage (personal only).
    pub dti: Percentage,
    pub recommendation: Recommendation,
    pub advice: String,
    pub advice_clauses: Vec<AdviceClause>,
    pub yearly_cash_flows: Vec<YearlyCashFlow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub income_allocation: Option<IncomeAllocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub irr_solution: Option<IrrSolution>,
}

impl InvestmentResult {
    /// Zeroed CAUTION result carrying a single explanatory clause.
    pub fn inconclusive(clause: AdviceClause) -> Self {
        InvestmentResult {
            recommendation: Recommendation::Caution,
            advice: clause.to_string(),
            advice_clauses: vec![clause],
            ..InvestmentResult::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Appraise a loan schedule against the borrower's situation.
///
/// Branches on `loan_inputs.user_type`. Never fails: a business appraisal
/// that cannot be evaluated comes back as an inconclusive CAUTION.
pub fn compute_appraisal(
    investment: &InvestmentInputs,
    loan: &CalculationResult,
    loan_inputs: &LoanInputs,
) -> InvestmentResult {
    match loan_inputs.user_type {
        UserType::Personal => personal::appraise(loan, loan_inputs),
        UserType::Business => business::appraise(investment, loan, loan_inputs)
            .unwrap_or_else(|e| {
                warn!(error = %e, "business appraisal failed");
                InvestmentResult::inconclusive(AdviceClause::Unevaluable {
                    reason: e.to_string(),
                })
            }),
    }
}

/// Schedule the loan, appraise it, and wrap the verdict with warnings and metadata.
pub fn appraise(input: &AppraisalInput) -> FinanceResult<ComputationOutput<InvestmentResult>> {
    appraise_with_schedule(input).map(|(_, output)| output)
}

/// [`appraise`], also handing back the schedule the verdict was computed on.
pub fn appraise_with_schedule(
    input: &AppraisalInput,
) -> FinanceResult<(CalculationResult, ComputationOutput<InvestmentResult>)> {
    let start = Instant::now();

    validate_investment(&input.investment)?;
    let loan_output = analyze_loan(&input.loan)?;
    let mut warnings = loan_output.warnings;
    let loan = loan_output.result;

    let result = match input.loan.user_type {
        UserType::Personal => personal::appraise(&loan, &input.loan),
        UserType::Business => business::appraise(&input.investment, &loan, &input.loan)?,
    };

    match input.loan.user_type {
        UserType::Personal => {
            if input.loan.monthly_income <= Decimal::ZERO {
                warnings.push("Monthly income is zero; DTI reported as 0.".into());
            }
        }
        UserType::Business => {
            if input.investment.equity <= Decimal::ZERO {
                warnings.push("Equity must be positive for a project appraisal.".into());
            }
            if let Some(sol) = result.irr_solution.filter(|s| !s.converged) {
                warnings.push(format!(
                    "IRR did not converge after {} iterations; reporting the last iterate.",
                    sol.iterations
                ));
            }
            if !result.yearly_cash_flows.is_empty()
                && result.yearly_cash_flows.iter().all(|y| y.dscr.is_none())
            {
                warnings.push("No year carries debt service; DSCR is unbounded (reported as 0).".into());
            }
        }
    }

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "user_type": input.loan.user_type,
        "dti_thresholds_pct": { "safe_max": "30", "caution_max": "45" },
        "dscr_safe": business::DSCR_SAFE.to_string(),
        "cash_flow": "constant yearly operating cash flow less scheduled debt service",
        "irr": "Newton-Raphson from 10%, 50 iterations, tolerance 1e-5",
    });

    let output = with_metadata(
        "Investment appraisal (DTI / NPV / IRR / DSCR)",
        &assumptions,
        warnings,
        elapsed,
        result,
    );
    Ok((loan, output))
}

fn validate_investment(investment: &InvestmentInputs) -> FinanceResult<()> {
    if investment.wacc <= dec!(-100) {
        return Err(FinanceError::InvalidInput {
            field: "wacc".into(),
            reason: "WACC must be greater than -100%.".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::compute_schedule;

    #[test]
    fn test_recommendation_display() {
        assert_eq!(Recommendation::Invest.to_string(), "INVEST");
        assert_eq!(Recommendation::Risky.to_string(), "RISKY");
    }

    #[test]
    fn test_personal_branch_leaves_business_fields_zero() {
        let inputs = LoanInputs::defaults_for(UserType::Personal);
        let loan = compute_schedule(&inputs);
        let r = compute_appraisal(&InvestmentInputs::default(), &loan, &inputs);
        assert_eq!(r.npv, Decimal::ZERO);
        assert_eq!(r.irr, Decimal::ZERO);
        assert_eq!(r.min_dscr, Decimal::ZERO);
        assert!(r.dti > Decimal::ZERO);
        assert!(r.irr_solution.is_none());
    }

    #[test]
    fn test_appraise_rejects_bad_wacc() {
        let input = AppraisalInput {
            loan: LoanInputs::defaults_for(UserType::Business),
            investment: InvestmentInputs {
                wacc: dec!(-100),
                ..InvestmentInputs::default()
            },
        };
        match appraise(&input).unwrap_err() {
            FinanceError::InvalidInput { field, .. } => assert_eq!(field, "wacc"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_appraise_with_schedule_returns_the_appraised_loan() {
        let input = AppraisalInput {
            loan: LoanInputs::defaults_for(UserType::Business),
            investment: InvestmentInputs::default(),
        };
        let (loan, output) = appraise_with_schedule(&input).unwrap();
        assert_eq!(loan, compute_schedule(&input.loan));
        assert_eq!(output.result, appraise(&input).unwrap().result);
        assert_eq!(output.result.yearly_cash_flows.len(), 1);
    }

    #[test]
    fn test_appraise_warns_on_missing_income() {
        let mut loan = LoanInputs::defaults_for(UserType::Personal);
        loan.monthly_income = Decimal::ZERO;
        let out = appraise(&AppraisalInput {
            loan,
            investment: InvestmentInputs::default(),
        })
        .unwrap();
        assert_eq!(out.result.dti, Decimal::ZERO);
        assert_eq!(out.result.recommendation, Recommendation::Safe);
        assert!(out.warnings.iter().any(|w| w.contains("income")));
    }

    #[test]
    fn test_appraise_missing_equity_warns() {
        let out = appraise(&AppraisalInput {
            loan: LoanInputs::defaults_for(UserType::Business),
            investment: InvestmentInputs {
                equity: Decimal::ZERO,
                ..InvestmentInputs::default()
            },
        })
        .unwrap();
        assert_eq!(out.result.recommendation, Recommendation::Caution);
        assert!(out.warnings.iter().any(|w| w.contains("Equity")));
    }
}
