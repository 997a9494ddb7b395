//! Advice catalog.
//!
//! Each clause is an independent fragment selected by its own guard in the
//! personal or business branch; the clause carries the figures it cites and
//! renders itself as prose. The joined text is what callers display.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{Money, Multiple, Percentage};

const MILLION: Decimal = dec!(1_000_000);

/// Figures the business verdict paragraphs cite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VerdictFigures {
    pub npv: Money,
    /// `None` when no year carries debt service.
    pub min_dscr: Option<Multiple>,
    pub irr_pct: Percentage,
    pub wacc_pct: Percentage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AdviceClause {
    // Personal: DTI tier
    DtiSafe { dti: Percentage },
    DtiModerate { dti: Percentage },
    DtiExcessive { dti: Percentage },
    // Personal: purpose and structure caveats
    CarRunningCosts,
    ExtendHomeLoanTerm,
    GracePaymentShock { grace_months: u32 },
    BalloonPayoff { balloon: Money },
    // Business: input prompt
    MissingEquity,
    Unevaluable { reason: String },
    // Business: recommendation matrix
    StrongInvestment(VerdictFigures),
    ValueDestroying(VerdictFigures),
    RestructureDebt(VerdictFigures),
    StrategicOnly(VerdictFigures),
    BalloonRefinancing { min_dscr: Multiple },
}

/// Join rendered clauses, one per line.
pub fn render(clauses: &[AdviceClause]) -> String {
    clauses
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fixed-point text, half away from zero.
fn fixed(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", dp as usize, rounded)
}

fn millions(amount: Money) -> String {
    format!("{}M", fixed(amount / MILLION, 0))
}

fn dscr_text(min_dscr: Option<Multiple>) -> String {
    match min_dscr {
        Some(d) => format!("{}x", fixed(d, 2)),
        None => "unbounded (no debt service due)".to_string(),
    }
}

fn irr_vs_wacc(f: &VerdictFigures) -> String {
    let side = if f.irr_pct > f.wacc_pct { "above" } else { "below" };
    format!(
        "IRR of {}% is {side} the {}% WACC.",
        fixed(f.irr_pct, 2),
        fixed(f.wacc_pct, 2)
    )
}

impl fmt::Display for AdviceClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DtiSafe { dti } => write!(
                f,
                "Your debt-to-income ratio (DTI) is {}%, inside the safe threshold (<30%). \
                 Your cash flow leaves comfortable room for living costs and other investments. \
                 This loan is very affordable.",
                fixed(*dti, 1)
            ),
            Self::DtiModerate { dti } => write!(
                f,
                "Your debt-to-income ratio (DTI) is {}%, a moderate level. \
                 Keep a tight grip on household spending: if floating rates rise, \
                 repayment pressure will become heavy.",
                fixed(*dti, 1)
            ),
            Self::DtiExcessive { dti } => write!(
                f,
                "WARNING: DTI is {}% (>45%). The debt burden is too large for your income! \
                 Default risk is very high if income drops or rates rise. \
                 Consider: 1) borrowing less, or 2) putting in more of your own capital.",
                fixed(*dti, 1)
            ),
            Self::CarRunningCosts => write!(
                f,
                "Note: a car is a depreciating asset with running costs (fuel, maintenance, \
                 roughly 3-5M per month). Add those costs to your repayment burden."
            ),
            Self::ExtendHomeLoanTerm => write!(
                f,
                "TIP: with DTI above 40%, consider stretching the loan to 20-30 years \
                 (240-360 months). A longer term lowers the monthly installment considerably."
            ),
            Self::GracePaymentShock { grace_months } => write!(
                f,
                "You are using a {grace_months}-month principal grace period. Once it ends, \
                 installments rise because principal repayment begins. Have cash flow ready for that point."
            ),
            Self::BalloonPayoff { balloon } => write!(
                f,
                "The final balloon payment of {} is a heavy obligation. Make sure you have a plan \
                 to save up or sell assets to settle it on time.",
                millions(*balloon)
            ),
            Self::MissingEquity => write!(f, "Please enter a valid owner's equity amount."),
            Self::Unevaluable { reason } => {
                write!(f, "The project could not be evaluated: {reason}.")
            }
            Self::StrongInvestment(v) => write!(
                f,
                "HIGHLY VIABLE. A positive NPV ({}) shows the project creates real value. \
                 A minimum DSCR of {} keeps debt service covered even if cash flow wobbles. {}",
                millions(v.npv),
                dscr_text(v.min_dscr),
                irr_vs_wacc(v)
            ),
            Self::ValueDestroying(v) => write!(
                f,
                "DO NOT INVEST. The project destroys value (NPV {}). Operating cash flow does not \
                 cover debt service (minimum DSCR {} < 1.2). Insolvency risk is high. {}",
                millions(v.npv),
                dscr_text(v.min_dscr),
                irr_vs_wacc(v)
            ),
            Self::RestructureDebt(v) => write!(
                f,
                "PROCEED WITH CARE. The project is profitable (NPV {}) but debt service weighs \
                 heavily in the early years (minimum DSCR {}). Restructure the debt (extend the \
                 term) or hold a working-capital reserve to avoid a liquidity squeeze. {}",
                millions(v.npv),
                dscr_text(v.min_dscr),
                irr_vs_wacc(v)
            ),
            Self::StrategicOnly(v) => write!(
                f,
                "CONSIDER. Debt service is covered (minimum DSCR {}) but the return is weak \
                 (NPV {}). Invest only for non-financial strategic benefits such as market share \
                 or brand. {}",
                dscr_text(v.min_dscr),
                millions(v.npv),
                irr_vs_wacc(v)
            ),
            Self::BalloonRefinancing { min_dscr } => write!(
                f,
                "Note: with a large balloon due at maturity and a minimum DSCR of only {}, \
                 line up refinancing or build a cash reserve in advance.",
                dscr_text(Some(*min_dscr))
            ),
        }
    }
}
