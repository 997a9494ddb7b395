//! Loan input record and its enumerated tags.
//!
//! Purpose and borrower defaults live here too: they only seed inputs and
//! select advice clauses, the schedule math never reads them.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::{Money, Percentage};

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Borrower category; selects the appraisal branch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserType {
    #[default]
    Personal,
    Business,
}

/// What the loan is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanPurpose {
    Consumption,
    HomeBuying,
    CarBuying,
    WorkingCapital,
    AssetPurchase,
    ProjectInvestment,
}

/// How principal and interest are split across the amortization phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RepaymentMethod {
    /// Constant total payment per period.
    #[default]
    Annuity,
    /// Constant principal per period, interest on the declining balance.
    ReducingBalance,
    /// Constant principal per period, interest on the original amount.
    FlatRate,
}

/// Payment periods per year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentFrequency {
    #[default]
    Monthly,
    Quarterly,
    SemiAnnually,
    Yearly,
}

impl PaymentFrequency {
    pub fn periods_per_year(self) -> u32 {
        match self {
            Self::Monthly => 12,
            Self::Quarterly => 4,
            Self::SemiAnnually => 2,
            Self::Yearly => 1,
        }
    }

    pub fn months_per_period(self) -> u32 {
        12 / self.periods_per_year()
    }
}

/// Suggested term and rate for a loan purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurposeDefaults {
    pub term_months: u32,
    pub annual_rate: Percentage,
}

impl LoanPurpose {
    pub const ALL: [LoanPurpose; 6] = [
        Self::HomeBuying,
        Self::CarBuying,
        Self::Consumption,
        Self::WorkingCapital,
        Self::AssetPurchase,
        Self::ProjectInvestment,
    ];

    /// Borrower category the purpose is offered to.
    pub fn user_type(self) -> UserType {
        match self {
            Self::Consumption | Self::HomeBuying | Self::CarBuying => UserType::Personal,
            Self::WorkingCapital | Self::AssetPurchase | Self::ProjectInvestment => {
                UserType::Business
            }
        }
    }

    /// Typical market term and rate, used to pre-fill inputs.
    pub fn suggested_terms(self) -> PurposeDefaults {
        let (term_months, annual_rate) = match self {
            Self::HomeBuying => (240, dec!(7.5)),
            Self::CarBuying => (60, dec!(9.5)),
            // Unsecured
            Self::Consumption => (36, dec!(18.0)),
            Self::WorkingCapital => (6, dec!(6.5)),
            Self::ProjectInvestment => (60, dec!(8.0)),
            Self::AssetPurchase => (48, dec!(8.5)),
        };
        PurposeDefaults {
            term_months,
            annual_rate,
        }
    }
}

// ---------------------------------------------------------------------------
// String forms (CLI flags, bindings)
// ---------------------------------------------------------------------------

fn normalise(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .collect::<String>()
        .to_ascii_lowercase()
}

impl FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise(s).as_str() {
            "personal" => Ok(Self::Personal),
            "business" => Ok(Self::Business),
            _ => Err(format!("unknown user type '{s}' (expected personal or business)")),
        }
    }
}

impl FromStr for LoanPurpose {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise(s).as_str() {
            "consumption" => Ok(Self::Consumption),
            "homebuying" | "home" => Ok(Self::HomeBuying),
            "carbuying" | "car" => Ok(Self::CarBuying),
            "workingcapital" => Ok(Self::WorkingCapital),
            "assetpurchase" => Ok(Self::AssetPurchase),
            "projectinvestment" | "project" => Ok(Self::ProjectInvestment),
            _ => Err(format!("unknown loan purpose '{s}'")),
        }
    }
}

impl FromStr for RepaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise(s).as_str() {
            "annuity" => Ok(Self::Annuity),
            "reducingbalance" | "reducing" => Ok(Self::ReducingBalance),
            "flatrate" | "flat" => Ok(Self::FlatRate),
            _ => Err(format!(
                "unknown repayment method '{s}' (expected annuity, reducing-balance or flat-rate)"
            )),
        }
    }
}

impl FromStr for PaymentFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise(s).as_str() {
            "monthly" | "12" => Ok(Self::Monthly),
            "quarterly" | "4" => Ok(Self::Quarterly),
            "semiannually" | "semiannual" | "2" => Ok(Self::SemiAnnually),
            "yearly" | "annually" | "annual" | "1" => Ok(Self::Yearly),
            _ => Err(format!("unknown payment frequency '{s}'")),
        }
    }
}

impl fmt::Display for LoanPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Consumption => "consumption",
            Self::HomeBuying => "home-buying",
            Self::CarBuying => "car-buying",
            Self::WorkingCapital => "working-capital",
            Self::AssetPurchase => "asset-purchase",
            Self::ProjectInvestment => "project-investment",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Loan inputs
// ---------------------------------------------------------------------------

/// Everything the amortization engine needs for one calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanInputs {
    /// Principal borrowed.
    pub amount: Money,
    /// Nominal annual interest rate, percent.
    pub annual_rate: Percentage,
    pub term_months: u32,
    /// Annual inflation, percent. Only deflates payments for the real-value column.
    pub inflation: Percentage,
    pub user_type: UserType,
    pub purpose: LoanPurpose,
    pub repayment_method: RepaymentMethod,
    pub frequency: PaymentFrequency,
    /// Corporate tax rate, percent (business borrowers only).
    pub tax_rate: Percentage,
    /// Monthly income (personal borrowers only).
    pub monthly_income: Money,
    /// Interest-only months at the start of the loan.
    #[serde(default)]
    pub grace_period_months: u32,
    /// Lump-sum principal due with the final payment.
    #[serde(default)]
    pub balloon_amount: Money,
}

impl LoanInputs {
    /// Sensible starting inputs for each borrower category.
    pub fn defaults_for(user_type: UserType) -> Self {
        let (purpose, amount, annual_rate, term_months) = match user_type {
            UserType::Personal => (
                LoanPurpose::HomeBuying,
                dec!(2_000_000_000),
                dec!(8.5),
                240,
            ),
            UserType::Business => (
                LoanPurpose::WorkingCapital,
                dec!(5_000_000_000),
                dec!(7.5),
                12,
            ),
        };
        LoanInputs {
            amount,
            annual_rate,
            term_months,
            inflation: dec!(4),
            user_type,
            purpose,
            repayment_method: RepaymentMethod::Annuity,
            frequency: PaymentFrequency::Monthly,
            tax_rate: dec!(20),
            monthly_income: dec!(60_000_000),
            grace_period_months: 0,
            balloon_amount: Decimal::ZERO,
        }
    }

    /// Switch purpose and adopt its suggested term and rate.
    pub fn with_purpose(mut self, purpose: LoanPurpose) -> Self {
        let suggested = purpose.suggested_terms();
        self.purpose = purpose;
        self.term_months = suggested.term_months;
        self.annual_rate = suggested.annual_rate;
        self
    }
}

impl Default for LoanInputs {
    fn default() -> Self {
        Self::defaults_for(UserType::Personal)
    }
}
