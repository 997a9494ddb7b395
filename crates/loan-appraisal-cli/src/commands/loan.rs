use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tracing::debug;

use loan_appraisal_core::amortization::{
    analyze_loan, LoanInputs, LoanPurpose, PaymentFrequency, RepaymentMethod, UserType,
};

use crate::input;

/// Loan flags shared by every subcommand. Unset flags fall back to the
/// borrower defaults for `--user-type`.
#[derive(Args, Debug, Default)]
pub struct LoanArgs {
    /// Borrower type (personal, business)
    #[arg(long)]
    pub user_type: Option<UserType>,

    /// Loan purpose; also picks the suggested term and rate unless given
    #[arg(long)]
    pub purpose: Option<LoanPurpose>,

    /// Principal borrowed
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Nominal annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan term in months
    #[arg(long)]
    pub term_months: Option<u32>,

    /// Annual inflation in percent
    #[arg(long)]
    pub inflation: Option<Decimal>,

    /// Repayment method (annuity, reducing-balance, flat-rate)
    #[arg(long)]
    pub method: Option<RepaymentMethod>,

    /// Payment frequency (monthly, quarterly, semi-annually, yearly)
    #[arg(long)]
    pub frequency: Option<PaymentFrequency>,

    /// Corporate tax rate in percent
    #[arg(long)]
    pub tax_rate: Option<Decimal>,

    /// Monthly income
    #[arg(long)]
    pub monthly_income: Option<Decimal>,

    /// Interest-only months at the start
    #[arg(long, alias = "grace")]
    pub grace_months: Option<u32>,

    /// Principal due with the final payment
    #[arg(long)]
    pub balloon: Option<Decimal>,
}

impl LoanArgs {
    /// Layer the flags over borrower and purpose defaults.
    pub fn into_inputs(self) -> LoanInputs {
        let user_type = self
            .user_type
            .or_else(|| self.purpose.map(LoanPurpose::user_type))
            .unwrap_or_default();
        let mut inputs = LoanInputs::defaults_for(user_type);

        if let Some(purpose) = self.purpose {
            inputs = inputs.with_purpose(purpose);
        }
        if let Some(amount) = self.amount {
            inputs.amount = amount;
        }
        if let Some(rate) = self.rate {
            inputs.annual_rate = rate;
        }
        if let Some(term) = self.term_months {
            inputs.term_months = term;
        }
        if let Some(inflation) = self.inflation {
            inputs.inflation = inflation;
        }
        if let Some(method) = self.method {
            inputs.repayment_method = method;
        }
        if let Some(frequency) = self.frequency {
            inputs.frequency = frequency;
        }
        if let Some(tax_rate) = self.tax_rate {
            inputs.tax_rate = tax_rate;
        }
        if let Some(income) = self.monthly_income {
            inputs.monthly_income = income;
        }
        if let Some(grace) = self.grace_months {
            inputs.grace_period_months = grace;
        }
        if let Some(balloon) = self.balloon {
            inputs.balloon_amount = balloon;
        }
        inputs
    }
}

/// Arguments for schedule generation
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to a JSON or YAML loan input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanArgs,
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let inputs: LoanInputs = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        args.loan.into_inputs()
    };
    debug!(?inputs, "schedule inputs");

    let result = analyze_loan(&inputs)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_defaults() -> Result<Value, Box<dyn std::error::Error>> {
    let purposes: Vec<Value> = LoanPurpose::ALL
        .iter()
        .map(|purpose| {
            let suggested = purpose.suggested_terms();
            json!({
                "purpose": purpose,
                "user_type": purpose.user_type(),
                "term_months": suggested.term_months,
                "annual_rate": suggested.annual_rate,
            })
        })
        .collect();

    Ok(json!({
        "result": {
            "personal": LoanInputs::defaults_for(UserType::Personal),
            "business": LoanInputs::defaults_for(UserType::Business),
            "purposes": purposes,
        }
    }))
}
