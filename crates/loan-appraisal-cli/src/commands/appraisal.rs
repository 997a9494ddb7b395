use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tracing::debug;

use loan_appraisal_core::appraisal::{
    appraise, appraise_with_schedule, npv_profile, AppraisalInput, InvestmentInputs,
};

use super::loan::LoanArgs;
use crate::input;

/// Arguments for appraisal and NPV profile
#[derive(Args)]
pub struct AppraiseArgs {
    /// Path to a JSON or YAML appraisal input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanArgs,

    /// Owner's equity invested at t=0
    #[arg(long)]
    pub equity: Option<Decimal>,

    /// Operating cash flow per year
    #[arg(long, alias = "cashflow")]
    pub projected_cashflow: Option<Decimal>,

    /// Weighted average cost of capital in percent
    #[arg(long)]
    pub wacc: Option<Decimal>,
}

impl AppraiseArgs {
    fn resolve(self) -> Result<AppraisalInput, Box<dyn std::error::Error>> {
        if let Some(ref path) = self.input {
            return input::file::read_input(path);
        }
        if let Some(data) = input::stdin::read_stdin()? {
            return Ok(data);
        }

        let defaults = InvestmentInputs::default();
        Ok(AppraisalInput {
            loan: self.loan.into_inputs(),
            investment: InvestmentInputs {
                equity: self.equity.unwrap_or(defaults.equity),
                projected_cashflow: self.projected_cashflow.unwrap_or(defaults.projected_cashflow),
                wacc: self.wacc.unwrap_or(defaults.wacc),
            },
        })
    }
}

pub fn run_appraise(args: AppraiseArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input = args.resolve()?;
    debug!(?input, "appraisal inputs");

    let result = appraise(&input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_npv_profile(args: AppraiseArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input = args.resolve()?;
    let (loan, appraisal) = appraise_with_schedule(&input)?;
    let points = npv_profile(&input.investment, &loan, &input.loan, appraisal.result.irr);

    let mut warnings = appraisal.warnings;
    if points.is_empty() {
        warnings.push("NPV profile applies to business borrowers with positive equity.".into());
    }

    Ok(json!({
        "result": {
            "irr": appraisal.result.irr,
            "wacc": input.investment.wacc,
            "npv_at_wacc": appraisal.result.npv,
            "points": points,
        },
        "methodology": "NPV of the equity cash-flow series at evenly spaced discount rates",
        "warnings": warnings,
    }))
}
