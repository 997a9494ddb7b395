//! NPV profile: project NPV swept across discount rates, for charting where
//! the curve crosses zero relative to WACC.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::business::project_cash_flows;
use super::InvestmentInputs;
use crate::amortization::{CalculationResult, LoanInputs, UserType};
use crate::time_value::npv;
use crate::types::{pct_to_rate, Money, Percentage};

const PROFILE_STEPS: u32 = 40;
const MAX_PROFILE_RATE: Percentage = dec!(100);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpvProfilePoint {
    pub rate_pct: Percentage,
    pub npv: Money,
}

/// Highest rate on the sweep: wide enough to show the IRR crossing when one
/// is plausible, never above 100%.
pub fn profile_upper_rate(irr_pct: Percentage, wacc_pct: Percentage) -> Percentage {
    let upper = if irr_pct > Decimal::ZERO && irr_pct < dec!(1000) {
        (irr_pct * dec!(1.5))
            .max(wacc_pct.saturating_mul(dec!(1.5)))
            .max(dec!(30))
    } else {
        wacc_pct.saturating_mul(dec!(2)).max(dec!(40))
    };
    upper.min(MAX_PROFILE_RATE)
}

/// NPV at 41 evenly spaced rates from 0 to [`profile_upper_rate`].
///
/// Empty for personal borrowers and when equity is not positive.
pub fn npv_profile(
    investment: &InvestmentInputs,
    loan: &CalculationResult,
    inputs: &LoanInputs,
    irr_pct: Percentage,
) -> Vec<NpvProfilePoint> {
    if inputs.user_type != UserType::Business || investment.equity <= Decimal::ZERO {
        return Vec::new();
    }

    let flows = match project_cash_flows(investment, loan, inputs) {
        Ok(flows) => flows,
        Err(e) => {
            warn!(error = %e, "NPV profile skipped");
            return Vec::new();
        }
    };
    let step = profile_upper_rate(irr_pct, investment.wacc) / Decimal::from(PROFILE_STEPS);

    (0..=PROFILE_STEPS)
        .filter_map(|k| {
            let rate_pct = step * Decimal::from(k);
            npv(pct_to_rate(rate_pct), &flows)
                .ok()
                .map(|npv| NpvProfilePoint { rate_pct, npv })
        })
        .collect()
}
