use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%).
pub type Rate = Decimal;

/// Rates expressed as percentages (8.5 = 8.5%). Every user-facing rate input
/// arrives in this unit and is converted with [`pct_to_rate`].
pub type Percentage = Decimal;

/// Multiples (e.g., 1.35x DSCR)
pub type Multiple = Decimal;

const PERCENT: Decimal = dec!(100);

/// Convert a percentage (8.5) into a decimal rate (0.085).
pub fn pct_to_rate(pct: Percentage) -> Rate {
    pct / PERCENT
}

/// Convert a decimal rate (0.085) into a percentage (8.5).
/// Saturates at the representable range, which only a runaway IRR iterate reaches.
pub fn rate_to_pct(rate: Rate) -> Percentage {
    rate.saturating_mul(PERCENT)
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
