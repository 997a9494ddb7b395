use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Serialize;

use loan_appraisal_core::amortization::{self, LoanInputs, LoanPurpose, UserType};
use loan_appraisal_core::appraisal::{self, AppraisalInput, NpvProfilePoint};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_schedule(input_json: String) -> NapiResult<String> {
    let input: LoanInputs = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = amortization::analyze_loan(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Borrower defaults, optionally re-seeded with a purpose's suggested term and rate.
#[napi]
pub fn loan_defaults(user_type: String, purpose: Option<String>) -> NapiResult<String> {
    let user_type: UserType = user_type.parse().map_err(to_napi_error)?;
    let mut inputs = LoanInputs::defaults_for(user_type);
    if let Some(purpose) = purpose {
        let purpose: LoanPurpose = purpose.parse().map_err(to_napi_error)?;
        inputs = inputs.with_purpose(purpose);
    }
    serde_json::to_string(&inputs).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Appraisal
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_appraisal(input_json: String) -> NapiResult<String> {
    let input: AppraisalInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = appraisal::appraise(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(Serialize)]
struct NpvProfileOutput {
    irr: rust_decimal::Decimal,
    points: Vec<NpvProfilePoint>,
}

#[napi]
pub fn npv_profile(input_json: String) -> NapiResult<String> {
    let input: AppraisalInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let (loan, appraised) = appraisal::appraise_with_schedule(&input).map_err(to_napi_error)?;
    let points = appraisal::npv_profile(&input.investment, &loan, &input.loan, appraised.result.irr);
    let output = NpvProfileOutput {
        irr: appraised.result.irr,
        points,
    };
    serde_json::to_string(&output).map_err(to_napi_error)
}
