pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "amortization")]
pub mod amortization;

#[cfg(feature = "appraisal")]
pub mod appraisal;

pub use error::FinanceError;
pub use types::*;

#[cfg(feature = "amortization")]
pub use amortization::{compute_schedule, CalculationResult, LoanInputs, ScheduleRow};

#[cfg(feature = "appraisal")]
pub use appraisal::{compute_appraisal, InvestmentInputs, InvestmentResult, Recommendation};

/// Standard result type for all loan-appraisal operations
pub type FinanceResult<T> = Result<T, FinanceError>;
