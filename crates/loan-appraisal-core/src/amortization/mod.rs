pub mod inputs;
pub mod schedule;

pub use inputs::{
    LoanInputs, LoanPurpose, PaymentFrequency, PurposeDefaults, RepaymentMethod, UserType,
};
pub use schedule::{analyze_loan, compute_schedule, CalculationResult, PeriodPlan, ScheduleRow};
