pub mod appraisal;
pub mod loan;
