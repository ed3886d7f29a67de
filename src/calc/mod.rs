//! Pure payroll and leave arithmetic.
//!
//! Everything in here is input → output with no database access, so the
//! business rules can be unit tested exactly and the API handlers stay thin.

pub mod leave;
pub mod payroll;
pub mod tax;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CalcError {
    #[error("{field} cannot be negative")]
    Negative { field: &'static str },

    #[error(
        "present ({present}) + leave ({leave}) days exceed total working days ({total_working})"
    )]
    AttendanceOutOfRange {
        present: u32,
        leave: u32,
        total_working: u32,
    },

    #[error("absent days ({absent}) exceed total working days ({total_working})")]
    AbsentOutOfRange { absent: u32, total_working: u32 },
}

pub type CalcResult<T> = Result<T, CalcError>;

/// Round to two decimal places (daily rates, attendance deductions).
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
