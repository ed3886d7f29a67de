use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

/// Lifecycle of a payroll row. Linear, no cycles: Draft moves forward to
/// Pending or straight to Approved, Approved to Paid; Cancelled is terminal
/// and unreachable once a row is Paid.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum PayrollStatus {
    Draft,
    Pending,
    Approved,
    Paid,
    Cancelled,
}

impl PayrollStatus {
    pub fn can_cancel(self) -> bool {
        matches!(self, PayrollStatus::Draft | PayrollStatus::Pending)
    }

    /// Paid rows are settled money and never editable or deletable.
    pub fn is_locked(self) -> bool {
        self == PayrollStatus::Paid
    }
}

/// One employee-month of payroll. Unique per (employee_id, month, year).
/// The allowance snapshot is stored as a JSON document so the row reflects
/// what was active at generation time even if the employee master changes.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Payroll {
    pub id: u64,
    pub employee_id: u64,
    pub month: u32,
    pub year: i32,

    pub basic_salary: f64,
    pub medical_allowance: f64,
    pub house_rent_allowance: f64,
    #[schema(value_type = Object)]
    pub allowances: serde_json::Value,
    pub overtime_amount: f64,
    pub performance_bonus: f64,
    pub other_bonus: f64,

    pub income_tax: f64,
    pub provident_fund: f64,
    pub eobi: f64,
    pub vehicle_loan_deduction: f64,
    pub company_loan_deduction: f64,
    pub other_deductions: f64,

    pub total_working_days: u32,
    pub present_days: u32,
    pub leave_days: u32,
    pub absent_days: u32,
    pub daily_rate: f64,
    pub attendance_deduction: f64,

    pub gross_salary: f64,
    pub taxable_income: f64,
    pub total_earnings: f64,
    pub total_deductions: f64,
    pub net_salary: f64,

    pub currency: String,
    #[schema(nullable = true)]
    pub remarks: Option<String>,
    pub status: String,

    pub approved_by: Option<u64>,
    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub approved_at: Option<DateTime<Utc>>,
    #[schema(nullable = true)]
    pub payment_method: Option<String>,
    #[schema(value_type = String, format = "date", nullable = true)]
    pub payment_date: Option<NaiveDate>,

    pub created_by: Option<u64>,
    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_round_trips_through_strings() {
        assert_eq!(PayrollStatus::Draft.to_string(), "Draft");
        assert_eq!(
            PayrollStatus::from_str("Approved").unwrap(),
            PayrollStatus::Approved
        );
        assert!(PayrollStatus::from_str("Settled").is_err());
    }

    #[test]
    fn paid_rows_are_locked() {
        assert!(PayrollStatus::Paid.is_locked());
        assert!(!PayrollStatus::Approved.is_locked());
        assert!(PayrollStatus::Draft.can_cancel());
        assert!(!PayrollStatus::Paid.can_cancel());
    }
}
