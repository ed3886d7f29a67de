use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Loan {
    pub id: u64,
    pub employee_id: u64,
    /// "vehicle" or "company".
    pub loan_type: String,
    pub principal: f64,
    pub monthly_installment: f64,
    pub outstanding: f64,
    pub is_active: bool,
    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Monthly installments per loan type for one employee's active loans.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoanDeductions {
    pub vehicle: f64,
    pub company: f64,
}
