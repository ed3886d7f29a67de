use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LeaveType {
    Annual,
    Sick,
    Casual,
}

impl LeaveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveType::Annual => "annual",
            LeaveType::Sick => "sick",
            LeaveType::Casual => "casual",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveRequest {
    pub id: u64,
    pub employee_id: u64,
    #[schema(value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = "date")]
    pub end_date: NaiveDate,
    pub leave_type: String,
    pub days: f64,
    #[schema(nullable = true)]
    pub status: Option<String>,
    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub created_at: Option<DateTime<Utc>>,
}

/// One employee's leave counters for one work year (hire-anniversary based).
/// Unique per (employee_id, work_year). `remaining` and `advance` are
/// derived columns, rebuilt by `calc::leave::derive` on every write.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveBalance {
    pub id: u64,
    pub employee_id: u64,
    pub work_year: u32,
    /// Calendar year in which this work year ends.
    pub year: i32,
    pub is_carried_forward: bool,
    #[schema(value_type = String, format = "date", nullable = true)]
    pub expires_on: Option<NaiveDate>,

    pub annual_allocated: f64,
    pub annual_used: f64,
    pub annual_carried_forward: f64,
    pub annual_remaining: f64,
    pub annual_advance: f64,

    pub sick_allocated: f64,
    pub sick_used: f64,
    pub sick_carried_forward: f64,
    pub sick_remaining: f64,
    pub sick_advance: f64,

    pub casual_allocated: f64,
    pub casual_used: f64,
    pub casual_carried_forward: f64,
    pub casual_remaining: f64,
    pub casual_advance: f64,
}

impl LeaveBalance {
    /// Total days used past what was available, across all types.
    pub fn total_advance(&self) -> f64 {
        self.annual_advance + self.sick_advance + self.casual_advance
    }
}
