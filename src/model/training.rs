use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Course {
    pub id: u64,
    pub course_code: String,
    pub title: String,
    pub category: String,
    pub duration_hours: u32,
    pub difficulty: String,
    /// Minimum assessment score to pass, percent.
    pub passing_score: u32,
    pub has_assessment: bool,
    pub is_active: bool,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Enrollment {
    pub id: u64,
    pub employee_id: u64,
    pub course_id: u64,
    pub status: String,
    /// Completion percentage, 0-100.
    pub progress: f64,
    /// Minutes spent across all materials.
    pub total_time_spent: u32,
    /// Attempt history: `[{"attempt_number", "score", "passed"}]`.
    #[schema(value_type = Object)]
    pub assessment_attempts: serde_json::Value,
    #[schema(nullable = true)]
    pub rating: Option<u32>,
    #[schema(nullable = true)]
    pub review: Option<String>,
    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub enrolled_at: Option<DateTime<Utc>>,
    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct TrainingProgram {
    pub id: u64,
    pub title: String,
    #[schema(nullable = true)]
    pub description: Option<String>,
    /// Ordered course ids making up the program.
    #[schema(value_type = Object)]
    pub course_ids: serde_json::Value,
    pub is_active: bool,
}

/// Row shape of the top-courses aggregation.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct CourseCompletion {
    pub id: u64,
    pub course_code: String,
    pub title: String,
    pub category: String,
    pub total_enrollments: i64,
    pub completed_enrollments: i64,
    pub in_progress_enrollments: i64,
    /// completed / total x 100, one decimal.
    pub completion_rate: f64,
}
