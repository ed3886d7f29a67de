use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::model::attendance::{Attendance, MonthlySummary};

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/check-in",
    responses(
        (status = 200, description = "Checked in successfully"),
        (status = 400, description = "Already checked in today"),
        (status = 401), (status = 403), (status = 500)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_scope()?;

    let result = sqlx::query(
        "INSERT INTO attendance (employee_id, date, check_in) VALUES (?, CURDATE(), CURTIME())",
    )
    .bind(employee_id)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => Ok(HttpResponse::Ok().json(json!({
            "message": "Checked in successfully"
        }))),
        Err(e) => {
            // Unique (employee_id, date) index trips on a second check-in.
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::BadRequest().json(json!({
                        "message": "Already checked in today"
                    })));
                }
            }
            tracing::error!(error = %e, employee_id, "Check-in failed");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/// Check-out endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/check-out",
    responses(
        (status = 200, description = "Checked out successfully"),
        (status = 400, description = "No active check-in found for today"),
        (status = 401), (status = 403), (status = 500)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_scope()?;

    let result = sqlx::query(
        r#"
        UPDATE attendance
        SET check_out = CURTIME()
        WHERE employee_id = ?
        AND date = CURDATE()
        AND check_out IS NULL
        "#,
    )
    .bind(employee_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Check-out failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "No active check-in found for today"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Checked out successfully"
    })))
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct SummaryQuery {
    #[schema(example = 1)]
    pub month: u32,
    #[schema(example = 2026)]
    pub year: i32,
}

/// Present-day counts per employee for one month; payroll generation reads
/// the same aggregation internally.
#[utoipa::path(
    get,
    path = "/api/v1/attendance/summary",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Per-employee present-day counts", body = [MonthlySummary]),
        (status = 400, description = "Invalid month"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn monthly_summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<SummaryQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    if !(1..=12).contains(&query.month) {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "month must be between 1 and 12"
        })));
    }

    let rows = fetch_month_summaries(pool.get_ref(), query.month, query.year)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to aggregate attendance");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(rows))
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct AttendanceQuery {
    pub employee_id: u64,
    #[schema(example = 1)]
    pub month: u32,
    #[schema(example = 2026)]
    pub year: i32,
}

/// Raw daily rows for one employee-month.
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Daily attendance rows", body = [Attendance]),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn list_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let rows = sqlx::query_as::<_, Attendance>(
        r#"
        SELECT * FROM attendance
        WHERE employee_id = ? AND MONTH(date) = ? AND YEAR(date) = ?
        ORDER BY date
        "#,
    )
    .bind(query.employee_id)
    .bind(query.month)
    .bind(query.year)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch attendance rows");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(rows))
}

/// Shared by the summary endpoint and payroll generation.
pub async fn fetch_month_summaries(
    pool: &MySqlPool,
    month: u32,
    year: i32,
) -> Result<Vec<MonthlySummary>, sqlx::Error> {
    sqlx::query_as::<_, MonthlySummary>(
        r#"
        SELECT employee_id, COUNT(*) AS present_days
        FROM attendance
        WHERE MONTH(date) = ? AND YEAR(date) = ? AND check_in IS NOT NULL
        GROUP BY employee_id
        "#,
    )
    .bind(month)
    .bind(year)
    .fetch_all(pool)
    .await
}
