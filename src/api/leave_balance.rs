//! Work-year leave balances and the carry-forward chain.
//!
//! Balances are materialized per (employee, work_year); the carry-forward
//! arithmetic itself lives in `calc::leave` and this module only moves rows
//! in and out of storage around it.

use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::{Datelike, NaiveDate, Utc};
use serde::Serialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

use crate::{
    auth::auth::AuthUser,
    calc::leave::{self, YearAnnual},
    model::leave::{LeaveBalance, LeaveRequest},
};

#[derive(Serialize, ToSchema)]
pub struct BalanceSummary {
    pub employee_id: u64,
    pub balances: Vec<LeaveBalance>,
    pub total_advance: f64,
}

async fn fetch_employee_hire_date(
    pool: &MySqlPool,
    employee_id: u64,
) -> Result<Option<NaiveDate>, sqlx::Error> {
    sqlx::query_scalar::<_, NaiveDate>(
        "SELECT hire_date FROM employees WHERE id = ? AND is_deleted = FALSE",
    )
    .bind(employee_id)
    .fetch_optional(pool)
    .await
}

async fn fetch_balance(
    pool: &MySqlPool,
    employee_id: u64,
    work_year: u32,
) -> Result<Option<LeaveBalance>, sqlx::Error> {
    sqlx::query_as::<_, LeaveBalance>(
        "SELECT * FROM leave_balances WHERE employee_id = ? AND work_year = ?",
    )
    .bind(employee_id)
    .bind(work_year)
    .fetch_optional(pool)
    .await
}

/// Insert one balance row with the given annual carry-forward, deriving the
/// remaining/advance columns. Races on the unique index fall back to a read.
async fn insert_balance(
    pool: &MySqlPool,
    employee_id: u64,
    hire_date: NaiveDate,
    work_year: u32,
    annual_cf: f64,
) -> Result<LeaveBalance, sqlx::Error> {
    let allocation = leave::anniversary_allocation(work_year);
    let annual = leave::derive(allocation.annual, annual_cf, 0.0);
    let sick = leave::derive(allocation.sick, 0.0, 0.0);
    let casual = leave::derive(allocation.casual, 0.0, 0.0);

    // The calendar year this work year ends in; annual days expire two
    // years after that.
    let year = hire_date.year() + work_year as i32 + 1;
    let expires_on = NaiveDate::from_ymd_opt(year + 2, 12, 31);

    let result = sqlx::query(
        r#"
        INSERT INTO leave_balances
        (employee_id, work_year, year, is_carried_forward, expires_on,
         annual_allocated, annual_used, annual_carried_forward, annual_remaining, annual_advance,
         sick_allocated, sick_used, sick_carried_forward, sick_remaining, sick_advance,
         casual_allocated, casual_used, casual_carried_forward, casual_remaining, casual_advance)
        VALUES (?, ?, ?, ?, ?, ?, 0, ?, ?, 0, ?, 0, 0, ?, 0, ?, 0, 0, ?, 0)
        "#,
    )
    .bind(employee_id)
    .bind(work_year)
    .bind(year)
    .bind(annual_cf > 0.0)
    .bind(expires_on)
    .bind(allocation.annual)
    .bind(annual_cf)
    .bind(annual.remaining)
    .bind(allocation.sick)
    .bind(sick.remaining)
    .bind(allocation.casual)
    .bind(casual.remaining)
    .execute(pool)
    .await;

    if let Err(e) = result {
        let duplicate = matches!(
            &e,
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23000")
        );
        if !duplicate {
            return Err(e);
        }
    }

    match fetch_balance(pool, employee_id, work_year).await? {
        Some(balance) => Ok(balance),
        None => Err(sqlx::Error::RowNotFound),
    }
}

/// Walk work years 0..=target, creating any missing rows with carry-forward
/// from the previous year's remaining annual days.
pub async fn ensure_chain(
    pool: &MySqlPool,
    employee_id: u64,
    hire_date: NaiveDate,
    target_work_year: u32,
) -> Result<LeaveBalance, sqlx::Error> {
    let mut prev_remaining = 0.0;
    let mut current: Option<LeaveBalance> = None;

    for work_year in 0..=target_work_year {
        let balance = match fetch_balance(pool, employee_id, work_year).await? {
            Some(existing) => existing,
            None => {
                let cf = if work_year == 0 {
                    0.0
                } else {
                    leave::carry_forward(
                        prev_remaining,
                        leave::anniversary_allocation(work_year).annual,
                    )
                };
                insert_balance(pool, employee_id, hire_date, work_year, cf).await?
            }
        };
        prev_remaining = balance.annual_remaining;
        current = Some(balance);
    }

    // target_work_year is inclusive, so the loop always produced a row
    Ok(current.expect("chain produced no balance"))
}

/// Add approved leave days to the right work-year balance and re-derive the
/// affected counters.
pub async fn charge_for_request(
    pool: &MySqlPool,
    request: &LeaveRequest,
) -> Result<(), sqlx::Error> {
    let hire_date = match fetch_employee_hire_date(pool, request.employee_id).await? {
        Some(d) => d,
        None => return Err(sqlx::Error::RowNotFound),
    };

    let work_year = leave::work_year(hire_date, request.start_date);
    let balance = ensure_chain(pool, request.employee_id, hire_date, work_year).await?;

    let (allocated, carried, used, column) = match request.leave_type.as_str() {
        "annual" => (
            balance.annual_allocated,
            balance.annual_carried_forward,
            balance.annual_used,
            "annual",
        ),
        "sick" => (
            balance.sick_allocated,
            balance.sick_carried_forward,
            balance.sick_used,
            "sick",
        ),
        _ => (
            balance.casual_allocated,
            balance.casual_carried_forward,
            balance.casual_used,
            "casual",
        ),
    };

    let new_used = used + request.days;
    let derived = leave::derive(allocated, carried, new_used);

    let sql = format!(
        "UPDATE leave_balances SET {column}_used = ?, {column}_remaining = ?, {column}_advance = ? WHERE id = ?"
    );
    sqlx::query(&sql)
        .bind(new_used)
        .bind(derived.remaining)
        .bind(derived.advance)
        .bind(balance.id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Current work-year balance, creating the chain on first touch.
#[utoipa::path(
    get,
    path = "/api/v1/leave/balance/{employee_id}",
    params(("employee_id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Current work-year balance", body = LeaveBalance),
        (status = 404, description = "Employee not found"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn get_balance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let employee_id = path.into_inner();

    let hire_date = match fetch_employee_hire_date(pool.get_ref(), employee_id)
        .await
        .map_err(|e| {
            error!(error = %e, employee_id, "Failed to fetch employee");
            ErrorInternalServerError("Internal Server Error")
        })? {
        Some(d) => d,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({ "message": "Employee not found" })));
        }
    };

    let work_year = leave::work_year(hire_date, Utc::now().date_naive());
    let balance = ensure_chain(pool.get_ref(), employee_id, hire_date, work_year)
        .await
        .map_err(|e| {
            error!(error = %e, employee_id, "Failed to build balance chain");
            ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(balance))
}

/// All work years for one employee, with the combined advance-days figure.
#[utoipa::path(
    get,
    path = "/api/v1/leave/balance/{employee_id}/summary",
    params(("employee_id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Balance history", body = BalanceSummary),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn balance_summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let employee_id = path.into_inner();

    let balances = sqlx::query_as::<_, LeaveBalance>(
        "SELECT * FROM leave_balances WHERE employee_id = ? ORDER BY work_year ASC",
    )
    .bind(employee_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to fetch balances");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let total_advance = balances.iter().map(|b| b.total_advance()).sum();

    Ok(HttpResponse::Ok().json(BalanceSummary {
        employee_id,
        balances,
        total_advance,
    }))
}

/// Rebuild carry-forward and remaining across every stored work year.
/// Idempotent: re-running it yields the same rows.
#[utoipa::path(
    post,
    path = "/api/v1/leave/balance/{employee_id}/recalculate",
    params(("employee_id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Chain recalculated", body = BalanceSummary),
        (status = 404, description = "No balances for employee"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn recalculate(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let employee_id = path.into_inner();

    let balances = sqlx::query_as::<_, LeaveBalance>(
        "SELECT * FROM leave_balances WHERE employee_id = ? ORDER BY work_year ASC",
    )
    .bind(employee_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to fetch balances");
        ErrorInternalServerError("Internal Server Error")
    })?;

    if balances.is_empty() {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "No leave balances recorded for employee"
        })));
    }

    let mut chain: Vec<YearAnnual> = balances
        .iter()
        .map(|b| YearAnnual {
            work_year: b.work_year,
            allocated: b.annual_allocated,
            used: b.annual_used,
            carried_forward: b.annual_carried_forward,
            remaining: b.annual_remaining,
        })
        .collect();

    leave::recalculate_chain(&mut chain);

    for (balance, annual) in balances.iter().zip(&chain) {
        // Sick and casual never carry forward; their derived columns are
        // rebuilt from allocation and use alone.
        let sick = leave::derive(balance.sick_allocated, 0.0, balance.sick_used);
        let casual = leave::derive(balance.casual_allocated, 0.0, balance.casual_used);
        let annual_derived = leave::derive(annual.allocated, annual.carried_forward, annual.used);

        sqlx::query(
            r#"
            UPDATE leave_balances SET
                annual_carried_forward = ?, annual_remaining = ?, annual_advance = ?,
                sick_carried_forward = 0, sick_remaining = ?, sick_advance = ?,
                casual_carried_forward = 0, casual_remaining = ?, casual_advance = ?,
                is_carried_forward = ?
            WHERE id = ?
            "#,
        )
        .bind(annual.carried_forward)
        .bind(annual.remaining)
        .bind(annual_derived.advance)
        .bind(sick.remaining)
        .bind(sick.advance)
        .bind(casual.remaining)
        .bind(casual.advance)
        .bind(annual.carried_forward > 0.0)
        .bind(balance.id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, employee_id, "Failed to store recalculated balance");
            ErrorInternalServerError("Internal Server Error")
        })?;
    }

    let refreshed = sqlx::query_as::<_, LeaveBalance>(
        "SELECT * FROM leave_balances WHERE employee_id = ? ORDER BY work_year ASC",
    )
    .bind(employee_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to re-read balances");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let total_advance = refreshed.iter().map(|b| b.total_advance()).sum();

    Ok(HttpResponse::Ok().json(BalanceSummary {
        employee_id,
        balances: refreshed,
        total_advance,
    }))
}
