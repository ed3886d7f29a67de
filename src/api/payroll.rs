use std::collections::HashMap;
use std::str::FromStr;

use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{error, info, warn};
use utoipa::{IntoParams, ToSchema};

use crate::{
    api::attendance::fetch_month_summaries,
    auth::auth::AuthUser,
    calc::payroll::{self as calc, AttendanceMonth, PayrollFigures, PayrollInputs},
    model::{
        employee::Employee,
        loan::LoanDeductions,
        payroll::{Payroll, PayrollStatus},
    },
};

/// Default working days in a payroll month when no calendar is supplied.
const DEFAULT_WORKING_DAYS: u32 = 26;

#[derive(Deserialize, ToSchema)]
pub struct GeneratePayrolls {
    #[schema(example = 1)]
    pub month: u32,
    #[schema(example = 2026)]
    pub year: i32,
    /// Defaults to 26 when omitted.
    pub total_working_days: Option<u32>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdatePayroll {
    pub overtime_amount: Option<f64>,
    pub performance_bonus: Option<f64>,
    pub other_bonus: Option<f64>,
    pub vehicle_loan_deduction: Option<f64>,
    pub company_loan_deduction: Option<f64>,
    pub other_deductions: Option<f64>,
    pub total_working_days: Option<u32>,
    pub present_days: Option<u32>,
    pub leave_days: Option<u32>,
    pub absent_days: Option<u32>,
    pub remarks: Option<String>,
    /// Only Draft <-> Pending moves are allowed here.
    #[schema(example = "Pending")]
    pub status: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct MarkPaid {
    #[schema(example = "Bank Transfer")]
    pub payment_method: String,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct PayrollQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub employee_id: Option<u64>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    #[schema(example = "Draft")]
    pub status: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedPayrollResponse {
    pub data: Vec<Payroll>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

#[derive(Serialize, ToSchema)]
pub struct GenerateOutcome {
    pub created: u32,
    /// Employees that already had a payroll for the month.
    pub skipped: u32,
    pub failed: Vec<String>,
}

async fn loan_deductions_by_employee(
    pool: &MySqlPool,
) -> Result<HashMap<u64, LoanDeductions>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (u64, String, f64)>(
        r#"
        SELECT employee_id, loan_type, SUM(monthly_installment)
        FROM loans
        WHERE is_active = TRUE AND outstanding > 0
        GROUP BY employee_id, loan_type
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut map: HashMap<u64, LoanDeductions> = HashMap::new();
    for (employee_id, loan_type, installment) in rows {
        let entry = map.entry(employee_id).or_default();
        match loan_type.as_str() {
            "vehicle" => entry.vehicle += installment,
            _ => entry.company += installment,
        }
    }
    Ok(map)
}

/// Approved leave days per employee for the month, from the requests table.
async fn leave_days_by_employee(
    pool: &MySqlPool,
    month: u32,
    year: i32,
) -> Result<HashMap<u64, f64>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (u64, f64)>(
        r#"
        SELECT employee_id, COALESCE(SUM(days), 0)
        FROM leave_requests
        WHERE status = 'approved' AND MONTH(start_date) = ? AND YEAR(start_date) = ?
        GROUP BY employee_id
        "#,
    )
    .bind(month)
    .bind(year)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().collect())
}

async fn insert_payroll(
    pool: &MySqlPool,
    employee: &Employee,
    month: u32,
    year: i32,
    inputs: &PayrollInputs,
    figures: &PayrollFigures,
    created_by: u64,
) -> Result<sqlx::mysql::MySqlQueryResult, sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO payrolls
        (employee_id, month, year, basic_salary, medical_allowance, house_rent_allowance,
         allowances, overtime_amount, performance_bonus, other_bonus,
         income_tax, provident_fund, eobi, vehicle_loan_deduction, company_loan_deduction,
         other_deductions, total_working_days, present_days, leave_days, absent_days,
         daily_rate, attendance_deduction, gross_salary, taxable_income, total_earnings,
         total_deductions, net_salary, currency, remarks, status, created_by)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(employee.id)
    .bind(month)
    .bind(year)
    .bind(figures.basic_salary)
    .bind(figures.medical_allowance)
    .bind(figures.house_rent_allowance)
    .bind(serde_json::to_value(inputs.allowances).unwrap_or_default())
    .bind(inputs.overtime_amount)
    .bind(inputs.performance_bonus)
    .bind(inputs.other_bonus)
    .bind(figures.income_tax)
    .bind(figures.provident_fund)
    .bind(figures.eobi)
    .bind(inputs.vehicle_loan_deduction)
    .bind(inputs.company_loan_deduction)
    .bind(inputs.other_deductions)
    .bind(inputs.attendance.total_working_days)
    .bind(inputs.attendance.present_days)
    .bind(inputs.attendance.leave_days)
    .bind(figures.attendance.absent_days)
    .bind(figures.attendance.daily_rate)
    .bind(figures.attendance.deduction)
    .bind(inputs.gross)
    .bind(figures.taxable_income)
    .bind(figures.total_earnings)
    .bind(figures.total_deductions)
    .bind(figures.net_salary)
    .bind("PKR")
    .bind(format!("Monthly payroll generated for {month}/{year}"))
    .bind(PayrollStatus::Draft.to_string())
    .bind(created_by)
    .execute(pool)
    .await
}

/// Generate Draft payrolls for every active employee for one month.
#[utoipa::path(
    post,
    path = "/api/v1/payroll/generate",
    request_body = GeneratePayrolls,
    responses(
        (status = 200, description = "Generation summary", body = GenerateOutcome),
        (status = 400, description = "Invalid month"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn generate_payrolls(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<GeneratePayrolls>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    if !(1..=12).contains(&payload.month) {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "month must be between 1 and 12"
        })));
    }

    let working_days = payload.total_working_days.unwrap_or(DEFAULT_WORKING_DAYS);

    let employees = sqlx::query_as::<_, Employee>(
        "SELECT * FROM employees WHERE is_deleted = FALSE AND status = 'Active' AND salary_gross > 0",
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch active employees");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let attendance: HashMap<u64, i64> =
        fetch_month_summaries(pool.get_ref(), payload.month, payload.year)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to aggregate attendance");
                ErrorInternalServerError("Internal Server Error")
            })?
            .into_iter()
            .map(|s| (s.employee_id, s.present_days))
            .collect();

    let leave_days = leave_days_by_employee(pool.get_ref(), payload.month, payload.year)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to aggregate leave days");
            ErrorInternalServerError("Internal Server Error")
        })?;

    let loans = loan_deductions_by_employee(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to aggregate loan installments");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let mut outcome = GenerateOutcome {
        created: 0,
        skipped: 0,
        failed: Vec::new(),
    };

    for employee in &employees {
        // Employees without attendance rows count as fully present.
        let present = attendance
            .get(&employee.id)
            .copied()
            .map(|d| (d.max(0) as u32).min(working_days));
        let leave = leave_days
            .get(&employee.id)
            .copied()
            .map(|d| (d.max(0.0) as u32).min(working_days))
            .unwrap_or(0);

        let month_attendance = match present {
            Some(present_days) => AttendanceMonth {
                total_working_days: working_days,
                present_days,
                leave_days: leave.min(working_days - present_days),
                absent_days: None,
            },
            None => AttendanceMonth::full(working_days),
        };

        let loan = loans.get(&employee.id).copied().unwrap_or_default();

        let inputs = PayrollInputs {
            gross: employee.salary_gross,
            allowances: employee.allowances(),
            overtime_amount: 0.0,
            performance_bonus: 0.0,
            other_bonus: 0.0,
            vehicle_loan_deduction: loan.vehicle,
            company_loan_deduction: loan.company,
            other_deductions: 0.0,
            attendance: month_attendance,
        };

        let figures = match calc::compute(&inputs) {
            Ok(f) => f,
            Err(e) => {
                warn!(employee_id = employee.id, error = %e, "Payroll computation rejected");
                outcome
                    .failed
                    .push(format!("{}: {}", employee.employee_code, e));
                continue;
            }
        };

        match insert_payroll(
            pool.get_ref(),
            employee,
            payload.month,
            payload.year,
            &inputs,
            &figures,
            auth.user_id,
        )
        .await
        {
            Ok(_) => outcome.created += 1,
            Err(e) => {
                // Unique (employee, month, year) index: already generated.
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.code().as_deref() == Some("23000") {
                        outcome.skipped += 1;
                        continue;
                    }
                }
                error!(employee_id = employee.id, error = %e, "Payroll insert failed");
                outcome
                    .failed
                    .push(format!("{}: database error", employee.employee_code));
            }
        }
    }

    info!(
        month = payload.month,
        year = payload.year,
        created = outcome.created,
        skipped = outcome.skipped,
        "Payroll generation finished"
    );

    Ok(HttpResponse::Ok().json(outcome))
}

async fn fetch_payroll(pool: &MySqlPool, id: u64) -> Result<Option<Payroll>, sqlx::Error> {
    sqlx::query_as::<_, Payroll>("SELECT * FROM payrolls WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

fn parse_status(raw: &str) -> Option<PayrollStatus> {
    PayrollStatus::from_str(raw).ok()
}

#[utoipa::path(
    get,
    path = "/api/v1/payroll/{payroll_id}",
    params(("payroll_id", description = "Payroll ID")),
    responses(
        (status = 200, body = Payroll),
        (status = 404),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn get_payroll(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let payroll_id = path.into_inner();

    let payroll = fetch_payroll(pool.get_ref(), payroll_id).await.map_err(|e| {
        error!(error = %e, payroll_id, "Failed to fetch payroll");
        ErrorInternalServerError("Internal Server Error")
    })?;

    match payroll {
        Some(p) => Ok(HttpResponse::Ok().json(p)),
        None => Ok(HttpResponse::NotFound().json(json!({ "message": "Payroll not found" }))),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/payroll",
    params(PayrollQuery),
    responses(
        (status = 200, body = PaginatedPayrollResponse),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn list_payrolls(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<PayrollQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * per_page;

    enum Arg<'a> {
        U64(u64),
        U32(u32),
        I32(i32),
        Str(&'a str),
    }

    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<Arg> = Vec::new();

    if let Some(employee_id) = query.employee_id {
        where_sql.push_str(" AND employee_id = ?");
        args.push(Arg::U64(employee_id));
    }
    if let Some(month) = query.month {
        where_sql.push_str(" AND month = ?");
        args.push(Arg::U32(month));
    }
    if let Some(year) = query.year {
        where_sql.push_str(" AND year = ?");
        args.push(Arg::I32(year));
    }
    if let Some(status) = query.status.as_deref() {
        where_sql.push_str(" AND status = ?");
        args.push(Arg::Str(status));
    }

    let count_sql = format!("SELECT COUNT(*) FROM payrolls{where_sql}");
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            Arg::U64(v) => count_q.bind(*v),
            Arg::U32(v) => count_q.bind(*v),
            Arg::I32(v) => count_q.bind(*v),
            Arg::Str(s) => count_q.bind(*s),
        };
    }
    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to count payrolls");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        "SELECT * FROM payrolls{where_sql} ORDER BY year DESC, month DESC, id DESC LIMIT ? OFFSET ?"
    );
    let mut data_q = sqlx::query_as::<_, Payroll>(&data_sql);
    for arg in &args {
        data_q = match arg {
            Arg::U64(v) => data_q.bind(*v),
            Arg::U32(v) => data_q.bind(*v),
            Arg::I32(v) => data_q.bind(*v),
            Arg::Str(s) => data_q.bind(*s),
        };
    }

    let data = data_q
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch payroll list");
            ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(PaginatedPayrollResponse {
        data,
        page,
        per_page,
        total,
    }))
}

/// Update a Draft/Pending payroll; derived figures are recomputed through
/// the same calculation core that generated the row.
#[utoipa::path(
    put,
    path = "/api/v1/payroll/{payroll_id}",
    params(("payroll_id", description = "Payroll ID")),
    request_body = UpdatePayroll,
    responses(
        (status = 200, description = "Payroll updated"),
        (status = 400, description = "Row not editable or inputs rejected"),
        (status = 404, description = "Payroll not found"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn update_payroll(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<UpdatePayroll>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let payroll_id = path.into_inner();

    let payroll = match fetch_payroll(pool.get_ref(), payroll_id).await.map_err(|e| {
        error!(error = %e, payroll_id, "Failed to fetch payroll");
        ErrorInternalServerError("Internal Server Error")
    })? {
        Some(p) => p,
        None => {
            return Ok(
                HttpResponse::NotFound().json(json!({ "message": "Payroll record not found" }))
            );
        }
    };

    let current_status = match parse_status(&payroll.status) {
        Some(s) => s,
        None => {
            error!(payroll_id, status = %payroll.status, "Unknown payroll status in storage");
            return Err(ErrorInternalServerError("Internal Server Error"));
        }
    };

    if !matches!(current_status, PayrollStatus::Draft | PayrollStatus::Pending) {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Only draft or pending payrolls can be updated"
        })));
    }

    let next_status = match body.status.as_deref() {
        Some(raw) => match parse_status(raw) {
            Some(s @ (PayrollStatus::Draft | PayrollStatus::Pending)) => s,
            Some(_) => {
                return Ok(HttpResponse::BadRequest().json(json!({
                    "message": "Status can only move between Draft and Pending here"
                })));
            }
            None => {
                return Ok(
                    HttpResponse::BadRequest().json(json!({ "message": "Unknown status" }))
                );
            }
        },
        None => current_status,
    };

    // Rebuild the inputs from the stored row, then overlay the patch.
    let allowances = serde_json::from_value(payroll.allowances.clone()).unwrap_or_default();
    let total_working_days = body.total_working_days.unwrap_or(payroll.total_working_days);
    let inputs = PayrollInputs {
        gross: payroll.gross_salary,
        allowances,
        overtime_amount: body.overtime_amount.unwrap_or(payroll.overtime_amount),
        performance_bonus: body.performance_bonus.unwrap_or(payroll.performance_bonus),
        other_bonus: body.other_bonus.unwrap_or(payroll.other_bonus),
        vehicle_loan_deduction: body
            .vehicle_loan_deduction
            .unwrap_or(payroll.vehicle_loan_deduction),
        company_loan_deduction: body
            .company_loan_deduction
            .unwrap_or(payroll.company_loan_deduction),
        other_deductions: body.other_deductions.unwrap_or(payroll.other_deductions),
        attendance: AttendanceMonth {
            total_working_days,
            present_days: body.present_days.unwrap_or(payroll.present_days),
            leave_days: body.leave_days.unwrap_or(payroll.leave_days),
            // An explicit absent count wins; touching any other attendance
            // field re-derives it; otherwise the stored value stands.
            absent_days: match body.absent_days {
                Some(days) => Some(days),
                None
                    if body.present_days.is_some()
                        || body.leave_days.is_some()
                        || body.total_working_days.is_some() =>
                {
                    None
                }
                None => Some(payroll.absent_days),
            },
        },
    };

    let figures = match calc::compute(&inputs) {
        Ok(f) => f,
        Err(e) => {
            return Ok(HttpResponse::BadRequest().json(json!({ "message": e.to_string() })));
        }
    };

    sqlx::query(
        r#"
        UPDATE payrolls SET
            overtime_amount = ?, performance_bonus = ?, other_bonus = ?,
            vehicle_loan_deduction = ?, company_loan_deduction = ?, other_deductions = ?,
            income_tax = ?, provident_fund = ?, eobi = ?,
            total_working_days = ?, present_days = ?, leave_days = ?, absent_days = ?,
            daily_rate = ?, attendance_deduction = ?,
            taxable_income = ?, total_earnings = ?, total_deductions = ?, net_salary = ?,
            remarks = COALESCE(?, remarks), status = ?
        WHERE id = ?
        "#,
    )
    .bind(inputs.overtime_amount)
    .bind(inputs.performance_bonus)
    .bind(inputs.other_bonus)
    .bind(inputs.vehicle_loan_deduction)
    .bind(inputs.company_loan_deduction)
    .bind(inputs.other_deductions)
    .bind(figures.income_tax)
    .bind(figures.provident_fund)
    .bind(figures.eobi)
    .bind(inputs.attendance.total_working_days)
    .bind(inputs.attendance.present_days)
    .bind(inputs.attendance.leave_days)
    .bind(figures.attendance.absent_days)
    .bind(figures.attendance.daily_rate)
    .bind(figures.attendance.deduction)
    .bind(figures.taxable_income)
    .bind(figures.total_earnings)
    .bind(figures.total_deductions)
    .bind(figures.net_salary)
    .bind(&body.remarks)
    .bind(next_status.to_string())
    .bind(payroll_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, payroll_id, "Failed to update payroll");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Payroll updated successfully" })))
}

/// Approve a payroll. Only Draft rows qualify.
#[utoipa::path(
    patch,
    path = "/api/v1/payroll/{payroll_id}/approve",
    params(("payroll_id", description = "Payroll ID")),
    responses(
        (status = 200, description = "Payroll approved"),
        (status = 400, description = "Only draft payrolls can be approved"),
        (status = 404),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn approve_payroll(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let payroll_id = path.into_inner();

    let result = sqlx::query(
        r#"
        UPDATE payrolls
        SET status = 'Approved', approved_by = ?, approved_at = NOW()
        WHERE id = ? AND status = 'Draft'
        "#,
    )
    .bind(auth.user_id)
    .bind(payroll_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, payroll_id, "Approve payroll failed");
        ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        let exists = fetch_payroll(pool.get_ref(), payroll_id)
            .await
            .map_err(|e| {
                error!(error = %e, payroll_id, "Failed to fetch payroll");
                ErrorInternalServerError("Internal Server Error")
            })?
            .is_some();
        if !exists {
            return Ok(HttpResponse::NotFound().json(json!({ "message": "Payroll not found" })));
        }
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Only draft payrolls can be approved"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Payroll approved successfully" })))
}

/// Mark an approved payroll as paid.
#[utoipa::path(
    patch,
    path = "/api/v1/payroll/{payroll_id}/mark-paid",
    params(("payroll_id", description = "Payroll ID")),
    request_body = MarkPaid,
    responses(
        (status = 200, description = "Payroll marked as paid"),
        (status = 400, description = "Only approved payrolls can be marked as paid"),
        (status = 404),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn mark_payroll_paid(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<MarkPaid>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let payroll_id = path.into_inner();

    let result = sqlx::query(
        r#"
        UPDATE payrolls
        SET status = 'Paid', payment_method = ?, payment_date = CURDATE()
        WHERE id = ? AND status = 'Approved'
        "#,
    )
    .bind(&body.payment_method)
    .bind(payroll_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, payroll_id, "Mark-paid failed");
        ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        let exists = fetch_payroll(pool.get_ref(), payroll_id)
            .await
            .map_err(|e| {
                error!(error = %e, payroll_id, "Failed to fetch payroll");
                ErrorInternalServerError("Internal Server Error")
            })?
            .is_some();
        if !exists {
            return Ok(HttpResponse::NotFound().json(json!({ "message": "Payroll not found" })));
        }
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Only approved payrolls can be marked as paid"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Payroll marked as paid" })))
}

/// Cancel a payroll that has not entered approval.
#[utoipa::path(
    patch,
    path = "/api/v1/payroll/{payroll_id}/cancel",
    params(("payroll_id", description = "Payroll ID")),
    responses(
        (status = 200, description = "Payroll cancelled"),
        (status = 400, description = "Only draft or pending payrolls can be cancelled"),
        (status = 404),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn cancel_payroll(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let payroll_id = path.into_inner();

    let result = sqlx::query(
        "UPDATE payrolls SET status = 'Cancelled' WHERE id = ? AND status IN ('Draft', 'Pending')",
    )
    .bind(payroll_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, payroll_id, "Cancel payroll failed");
        ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        let exists = fetch_payroll(pool.get_ref(), payroll_id)
            .await
            .map_err(|e| {
                error!(error = %e, payroll_id, "Failed to fetch payroll");
                ErrorInternalServerError("Internal Server Error")
            })?
            .is_some();
        if !exists {
            return Ok(HttpResponse::NotFound().json(json!({ "message": "Payroll not found" })));
        }
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Only draft or pending payrolls can be cancelled"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Payroll cancelled" })))
}

/// Delete a payroll. Paid rows are immutable.
#[utoipa::path(
    delete,
    path = "/api/v1/payroll/{payroll_id}",
    params(("payroll_id", description = "Payroll ID")),
    responses(
        (status = 200, description = "Payroll deleted"),
        (status = 400, description = "Paid payrolls cannot be deleted"),
        (status = 404),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn delete_payroll(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let payroll_id = path.into_inner();

    let result = sqlx::query("DELETE FROM payrolls WHERE id = ? AND status <> 'Paid'")
        .bind(payroll_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, payroll_id, "Delete payroll failed");
            ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        let exists = fetch_payroll(pool.get_ref(), payroll_id)
            .await
            .map_err(|e| {
                error!(error = %e, payroll_id, "Failed to fetch payroll");
                ErrorInternalServerError("Internal Server Error")
            })?
            .is_some();
        if !exists {
            return Ok(HttpResponse::NotFound().json(json!({ "message": "Payroll not found" })));
        }
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Paid payrolls cannot be deleted"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Payroll deleted" })))
}
