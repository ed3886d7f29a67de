use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::{debug, error};
use utoipa::{IntoParams, ToSchema};

use crate::{
    auth::auth::AuthUser,
    calc::payroll::Allowances,
    model::{department::Department, employee::Employee, job_title::JobTitle},
    utils::db_utils::{build_update_sql, execute_update},
};

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "EMP-001")]
    pub employee_code: String,
    #[schema(example = "Ayesha")]
    pub first_name: String,
    #[schema(example = "Khan")]
    pub last_name: String,
    #[schema(example = "ayesha.khan@company.com", format = "email")]
    pub email: String,
    #[schema(example = "+923001234567")]
    pub phone: Option<String>,
    #[schema(example = 1)]
    pub department_id: u64,
    #[schema(example = 2)]
    pub job_title_id: u64,
    #[schema(example = "2023-11-01", format = "date", value_type = String)]
    pub hire_date: NaiveDate,
    #[schema(example = 253308.0)]
    pub salary_basic: f64,
    #[schema(example = 380000.0)]
    pub salary_gross: f64,
    /// Allowance slots; omitted slots start inactive at zero.
    pub allowances: Option<Allowances>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EmployeeQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub department_id: Option<u64>,
    pub job_title_id: Option<u64>,
    pub status: Option<String>,
    /// Matches name or email.
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<Employee>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 42)]
    pub total: i64,
}

enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Object, example = json!({
            "message": "Employee created successfully"
        })),
        (status = 400, description = "Invalid salary structure"),
        (status = 409, description = "Duplicate employee code"),
        (status = 401), (status = 403)
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn create_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateEmployee>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    if payload.salary_basic < 0.0 || payload.salary_gross < payload.salary_basic {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "salary_gross must be at least salary_basic, and both non-negative"
        })));
    }

    let a = payload.allowances.unwrap_or_default();

    let result = sqlx::query(
        r#"
        INSERT INTO employees
        (employee_code, first_name, last_name, email, phone, department_id, job_title_id,
         hire_date, salary_basic, salary_gross,
         conveyance_active, conveyance_amount, food_active, food_amount,
         vehicle_fuel_active, vehicle_fuel_amount, medical_active, medical_amount,
         house_rent_active, house_rent_amount, special_active, special_amount,
         other_active, other_amount)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&payload.employee_code)
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(payload.department_id)
    .bind(payload.job_title_id)
    .bind(payload.hire_date)
    .bind(payload.salary_basic)
    .bind(payload.salary_gross)
    .bind(a.conveyance.is_active)
    .bind(a.conveyance.amount)
    .bind(a.food.is_active)
    .bind(a.food.amount)
    .bind(a.vehicle_fuel.is_active)
    .bind(a.vehicle_fuel.amount)
    .bind(a.medical.is_active)
    .bind(a.medical.amount)
    .bind(a.house_rent.is_active)
    .bind(a.house_rent.amount)
    .bind(a.special.is_active)
    .bind(a.special.amount)
    .bind(a.other.is_active)
    .bind(a.other.amount)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => Ok(HttpResponse::Created().json(json!({
            "message": "Employee created successfully"
        }))),
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::Conflict().json(json!({
                        "message": "Employee code or email already exists"
                    })));
                }
            }
            error!(error = %e, "Failed to create employee");
            Ok(HttpResponse::InternalServerError().json(json!({
                "message": "Something went wrong, contact the system admin"
            })))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeeListResponse),
        (status = 401), (status = 403)
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn list_employees(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let like = query.search.as_deref().map(|s| format!("%{s}%"));

    // Soft-deleted rows never surface.
    let mut where_sql = String::from(" WHERE is_deleted = FALSE");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(department_id) = query.department_id {
        where_sql.push_str(" AND department_id = ?");
        args.push(FilterValue::U64(department_id));
    }
    if let Some(job_title_id) = query.job_title_id {
        where_sql.push_str(" AND job_title_id = ?");
        args.push(FilterValue::U64(job_title_id));
    }
    if let Some(status) = query.status.as_deref() {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(status));
    }
    if let Some(like) = like.as_deref() {
        where_sql.push_str(" AND (first_name LIKE ? OR last_name LIKE ? OR email LIKE ?)");
        args.push(FilterValue::Str(like));
        args.push(FilterValue::Str(like));
        args.push(FilterValue::Str(like));
    }

    let count_sql = format!("SELECT COUNT(*) FROM employees{where_sql}");
    debug!(sql = %count_sql, "Counting employees");

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(*s),
        };
    }
    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to count employees");
        ErrorInternalServerError("Database error")
    })?;

    let data_sql =
        format!("SELECT * FROM employees{where_sql} ORDER BY id DESC LIMIT ? OFFSET ?");
    debug!(sql = %data_sql, page, per_page, "Fetching employees");

    let mut data_q = sqlx::query_as::<_, Employee>(&data_sql);
    for arg in &args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(*v),
            FilterValue::Str(s) => data_q.bind(*s),
        };
    }

    let employees = data_q
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch employees");
            ErrorInternalServerError("Database error")
        })?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        data: employees,
        page,
        per_page,
        total,
    }))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id", Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found"),
        (status = 401), (status = 403)
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn get_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let employee_id = path.into_inner();

    let employee = sqlx::query_as::<_, Employee>(
        "SELECT * FROM employees WHERE id = ? AND is_deleted = FALSE",
    )
    .bind(employee_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to fetch employee");
        ErrorInternalServerError("Internal Server Error")
    })?;

    match employee {
        Some(emp) => Ok(HttpResponse::Ok().json(emp)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        }))),
    }
}

/// Partial update from a JSON field map.
#[utoipa::path(
    put,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id", Path, description = "Employee ID")),
    request_body = Object,
    responses(
        (status = 200, description = "Employee updated"),
        (status = 400, description = "Bad field map"),
        (status = 404, description = "Employee not found"),
        (status = 401), (status = 403)
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn update_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<i64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let employee_id = path.into_inner();

    let update = build_update_sql("employees", &body, "id", employee_id)?;

    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({ "message": "Employee not found" })));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Employee updated successfully" })))
}

/// Soft delete: the row is flagged, payroll history stays intact.
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id", Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Employee not found"),
        (status = 401), (status = 403)
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn delete_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let employee_id = path.into_inner();

    let result = sqlx::query(
        "UPDATE employees SET is_deleted = TRUE, status = 'Inactive' WHERE id = ? AND is_deleted = FALSE",
    )
    .bind(employee_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to delete employee");
        ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({ "message": "Employee not found" })));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Successfully deleted" })))
}

#[utoipa::path(
    get,
    path = "/api/v1/departments",
    responses(
        (status = 200, description = "Departments", body = [Department]),
        (status = 401), (status = 403)
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn list_departments(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let rows = sqlx::query_as::<_, Department>("SELECT * FROM departments ORDER BY name")
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch departments");
            ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(rows))
}

#[utoipa::path(
    get,
    path = "/api/v1/job-titles",
    responses(
        (status = 200, description = "Job titles", body = [JobTitle]),
        (status = 401), (status = 403)
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn list_job_titles(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let rows = sqlx::query_as::<_, JobTitle>("SELECT * FROM job_titles ORDER BY title")
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch job titles");
            ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(rows))
}
