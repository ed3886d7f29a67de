use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::{auth::auth::AuthUser, model::loan::Loan};

#[derive(Deserialize, ToSchema)]
pub struct CreateLoan {
    pub employee_id: u64,
    /// "vehicle" or "company".
    #[schema(example = "vehicle")]
    pub loan_type: String,
    #[schema(example = 600000.0)]
    pub principal: f64,
    #[schema(example = 25000.0)]
    pub monthly_installment: f64,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LoanQuery {
    pub employee_id: Option<u64>,
    pub active_only: Option<bool>,
}

#[utoipa::path(
    post,
    path = "/api/v1/loans",
    request_body = CreateLoan,
    responses(
        (status = 201, description = "Loan created"),
        (status = 400, description = "Invalid loan parameters"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Loans"
)]
pub async fn create_loan(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLoan>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    if !matches!(payload.loan_type.as_str(), "vehicle" | "company") {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "loan_type must be vehicle or company"
        })));
    }
    if payload.principal <= 0.0
        || payload.monthly_installment <= 0.0
        || payload.monthly_installment > payload.principal
    {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Installment must be positive and no larger than the principal"
        })));
    }

    sqlx::query(
        r#"
        INSERT INTO loans (employee_id, loan_type, principal, monthly_installment, outstanding)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.employee_id)
    .bind(&payload.loan_type)
    .bind(payload.principal)
    .bind(payload.monthly_installment)
    .bind(payload.principal)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to create loan");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Created().json(json!({ "message": "Loan created" })))
}

#[utoipa::path(
    get,
    path = "/api/v1/loans",
    params(LoanQuery),
    responses(
        (status = 200, description = "Loans", body = [Loan]),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Loans"
)]
pub async fn list_loans(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<LoanQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let mut sql = String::from("SELECT * FROM loans WHERE 1=1");
    if query.active_only.unwrap_or(false) {
        sql.push_str(" AND is_active = TRUE AND outstanding > 0");
    }
    if query.employee_id.is_some() {
        sql.push_str(" AND employee_id = ?");
    }
    sql.push_str(" ORDER BY id DESC");

    let mut q = sqlx::query_as::<_, Loan>(&sql);
    if let Some(employee_id) = query.employee_id {
        q = q.bind(employee_id);
    }

    let loans = q.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to fetch loans");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(loans))
}
