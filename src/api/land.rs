//! Generic CRUD handlers for the land-acquisition pipeline.
//!
//! All six stage documents share one row shape, so a single set of handlers
//! parameterized by a `StageConfig` serves the whole pipeline. Routes are
//! registered per stage with closures that pin the config.

use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::{
    auth::auth::AuthUser,
    model::land::{ALL_STAGES, StageConfig, StageRow},
};

#[derive(Deserialize, ToSchema)]
pub struct CreateStage {
    /// Free-form stage status, defaults to "draft".
    pub status: Option<String>,
    /// Id of the preceding stage row; required for every stage after the
    /// pipeline head.
    pub parent_id: Option<u64>,
    /// Schemaless stage document.
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateStage {
    pub status: Option<String>,
    #[schema(value_type = Object)]
    pub data: Option<serde_json::Value>,
}

#[derive(Deserialize, ToSchema)]
pub struct WorkflowTransition {
    /// Free-form action label, e.g. "patwari_contacted".
    #[schema(example = "survey_completed")]
    pub action: String,
    /// New status for the row, when the transition changes it.
    pub to_status: Option<String>,
    pub notes: Option<String>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct StageQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub status: Option<String>,
    /// Matches the stage number and the configured document fields.
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct StageListResponse {
    pub data: Vec<StageRow>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

async fn next_stage_number(
    pool: &MySqlPool,
    cfg: &StageConfig,
    year: i32,
) -> Result<String, sqlx::Error> {
    let count_sql = format!(
        "SELECT COUNT(*) FROM {} WHERE stage_number LIKE ?",
        cfg.table
    );
    let seq: i64 = sqlx::query_scalar(&count_sql)
        .bind(format!("{}-{}-%", cfg.number_prefix, year))
        .fetch_one(pool)
        .await?;
    Ok(cfg.format_number(year, seq as u64 + 1))
}

async fn parent_exists(
    pool: &MySqlPool,
    parent_table: &str,
    parent_id: u64,
) -> Result<bool, sqlx::Error> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {parent_table} WHERE id = ?)");
    sqlx::query_scalar::<_, bool>(&sql)
        .bind(parent_id)
        .fetch_one(pool)
        .await
}

pub async fn stage_list(
    cfg: &'static StageConfig,
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<StageQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let like = query.search.as_deref().map(|s| format!("%{s}%"));

    let mut where_sql = String::from(" WHERE 1=1");
    if query.status.is_some() {
        where_sql.push_str(" AND status = ?");
    }
    if like.is_some() {
        where_sql.push_str(&format!(" AND {}", cfg.search_sql()));
    }

    let count_sql = format!("SELECT COUNT(*) FROM {}{}", cfg.table, where_sql);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(status) = query.status.as_deref() {
        count_q = count_q.bind(status.to_owned());
    }
    if let Some(like) = like.as_deref() {
        for _ in 0..cfg.search_bind_count() {
            count_q = count_q.bind(like.to_owned());
        }
    }
    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, stage = cfg.display_name, "Failed to count stage rows");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        "SELECT * FROM {}{} ORDER BY id DESC LIMIT ? OFFSET ?",
        cfg.table, where_sql
    );
    let mut data_q = sqlx::query_as::<_, StageRow>(&data_sql);
    if let Some(status) = query.status.as_deref() {
        data_q = data_q.bind(status.to_owned());
    }
    if let Some(like) = like.as_deref() {
        for _ in 0..cfg.search_bind_count() {
            data_q = data_q.bind(like.to_owned());
        }
    }

    let data = data_q
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, stage = cfg.display_name, "Failed to fetch stage rows");
            ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(StageListResponse {
        data,
        page,
        per_page,
        total,
    }))
}

pub async fn stage_get(
    cfg: &'static StageConfig,
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let id = path.into_inner();

    let sql = format!("SELECT * FROM {} WHERE id = ?", cfg.table);
    let row = sqlx::query_as::<_, StageRow>(&sql)
        .bind(id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, stage = cfg.display_name, id, "Failed to fetch stage row");
            ErrorInternalServerError("Internal Server Error")
        })?;

    match row {
        Some(r) => Ok(HttpResponse::Ok().json(r)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": format!("{} not found", cfg.display_name)
        }))),
    }
}

pub async fn stage_create(
    cfg: &'static StageConfig,
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    body: web::Json<CreateStage>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    // Stages past the pipeline head must reference their predecessor.
    match (cfg.parent_table, body.parent_id) {
        (Some(parent_table), Some(parent_id)) => {
            let found = parent_exists(pool.get_ref(), parent_table, parent_id)
                .await
                .map_err(|e| {
                    error!(error = %e, "Parent lookup failed");
                    ErrorInternalServerError("Internal Server Error")
                })?;
            if !found {
                return Ok(HttpResponse::BadRequest().json(json!({
                    "message": "Referenced parent stage does not exist"
                })));
            }
        }
        (Some(_), None) => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": format!("{} requires a parent stage reference", cfg.display_name)
            })));
        }
        (None, _) => {}
    }

    let stage_number = next_stage_number(pool.get_ref(), cfg, Utc::now().year())
        .await
        .map_err(|e| {
            error!(error = %e, stage = cfg.display_name, "Failed to allocate stage number");
            ErrorInternalServerError("Internal Server Error")
        })?;

    let insert_sql = format!(
        "INSERT INTO {} (stage_number, status, parent_id, data, workflow_history, created_by) \
         VALUES (?, ?, ?, ?, ?, ?)",
        cfg.table
    );

    let result = sqlx::query(&insert_sql)
        .bind(&stage_number)
        .bind(body.status.as_deref().unwrap_or("draft"))
        .bind(body.parent_id)
        .bind(&body.data)
        .bind(serde_json::Value::Array(Vec::new()))
        .bind(auth.user_id)
        .execute(pool.get_ref())
        .await;

    match result {
        Ok(_) => Ok(HttpResponse::Created().json(json!({
            "message": format!("{} created", cfg.display_name),
            "stage_number": stage_number
        }))),
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::Conflict().json(json!({
                        "message": "Stage number collision, retry the request"
                    })));
                }
            }
            error!(error = %e, stage = cfg.display_name, "Failed to create stage row");
            Err(ErrorInternalServerError("Internal Server Error"))
        }
    }
}

pub async fn stage_update(
    cfg: &'static StageConfig,
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<UpdateStage>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let id = path.into_inner();

    if body.status.is_none() && body.data.is_none() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Nothing to update"
        })));
    }

    let sql = format!(
        "UPDATE {} SET status = COALESCE(?, status), data = COALESCE(?, data), updated_at = NOW() \
         WHERE id = ?",
        cfg.table
    );
    let result = sqlx::query(&sql)
        .bind(&body.status)
        .bind(&body.data)
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, stage = cfg.display_name, id, "Failed to update stage row");
            ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": format!("{} not found", cfg.display_name)
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("{} updated", cfg.display_name)
    })))
}

pub async fn stage_delete(
    cfg: &'static StageConfig,
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let id = path.into_inner();

    let sql = format!("DELETE FROM {} WHERE id = ?", cfg.table);
    let result = sqlx::query(&sql)
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, stage = cfg.display_name, id, "Failed to delete stage row");
            ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": format!("{} not found", cfg.display_name)
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("{} deleted", cfg.display_name)
    })))
}

/// Append a transition to the row's history and move its status.
pub async fn stage_workflow(
    cfg: &'static StageConfig,
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<WorkflowTransition>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let id = path.into_inner();

    let select_sql = format!("SELECT * FROM {} WHERE id = ?", cfg.table);
    let row = sqlx::query_as::<_, StageRow>(&select_sql)
        .bind(id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, stage = cfg.display_name, id, "Failed to fetch stage row");
            ErrorInternalServerError("Internal Server Error")
        })?;

    let row = match row {
        Some(r) => r,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": format!("{} not found", cfg.display_name)
            })));
        }
    };

    let to_status = body
        .to_status
        .clone()
        .unwrap_or_else(|| row.status.clone());

    let mut history = row.workflow_history.as_array().cloned().unwrap_or_default();
    history.push(json!({
        "action": body.action,
        "from_status": row.status,
        "to_status": to_status,
        "performed_by": auth.user_id,
        "at": Utc::now().to_rfc3339(),
        "notes": body.notes,
    }));

    let update_sql = format!(
        "UPDATE {} SET status = ?, workflow_history = ?, updated_at = NOW() WHERE id = ?",
        cfg.table
    );
    sqlx::query(&update_sql)
        .bind(&to_status)
        .bind(serde_json::Value::Array(history))
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, stage = cfg.display_name, id, "Failed to record transition");
            ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Workflow updated",
        "status": to_status
    })))
}

/// Register list/get/create/update/delete/workflow routes for every stage.
pub fn configure(service: &mut web::ServiceConfig) {
    for (path, cfg) in ALL_STAGES {
        service.service(
            web::scope(path)
                .service(
                    web::resource("")
                        .route(web::get().to(move |a, p, q| stage_list(cfg, a, p, q)))
                        .route(web::post().to(move |a, p, b| stage_create(cfg, a, p, b))),
                )
                .service(
                    web::resource("/{id}")
                        .route(web::get().to(move |a, p, i| stage_get(cfg, a, p, i)))
                        .route(web::put().to(move |a, p, i, b| stage_update(cfg, a, p, i, b)))
                        .route(web::delete().to(move |a, p, i| stage_delete(cfg, a, p, i))),
                )
                .service(
                    web::resource("/{id}/workflow")
                        .route(web::post().to(move |a, p, i, b| stage_workflow(cfg, a, p, i, b))),
                ),
        );
    }
}
