use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::{
    auth::auth::AuthUser,
    model::training::{Course, CourseCompletion, Enrollment, TrainingProgram},
};

#[derive(Deserialize, ToSchema)]
pub struct CreateCourse {
    #[schema(example = "CRS-101")]
    pub course_code: String,
    #[schema(example = "Workplace Safety")]
    pub title: String,
    #[schema(example = "compliance")]
    pub category: String,
    #[schema(example = 8)]
    pub duration_hours: u32,
    #[schema(example = "beginner")]
    pub difficulty: String,
    /// Defaults to 70.
    pub passing_score: Option<u32>,
    pub has_assessment: Option<bool>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct CourseQuery {
    pub category: Option<String>,
    pub active_only: Option<bool>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct TopQuery {
    /// Defaults to 10.
    pub limit: Option<u32>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateEnrollment {
    pub employee_id: u64,
    pub course_id: u64,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct EnrollmentQuery {
    pub employee_id: Option<u64>,
    pub course_id: Option<u64>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateProgress {
    /// 0-100.
    pub progress: Option<f64>,
    /// Minutes to add to the running total.
    pub time_spent: Option<u32>,
}

#[derive(Deserialize, ToSchema)]
pub struct SubmitAssessment {
    #[schema(example = 85)]
    pub score: u32,
}

#[derive(Serialize, ToSchema)]
pub struct AssessmentOutcome {
    pub attempt_number: u64,
    pub score: u32,
    pub passed: bool,
    pub passing_score: u32,
}

#[derive(Deserialize, ToSchema)]
pub struct SubmitRating {
    /// 1-5.
    pub rating: u32,
    pub review: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateProgram {
    #[schema(example = "New Joiner Induction")]
    pub title: String,
    pub description: Option<String>,
    /// Ordered course ids making up the program.
    pub course_ids: Vec<u64>,
}

#[utoipa::path(
    post,
    path = "/api/v1/training/courses",
    request_body = CreateCourse,
    responses(
        (status = 201, description = "Course created"),
        (status = 409, description = "Duplicate course code"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Training"
)]
pub async fn create_course(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateCourse>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let result = sqlx::query(
        r#"
        INSERT INTO courses
        (course_code, title, category, duration_hours, difficulty, passing_score, has_assessment)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&payload.course_code)
    .bind(&payload.title)
    .bind(&payload.category)
    .bind(payload.duration_hours)
    .bind(&payload.difficulty)
    .bind(payload.passing_score.unwrap_or(70))
    .bind(payload.has_assessment.unwrap_or(false))
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => Ok(HttpResponse::Created().json(json!({ "message": "Course created" }))),
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::Conflict()
                        .json(json!({ "message": "Course code already exists" })));
                }
            }
            error!(error = %e, "Failed to create course");
            Err(ErrorInternalServerError("Internal Server Error"))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/training/courses",
    params(CourseQuery),
    responses(
        (status = 200, description = "Course catalog", body = [Course]),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Training"
)]
pub async fn list_courses(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<CourseQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let mut sql = String::from("SELECT * FROM courses WHERE 1=1");
    if query.active_only.unwrap_or(true) {
        sql.push_str(" AND is_active = TRUE");
    }
    if query.category.is_some() {
        sql.push_str(" AND category = ?");
    }
    sql.push_str(" ORDER BY course_code");

    let mut q = sqlx::query_as::<_, Course>(&sql);
    if let Some(category) = query.category.as_deref() {
        q = q.bind(category);
    }

    let courses = q.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to fetch courses");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(courses))
}

/// Courses ranked by enrollment volume and completion rate.
#[utoipa::path(
    get,
    path = "/api/v1/training/courses/top",
    params(TopQuery),
    responses(
        (status = 200, description = "Top courses with completion rates", body = [CourseCompletion]),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Training"
)]
pub async fn top_courses(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<TopQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let limit = query.limit.unwrap_or(10).clamp(1, 100);

    let rows = sqlx::query_as::<_, CourseCompletion>(
        r#"
        SELECT
            c.id,
            c.course_code,
            c.title,
            c.category,
            COUNT(e.id) AS total_enrollments,
            CAST(SUM(e.status = 'completed') AS SIGNED) AS completed_enrollments,
            CAST(SUM(e.status = 'in_progress') AS SIGNED) AS in_progress_enrollments,
            ROUND(CAST(SUM(e.status = 'completed') AS DOUBLE) / COUNT(e.id) * 100, 1) AS completion_rate
        FROM courses c
        JOIN enrollments e ON e.course_id = c.id
        GROUP BY c.id, c.course_code, c.title, c.category
        HAVING COUNT(e.id) > 0
        ORDER BY total_enrollments DESC, completion_rate DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to rank courses");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(rows))
}

#[utoipa::path(
    post,
    path = "/api/v1/training/enrollments",
    request_body = CreateEnrollment,
    responses(
        (status = 201, description = "Enrollment created"),
        (status = 400, description = "Employee already enrolled in course"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Training"
)]
pub async fn create_enrollment(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateEnrollment>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let result = sqlx::query(
        "INSERT INTO enrollments (employee_id, course_id, status) VALUES (?, ?, 'enrolled')",
    )
    .bind(payload.employee_id)
    .bind(payload.course_id)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => Ok(HttpResponse::Created().json(json!({ "message": "Enrollment created" }))),
        Err(e) => {
            // Unique (employee_id, course_id) index.
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::BadRequest()
                        .json(json!({ "message": "Employee already enrolled in this course" })));
                }
            }
            error!(error = %e, "Failed to create enrollment");
            Err(ErrorInternalServerError("Internal Server Error"))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/training/enrollments",
    params(EnrollmentQuery),
    responses(
        (status = 200, description = "Enrollments", body = [Enrollment]),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Training"
)]
pub async fn list_enrollments(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<EnrollmentQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let mut sql = String::from("SELECT * FROM enrollments WHERE 1=1");
    if query.employee_id.is_some() {
        sql.push_str(" AND employee_id = ?");
    }
    if query.course_id.is_some() {
        sql.push_str(" AND course_id = ?");
    }
    sql.push_str(" ORDER BY id DESC");

    let mut q = sqlx::query_as::<_, Enrollment>(&sql);
    if let Some(employee_id) = query.employee_id {
        q = q.bind(employee_id);
    }
    if let Some(course_id) = query.course_id {
        q = q.bind(course_id);
    }

    let rows = q.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to fetch enrollments");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(rows))
}

async fn fetch_enrollment(
    pool: &MySqlPool,
    id: u64,
) -> Result<Option<Enrollment>, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>("SELECT * FROM enrollments WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

#[utoipa::path(
    post,
    path = "/api/v1/training/enrollments/{enrollment_id}/progress",
    params(("enrollment_id", Path, description = "Enrollment ID")),
    request_body = UpdateProgress,
    responses(
        (status = 200, description = "Progress updated"),
        (status = 400, description = "Progress out of range"),
        (status = 404, description = "Enrollment not found"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Training"
)]
pub async fn update_progress(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<UpdateProgress>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let enrollment_id = path.into_inner();

    if let Some(progress) = body.progress {
        if !(0.0..=100.0).contains(&progress) {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": "progress must be between 0 and 100"
            })));
        }
    }

    let result = sqlx::query(
        r#"
        UPDATE enrollments SET
            progress = COALESCE(?, progress),
            total_time_spent = total_time_spent + ?,
            status = IF(status = 'enrolled', 'in_progress', status)
        WHERE id = ? AND status IN ('enrolled', 'in_progress')
        "#,
    )
    .bind(body.progress)
    .bind(body.time_spent.unwrap_or(0))
    .bind(enrollment_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, enrollment_id, "Failed to update progress");
        ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Enrollment not found or not in progress"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Progress updated successfully" })))
}

/// A passing attempt completes the enrollment and pins progress at 100.
#[utoipa::path(
    post,
    path = "/api/v1/training/enrollments/{enrollment_id}/assessment",
    params(("enrollment_id", Path, description = "Enrollment ID")),
    request_body = SubmitAssessment,
    responses(
        (status = 200, description = "Assessment recorded", body = AssessmentOutcome),
        (status = 400, description = "Course has no assessment"),
        (status = 404, description = "Enrollment not found"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Training"
)]
pub async fn submit_assessment(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<SubmitAssessment>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let enrollment_id = path.into_inner();

    let enrollment = match fetch_enrollment(pool.get_ref(), enrollment_id).await.map_err(|e| {
        error!(error = %e, enrollment_id, "Failed to fetch enrollment");
        ErrorInternalServerError("Internal Server Error")
    })? {
        Some(e) => e,
        None => {
            return Ok(
                HttpResponse::NotFound().json(json!({ "message": "Enrollment not found" }))
            );
        }
    };

    let course = sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = ?")
        .bind(enrollment.course_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch course");
            ErrorInternalServerError("Internal Server Error")
        })?;

    let course = match course {
        Some(c) if c.has_assessment => c,
        Some(_) => {
            return Ok(HttpResponse::BadRequest()
                .json(json!({ "message": "Course has no assessment" })));
        }
        None => {
            return Ok(HttpResponse::NotFound().json(json!({ "message": "Course not found" })));
        }
    };

    let mut attempts = enrollment
        .assessment_attempts
        .as_array()
        .cloned()
        .unwrap_or_default();
    let attempt_number = attempts.len() as u64 + 1;
    let passed = body.score >= course.passing_score;
    attempts.push(json!({
        "attempt_number": attempt_number,
        "score": body.score,
        "passed": passed
    }));

    let update_sql = if passed {
        r#"
        UPDATE enrollments
        SET assessment_attempts = ?, status = 'completed', progress = 100, completed_at = NOW()
        WHERE id = ?
        "#
    } else {
        "UPDATE enrollments SET assessment_attempts = ? WHERE id = ?"
    };

    sqlx::query(update_sql)
        .bind(serde_json::Value::Array(attempts))
        .bind(enrollment_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, enrollment_id, "Failed to record assessment");
            ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(AssessmentOutcome {
        attempt_number,
        score: body.score,
        passed,
        passing_score: course.passing_score,
    }))
}

/// Ratings are accepted only after completion.
#[utoipa::path(
    post,
    path = "/api/v1/training/enrollments/{enrollment_id}/rating",
    params(("enrollment_id", Path, description = "Enrollment ID")),
    request_body = SubmitRating,
    responses(
        (status = 200, description = "Rating recorded"),
        (status = 400, description = "Rating out of range or course not completed"),
        (status = 404, description = "Enrollment not found"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Training"
)]
pub async fn submit_rating(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<SubmitRating>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let enrollment_id = path.into_inner();

    if !(1..=5).contains(&body.rating) {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Rating must be between 1 and 5"
        })));
    }

    let result = sqlx::query(
        "UPDATE enrollments SET rating = ?, review = ? WHERE id = ? AND status = 'completed'",
    )
    .bind(body.rating)
    .bind(&body.review)
    .bind(enrollment_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, enrollment_id, "Failed to record rating");
        ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        let exists = fetch_enrollment(pool.get_ref(), enrollment_id)
            .await
            .map_err(|e| {
                error!(error = %e, enrollment_id, "Failed to fetch enrollment");
                ErrorInternalServerError("Internal Server Error")
            })?
            .is_some();
        if !exists {
            return Ok(
                HttpResponse::NotFound().json(json!({ "message": "Enrollment not found" }))
            );
        }
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "You can only rate courses after completion"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Rating recorded" })))
}

#[utoipa::path(
    post,
    path = "/api/v1/training/programs",
    request_body = CreateProgram,
    responses(
        (status = 201, description = "Program created"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Training"
)]
pub async fn create_program(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateProgram>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    sqlx::query("INSERT INTO training_programs (title, description, course_ids) VALUES (?, ?, ?)")
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(serde_json::to_value(&payload.course_ids).unwrap_or_default())
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create training program");
            ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Created().json(json!({ "message": "Program created" })))
}

#[utoipa::path(
    get,
    path = "/api/v1/training/programs",
    responses(
        (status = 200, description = "Active training programs", body = [TrainingProgram]),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Training"
)]
pub async fn list_programs(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let rows = sqlx::query_as::<_, TrainingProgram>(
        "SELECT * FROM training_programs WHERE is_active = TRUE ORDER BY title",
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch training programs");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(rows))
}
