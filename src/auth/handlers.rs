use actix_web::{HttpRequest, HttpResponse, Responder, get, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error, info, instrument};

use crate::{
    auth::{
        jwt::{generate_access_token, generate_refresh_token, verify_token},
        password::{hash_password, verify_password},
    },
    config::Config,
    models::{LoginReq, RegisterReq, TokenType, UserRow},
    utils::availability,
};

#[derive(Serialize, Deserialize)]
struct TokenPair {
    access_token: String,
    refresh_token: String,
}

/// Inserts a new user and keeps the availability filter/cache in sync.
async fn insert_user(
    username: &str,
    password: &str,
    role_id: u8,
    pool: &MySqlPool,
) -> Result<(), HttpResponse> {
    let hashed = hash_password(password).map_err(|e| {
        error!(error = %e, "Password hashing failed");
        HttpResponse::InternalServerError().json(json!({ "error": "Failed to register user" }))
    })?;

    let result = sqlx::query("INSERT INTO users (username, password, role_id) VALUES (?, ?, ?)")
        .bind(username)
        .bind(&hashed)
        .bind(role_id)
        .execute(pool)
        .await;

    match result {
        Ok(_) => {
            availability::mark_taken(username).await;
            Ok(())
        }
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Err(HttpResponse::Conflict()
                        .json(json!({ "error": "Username already exists" })));
                }
            }
            error!(error = %e, "Failed to insert user");
            Err(HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to register user" })))
        }
    }
}

pub async fn register(user: web::Json<RegisterReq>, pool: web::Data<MySqlPool>) -> impl Responder {
    let username = user.username.trim();

    if username.is_empty() || user.password.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "error": "Username and password must not be empty"
        }));
    }

    if !availability::is_username_available(username, pool.get_ref()).await {
        return HttpResponse::Conflict().json(json!({
            "error": "Username already taken"
        }));
    }

    match insert_user(username, &user.password, user.role_id, pool.get_ref()).await {
        Ok(_) => HttpResponse::Created().json(json!({
            "message": "User registered successfully"
        })),
        Err(err_resp) => err_resp,
    }
}

#[instrument(
    name = "auth_login",
    skip(pool, config, user),
    fields(username = %user.username)
)]
pub async fn login(
    user: web::Json<LoginReq>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Login request received");

    if user.username.trim().is_empty() || user.password.is_empty() {
        return HttpResponse::BadRequest().body("Username or password required");
    }

    let db_user = match sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, username, password, role_id, employee_id
        FROM users
        WHERE username = ? AND is_active = TRUE
        "#,
    )
    .bind(&user.username)
    .fetch_optional(pool.get_ref())
    .await
    {
        Ok(Some(row)) => row,
        Ok(None) => {
            info!("Invalid credentials: user not found");
            return HttpResponse::Unauthorized().body("Invalid credentials");
        }
        Err(e) => {
            error!(error = %e, "Database error while fetching user");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if verify_password(&user.password, &db_user.password).is_err() {
        info!("Invalid credentials: password mismatch");
        return HttpResponse::Unauthorized().body("Invalid credentials");
    }

    let tokens = match issue_token_pair(&db_user, pool.get_ref(), &config).await {
        Ok(t) => t,
        Err(resp) => return resp,
    };

    // Non-fatal: a failed timestamp update must not block the login.
    if let Err(e) = sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = ?")
        .bind(db_user.id)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, "Failed to update last_login_at");
    }

    info!("Login successful");
    HttpResponse::Ok().json(tokens)
}

/// Access + refresh pair; the refresh jti is persisted for revocation.
async fn issue_token_pair(
    user: &UserRow,
    pool: &MySqlPool,
    config: &Config,
) -> Result<TokenPair, HttpResponse> {
    let access_token = generate_access_token(
        user.id,
        user.username.clone(),
        user.role_id,
        user.employee_id,
        &config.jwt_secret,
        config.access_token_ttl,
    )
    .map_err(|e| {
        error!(error = %e, "Failed to sign access token");
        HttpResponse::InternalServerError().finish()
    })?;

    let (refresh_token, refresh_claims) = generate_refresh_token(
        user.id,
        user.username.clone(),
        user.role_id,
        user.employee_id,
        &config.jwt_secret,
        config.refresh_token_ttl,
    )
    .map_err(|e| {
        error!(error = %e, "Failed to sign refresh token");
        HttpResponse::InternalServerError().finish()
    })?;

    debug!(user_id = user.id, jti = %refresh_claims.jti, "Storing refresh token");

    sqlx::query(
        "INSERT INTO refresh_tokens (user_id, jti, expires_at) VALUES (?, ?, FROM_UNIXTIME(?))",
    )
    .bind(user.id)
    .bind(&refresh_claims.jti)
    .bind(refresh_claims.exp as i64)
    .execute(pool)
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to store refresh token");
        HttpResponse::InternalServerError().finish()
    })?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

pub async fn refresh_token(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    let token = match bearer_token(&req) {
        Some(t) => t,
        None => return HttpResponse::Unauthorized().body("No token"),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) if c.token_type == TokenType::Refresh => c,
        _ => return HttpResponse::Unauthorized().finish(),
    };

    // The stored jti must exist and not be revoked.
    let record = match sqlx::query_as::<_, (u64, u64, bool)>(
        "SELECT id, user_id, revoked FROM refresh_tokens WHERE jti = ?",
    )
    .bind(&claims.jti)
    .fetch_optional(pool.get_ref())
    .await
    {
        Ok(Some(r)) if !r.2 => r,
        Ok(_) => return HttpResponse::Unauthorized().finish(),
        Err(e) => {
            error!(error = %e, "Failed to look up refresh token");
            return HttpResponse::InternalServerError().finish();
        }
    };

    // Rotate: the presented token is spent regardless of what follows.
    if let Err(e) = sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE id = ?")
        .bind(record.0)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, "Failed to revoke refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    let user = UserRow {
        id: claims.user_id,
        username: claims.sub.clone(),
        password: String::new(),
        role_id: claims.role,
        employee_id: claims.employee_id,
    };

    match issue_token_pair(&user, pool.get_ref(), &config).await {
        Ok(tokens) => HttpResponse::Ok().json(tokens),
        Err(resp) => resp,
    }
}

pub async fn logout(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    // Logout is idempotent: a bad or missing token is still a 204.
    let token = match bearer_token(&req) {
        Some(t) => t,
        None => return HttpResponse::NoContent().finish(),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) if c.token_type == TokenType::Refresh => c,
        _ => return HttpResponse::NoContent().finish(),
    };

    let _ = sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE jti = ?")
        .bind(&claims.jti)
        .execute(pool.get_ref())
        .await;

    HttpResponse::NoContent().finish()
}

#[get("/protected")]
pub async fn protected(req: HttpRequest) -> impl Responder {
    use actix_web::HttpMessage;
    match req.extensions().get::<crate::auth::auth::AuthUser>() {
        Some(user) => HttpResponse::Ok().body(user.username.clone()),
        None => HttpResponse::Unauthorized().body("No user"),
    }
}
