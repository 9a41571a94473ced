use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::auth::AuthUser;
use crate::auth::password::hash_password;
use crate::utils::token_cache::{self, BadgeOwner};
use crate::utils::token_filter;

#[derive(Deserialize, ToSchema)]
pub struct CreateUser {
    #[schema(example = "jdoe")]
    pub username: String,
    pub password: String,
    #[schema(example = "Jane Doe")]
    pub full_name: String,
    #[schema(example = 3)]
    pub role_id: u8,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct UserQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct UserResponse {
    pub id: u64,
    pub username: String,
    pub role_id: u8,
    pub full_name: String,
    pub qr_token: String,
    pub is_active: bool,
}

#[derive(Serialize, ToSchema)]
pub struct UserListResponse {
    pub data: Vec<UserResponse>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 7)]
    pub total: i64,
}

/// Create a user and issue their QR badge token
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = Object, example = json!({
            "message": "User created successfully",
            "user_id": 7,
            "qr_token": "3f1d9a0e-8f9b-4f5c-9c37-2f6a1c6b7d42"
        })),
        (status = 409, description = "Username already exists"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "User"
)]
pub async fn create_user(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateUser>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let username = payload.username.trim();
    if username.is_empty() || payload.password.is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Username and password must not be empty"
        })));
    }

    let hashed = hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "Password hashing failed");
        ErrorInternalServerError("Internal Server Error")
    })?;
    let qr_token = Uuid::new_v4().to_string();

    let result = sqlx::query(
        r#"
        INSERT INTO users (username, password, role_id, full_name, qr_token)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(username)
    .bind(&hashed)
    .bind(payload.role_id)
    .bind(&payload.full_name)
    .bind(&qr_token)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(res) => {
            let user_id = res.last_insert_id();
            // keep the badge fast path warm for the new token
            token_filter::insert(&qr_token);
            token_cache::remember(
                &qr_token,
                BadgeOwner {
                    user_id,
                    full_name: payload.full_name.clone(),
                },
            )
            .await;

            Ok(HttpResponse::Created().json(serde_json::json!({
                "message": "User created successfully",
                "user_id": user_id,
                "qr_token": qr_token
            })))
        }
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::Conflict().json(serde_json::json!({
                        "message": "Username already exists"
                    })));
                }
            }

            error!(error = %e, "Failed to create user");
            Err(ErrorInternalServerError("Internal Server Error"))
        }
    }
}

/// List users
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(UserQuery),
    responses(
        (status = 200, description = "Paginated user list", body = UserListResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "User"
)]
pub async fn list_users(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<UserQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to count users");
            ErrorInternalServerError("Database error")
        })?;

    let data = sqlx::query_as::<_, UserResponse>(
        r#"
        SELECT id, username, role_id, full_name, qr_token, is_active
        FROM users
        ORDER BY id
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(per_page as i64)
    .bind(offset as i64)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch users");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(UserListResponse {
        data,
        page,
        per_page,
        total,
    }))
}

/// Regenerate a user's QR badge token, invalidating the old one
#[utoipa::path(
    post,
    path = "/api/v1/users/{user_id}/token",
    params(
        ("user_id", Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Token regenerated", body = Object, example = json!({
            "qr_token": "9b6e2c1a-7d44-4a0b-8f3e-5c2a91d0e6b7"
        })),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "User"
)]
pub async fn regenerate_token(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let user_id = path.into_inner();

    let existing = sqlx::query_as::<_, (String, String)>(
        "SELECT qr_token, full_name FROM users WHERE id = ? AND is_active",
    )
    .bind(user_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, user_id, "Failed to fetch user for token regeneration");
        ErrorInternalServerError("Database error")
    })?;

    let Some((old_token, full_name)) = existing else {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "User not found"
        })));
    };

    let new_token = Uuid::new_v4().to_string();
    sqlx::query("UPDATE users SET qr_token = ? WHERE id = ?")
        .bind(&new_token)
        .bind(user_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, user_id, "Failed to update qr token");
            ErrorInternalServerError("Database error")
        })?;

    // old badge stops resolving immediately
    token_filter::remove(&old_token);
    token_cache::forget(&old_token).await;
    token_filter::insert(&new_token);
    token_cache::remember(&new_token, BadgeOwner { user_id, full_name }).await;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "qr_token": new_token
    })))
}
