use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::NaiveTime;
use serde::Deserialize;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::model::schedule::Schedule;

#[derive(Deserialize, ToSchema)]
pub struct UpsertSchedule {
    pub user_id: u64,
    /// 0 = Sunday .. 6 = Saturday
    #[schema(example = 1, minimum = 0, maximum = 6)]
    pub day_of_week: u8,
    #[schema(example = "09:00:00", value_type = String)]
    pub start_time: NaiveTime,
    /// At or before start_time means the shift ends the next day
    #[schema(example = "17:00:00", value_type = String)]
    pub end_time: NaiveTime,
    #[schema(example = "12:00:00", value_type = String)]
    pub break_start: Option<NaiveTime>,
    #[schema(example = 1.0)]
    pub break_duration_hours: Option<f64>,
}

/// Create or replace the schedule for one user and weekday
#[utoipa::path(
    put,
    path = "/api/v1/schedules",
    request_body = UpsertSchedule,
    responses(
        (status = 200, description = "Schedule saved", body = Object, example = json!({
            "message": "Schedule saved"
        })),
        (status = 400, description = "Invalid schedule"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Schedule"
)]
pub async fn upsert_schedule(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<UpsertSchedule>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    if payload.day_of_week > 6 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "day_of_week must be between 0 and 6"
        })));
    }
    let break_duration_hours = payload.break_duration_hours.unwrap_or(0.0);
    if break_duration_hours < 0.0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "break_duration_hours must not be negative"
        })));
    }

    // one schedule per (user, weekday): the unique key makes this a replace
    sqlx::query(
        r#"
        INSERT INTO schedules
            (user_id, day_of_week, start_time, end_time, break_start, break_duration_hours)
        VALUES (?, ?, ?, ?, ?, ?)
        ON DUPLICATE KEY UPDATE
            start_time = VALUES(start_time),
            end_time = VALUES(end_time),
            break_start = VALUES(break_start),
            break_duration_hours = VALUES(break_duration_hours)
        "#,
    )
    .bind(payload.user_id)
    .bind(payload.day_of_week)
    .bind(payload.start_time)
    .bind(payload.end_time)
    .bind(payload.break_start)
    .bind(break_duration_hours)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, user_id = payload.user_id, "Failed to save schedule");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Schedule saved"
    })))
}

/// Weekly schedule for one user
#[utoipa::path(
    get,
    path = "/api/v1/schedules/user/{user_id}",
    params(
        ("user_id", Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Schedule entries ordered by weekday", body = [Schedule])
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Schedule"
)]
pub async fn list_schedules(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let user_id = path.into_inner();

    let schedules = sqlx::query_as::<_, Schedule>(
        r#"
        SELECT id, user_id, day_of_week, start_time, end_time, break_start, break_duration_hours
        FROM schedules
        WHERE user_id = ?
        ORDER BY day_of_week
        "#,
    )
    .bind(user_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, user_id, "Failed to fetch schedules");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(schedules))
}

/// Remove one schedule entry
#[utoipa::path(
    delete,
    path = "/api/v1/schedules/{schedule_id}",
    params(
        ("schedule_id", Path, description = "Schedule ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Schedule not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Schedule"
)]
pub async fn delete_schedule(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let schedule_id = path.into_inner();

    let result = sqlx::query("DELETE FROM schedules WHERE id = ?")
        .bind(schedule_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, schedule_id, "Failed to delete schedule");
            ErrorInternalServerError("Database error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Schedule not found"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Successfully deleted"
    })))
}
