use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::model::holiday::{Holiday, HolidayType};

#[derive(Deserialize, ToSchema)]
pub struct CreateHoliday {
    #[schema(example = "Christmas Day")]
    pub name: String,
    #[schema(example = "2024-12-25", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "public")]
    pub holiday_type: HolidayType,
    /// Recurring holidays match on month/day every year
    pub is_recurring: bool,
}

/// Add a holiday
#[utoipa::path(
    post,
    path = "/api/v1/holidays",
    request_body = CreateHoliday,
    responses(
        (status = 201, description = "Holiday created", body = Object, example = json!({
            "message": "Holiday created"
        })),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Holiday"
)]
pub async fn create_holiday(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateHoliday>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    sqlx::query(
        r#"
        INSERT INTO holidays (name, date, holiday_type, is_recurring)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&payload.name)
    .bind(payload.date)
    .bind(payload.holiday_type.as_str())
    .bind(payload.is_recurring)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to create holiday");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Holiday created"
    })))
}

/// List holidays
#[utoipa::path(
    get,
    path = "/api/v1/holidays",
    responses(
        (status = 200, description = "All holidays ordered by date", body = [Holiday])
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Holiday"
)]
pub async fn list_holidays(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let holidays = sqlx::query_as::<_, Holiday>(
        r#"
        SELECT id, name, date, holiday_type, is_recurring
        FROM holidays
        ORDER BY date
        "#,
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch holidays");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(holidays))
}

/// Remove a holiday
#[utoipa::path(
    delete,
    path = "/api/v1/holidays/{holiday_id}",
    params(
        ("holiday_id", Path, description = "Holiday ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Holiday not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Holiday"
)]
pub async fn delete_holiday(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let holiday_id = path.into_inner();

    let result = sqlx::query("DELETE FROM holidays WHERE id = ?")
        .bind(holiday_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, holiday_id, "Failed to delete holiday");
            ErrorInternalServerError("Database error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Holiday not found"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Successfully deleted"
    })))
}
