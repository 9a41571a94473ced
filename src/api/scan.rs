use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::{MySql, MySqlPool, Transaction};
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::engine::clock::ShiftWindow;
use crate::engine::error::ScanError;
use crate::engine::scan::{ScanDecision, resolve_scan};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::schedule::weekday_index;
use crate::store;
use crate::utils::token_cache::{self, BadgeOwner};
use crate::utils::token_filter;

#[derive(Deserialize, ToSchema)]
pub struct ScanRequest {
    #[schema(example = "3f1d9a0e-8f9b-4f5c-9c37-2f6a1c6b7d42")]
    pub token: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScanAction {
    CheckIn,
    CheckOut,
}

#[derive(Serialize, ToSchema)]
pub struct ScanResponse {
    #[schema(example = "Checked in successfully")]
    pub message: String,
    pub action: ScanAction,
    pub user_id: u64,
    #[schema(example = "Jane Doe")]
    pub full_name: String,
    /// Present/Late classification; only set on check-in.
    pub status: Option<AttendanceStatus>,
    #[schema(example = "2026-01-05T09:10:00", format = "date-time", value_type = String)]
    pub time: NaiveDateTime,
    /// Signed minutes relative to the scheduled start; only set on check-in.
    pub minutes_late: Option<i64>,
}

/// QR scan endpoint: one call per badge read, check-in or check-out decided
/// by the ledger state
#[utoipa::path(
    post,
    path = "/api/v1/scan",
    request_body = ScanRequest,
    responses(
        (status = 200, description = "Scan accepted", body = ScanResponse),
        (status = 400, description = "Rejected scan", body = Object, example = json!({
            "message": "No Schedule for Today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn scan(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<ScanRequest>,
) -> actix_web::Result<impl Responder> {
    auth.require_scanner()?;

    let token = payload.token.trim();
    if token.is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": ScanError::InvalidToken.to_string()
        })));
    }

    match process_scan(pool.get_ref(), config.get_ref(), token).await {
        Ok(resp) => Ok(HttpResponse::Ok().json(resp)),
        Err(e) if e.is_rejection() => Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": e.to_string()
        }))),
        Err(e) => {
            tracing::error!(error = %e, "Scan failed");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/// Badge resolution: cuckoo filter for a fast negative, moka cache for a fast
/// positive, database as the authority.
async fn resolve_badge(pool: &MySqlPool, token: &str) -> Result<Option<BadgeOwner>, sqlx::Error> {
    if !token_filter::might_exist(token) {
        return Ok(None);
    }

    if let Some(owner) = token_cache::lookup(token).await {
        return Ok(Some(owner));
    }

    match store::find_user_by_token(pool, token).await? {
        Some(user) => {
            let owner = BadgeOwner {
                user_id: user.id,
                full_name: user.full_name,
            };
            token_cache::remember(token, owner.clone()).await;
            Ok(Some(owner))
        }
        None => Ok(None),
    }
}

async fn process_scan(
    pool: &MySqlPool,
    config: &Config,
    token: &str,
) -> Result<ScanResponse, ScanError> {
    let owner = resolve_badge(pool, token)
        .await?
        .ok_or(ScanError::InvalidToken)?;

    let clock = config.clock();
    let now = clock.now_local();
    let today = now.date();

    let schedule = store::get_schedule(pool, owner.user_id, weekday_index(today))
        .await?
        .ok_or(ScanError::NoScheduleToday)?;
    let window = ShiftWindow::for_date(&schedule, today);

    // Everything below runs under a row lock on (user, today) so concurrent
    // scans for the same badge serialize: exactly one becomes the check-in.
    let mut tx = pool.begin().await?;
    let record = match lock_record(&mut tx, owner.user_id, today).await? {
        Some(r) => r,
        None => create_record(&mut tx, owner.user_id, today).await?,
    };

    let decision = resolve_scan(&record, &window, now, config.late_threshold_min)?;
    let response = match decision {
        ScanDecision::CheckIn {
            time_in,
            status,
            minutes_late,
        } => {
            sqlx::query("UPDATE attendance SET time_in = ?, status = ? WHERE id = ?")
                .bind(time_in)
                .bind(status)
                .bind(record.id)
                .execute(&mut *tx)
                .await?;
            ScanResponse {
                message: "Checked in successfully".into(),
                action: ScanAction::CheckIn,
                user_id: owner.user_id,
                full_name: owner.full_name,
                status: Some(status),
                time: time_in,
                minutes_late: Some(minutes_late),
            }
        }
        ScanDecision::CheckOut { time_out } => {
            sqlx::query("UPDATE attendance SET time_out = ? WHERE id = ?")
                .bind(time_out)
                .bind(record.id)
                .execute(&mut *tx)
                .await?;
            ScanResponse {
                message: "Checked out successfully".into(),
                action: ScanAction::CheckOut,
                user_id: owner.user_id,
                full_name: owner.full_name,
                status: None,
                time: time_out,
                minutes_late: None,
            }
        }
    };
    tx.commit().await?;

    Ok(response)
}

async fn lock_record(
    tx: &mut Transaction<'_, MySql>,
    user_id: u64,
    date: NaiveDate,
) -> Result<Option<AttendanceRecord>, sqlx::Error> {
    sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT id, user_id, date, time_in, time_out, status, notes
        FROM attendance
        WHERE user_id = ? AND date = ?
        FOR UPDATE
        "#,
    )
    .bind(user_id)
    .bind(date)
    .fetch_optional(&mut **tx)
    .await
}

/// The UNIQUE (user_id, date) key turns a concurrent first-scan race into a
/// duplicate-key error; the loser re-reads the winner's row under the lock.
async fn create_record(
    tx: &mut Transaction<'_, MySql>,
    user_id: u64,
    date: NaiveDate,
) -> Result<AttendanceRecord, sqlx::Error> {
    let insert = sqlx::query("INSERT INTO attendance (user_id, date, status) VALUES (?, ?, ?)")
        .bind(user_id)
        .bind(date)
        .bind(AttendanceStatus::Present)
        .execute(&mut **tx)
        .await;

    if let Err(e) = insert {
        let duplicate = matches!(
            &e,
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23000")
        );
        if !duplicate {
            return Err(e);
        }
    }

    lock_record(tx, user_id, date)
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}
