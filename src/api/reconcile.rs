use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::{MySql, MySqlPool, Transaction};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::engine::clock::ShiftWindow;
use crate::engine::reconcile::{ReconcileAction, reconcile_record};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::schedule::{Schedule, weekday_index};
use crate::store;

#[derive(Deserialize, ToSchema)]
pub struct ReconcileRequest {
    /// Service date to close out; defaults to today in the configured offset.
    /// A missed night run can be replayed for a past date.
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub date: Option<NaiveDate>,
}

#[derive(Serialize, ToSchema)]
pub struct ReconcileFailure {
    pub user_id: u64,
    #[schema(example = "pool timed out while waiting for an open connection")]
    pub error: String,
}

#[derive(Serialize, ToSchema)]
pub struct ReconcileReport {
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub holiday: bool,
    pub scheduled_users: usize,
    pub created_absent: usize,
    pub marked_absent: usize,
    pub flagged_no_time_out: usize,
    pub auto_checked_out: usize,
    pub skipped: usize,
    /// Per-user failures; the sweep continues past them.
    pub errors: Vec<ReconcileFailure>,
}

enum SweepOutcome {
    CreatedAbsent,
    MarkedAbsent,
    Flagged,
    AutoClosed,
    Skipped,
}

/// End-of-day sweep: give every scheduled user a terminal status for the date
#[utoipa::path(
    post,
    path = "/api/v1/reconcile",
    request_body = ReconcileRequest,
    responses(
        (status = 200, description = "Sweep finished; failures listed per user", body = ReconcileReport),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Reconciliation"
)]
pub async fn run_reconciliation(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<ReconcileRequest>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let clock = config.clock();
    let now = clock.now_local();
    let date = payload.date.unwrap_or_else(|| clock.today());

    let holiday = store::is_holiday(pool.get_ref(), date)
        .await
        .map_err(ErrorInternalServerError)?;

    let schedules = store::schedules_for_weekday(pool.get_ref(), weekday_index(date))
        .await
        .map_err(ErrorInternalServerError)?;

    let mut report = ReconcileReport {
        date,
        holiday,
        scheduled_users: schedules.len(),
        created_absent: 0,
        marked_absent: 0,
        flagged_no_time_out: 0,
        auto_checked_out: 0,
        skipped: 0,
        errors: Vec::new(),
    };

    for schedule in &schedules {
        match reconcile_user(pool.get_ref(), schedule, date, now, holiday, config.checkout_grace_min)
            .await
        {
            Ok(SweepOutcome::CreatedAbsent) => report.created_absent += 1,
            Ok(SweepOutcome::MarkedAbsent) => report.marked_absent += 1,
            Ok(SweepOutcome::Flagged) => report.flagged_no_time_out += 1,
            Ok(SweepOutcome::AutoClosed) => report.auto_checked_out += 1,
            Ok(SweepOutcome::Skipped) => report.skipped += 1,
            Err(e) => {
                // one bad row must not abort the batch
                warn!(error = %e, user_id = schedule.user_id, %date, "Reconciliation failed for user");
                report.errors.push(ReconcileFailure {
                    user_id: schedule.user_id,
                    error: e.to_string(),
                });
            }
        }
    }

    info!(
        %date,
        scheduled = report.scheduled_users,
        absent = report.created_absent + report.marked_absent,
        no_time_out = report.flagged_no_time_out + report.auto_checked_out,
        failures = report.errors.len(),
        "Reconciliation sweep finished"
    );

    Ok(HttpResponse::Ok().json(report))
}

async fn reconcile_user(
    pool: &MySqlPool,
    schedule: &Schedule,
    date: NaiveDate,
    now: NaiveDateTime,
    holiday: bool,
    grace_min: i64,
) -> Result<SweepOutcome, sqlx::Error> {
    let window = ShiftWindow::for_date(schedule, date);

    let mut tx = pool.begin().await?;
    let existing = lock_record(&mut tx, schedule.user_id, date).await?;
    let action = reconcile_record(existing.as_ref(), &window, now, grace_min);

    let outcome = match action {
        // holidays suppress absence marking; forgotten checkouts still close
        ReconcileAction::CreateAbsent | ReconcileAction::MarkAbsent if holiday => {
            SweepOutcome::Skipped
        }
        ReconcileAction::CreateAbsent => {
            let insert =
                sqlx::query("INSERT INTO attendance (user_id, date, status) VALUES (?, ?, ?)")
                    .bind(schedule.user_id)
                    .bind(date)
                    .bind(AttendanceStatus::Absent)
                    .execute(&mut *tx)
                    .await;
            match insert {
                Ok(_) => SweepOutcome::CreatedAbsent,
                // a scan raced us; the next run will pick the row up
                Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some("23000") => {
                    SweepOutcome::Skipped
                }
                Err(e) => return Err(e),
            }
        }
        ReconcileAction::MarkAbsent => {
            let record = existing.as_ref().expect("MarkAbsent implies a record");
            sqlx::query("UPDATE attendance SET status = ? WHERE id = ?")
                .bind(AttendanceStatus::Absent)
                .bind(record.id)
                .execute(&mut *tx)
                .await?;
            SweepOutcome::MarkedAbsent
        }
        ReconcileAction::CloseNoTimeOut { auto_time_out } => {
            let record = existing.as_ref().expect("CloseNoTimeOut implies a record");
            sqlx::query("UPDATE attendance SET status = ?, time_out = ? WHERE id = ?")
                .bind(AttendanceStatus::NoTimeOut)
                .bind(auto_time_out)
                .bind(record.id)
                .execute(&mut *tx)
                .await?;
            if auto_time_out.is_some() {
                SweepOutcome::AutoClosed
            } else {
                SweepOutcome::Flagged
            }
        }
        ReconcileAction::Skip => SweepOutcome::Skipped,
    };
    tx.commit().await?;

    Ok(outcome)
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
