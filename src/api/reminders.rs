use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::MySqlPool;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::engine::clock::ShiftWindow;
use crate::engine::reminder::{ReminderKind, due_reminder};
use crate::model::attendance::AttendanceRecord;
use crate::model::schedule::{Schedule, weekday_index};
use crate::store;

#[derive(Serialize, ToSchema)]
pub struct FiredReminder {
    pub user_id: u64,
    #[schema(example = "check_out")]
    pub reminder: ReminderKind,
    /// Schedule instant the reminder is anchored to (shift start or end).
    #[schema(example = "2026-01-05T17:00:00", format = "date-time", value_type = String)]
    pub scheduled_time: NaiveDateTime,
}

#[derive(Serialize, ToSchema)]
pub struct ReminderRunResponse {
    pub evaluated: usize,
    pub fired: Vec<FiredReminder>,
}

/// Evaluate reminder windows for every scheduled user and dispatch what is due
#[utoipa::path(
    post,
    path = "/api/v1/reminders/run",
    responses(
        (status = 200, description = "Due reminders dispatched", body = ReminderRunResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Reminders"
)]
pub async fn run_reminders(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let clock = config.clock();
    let now = clock.now_local();
    let today = now.date();

    let mut evaluated = 0usize;
    let mut fired = Vec::new();

    // today's shifts
    sweep_date(pool.get_ref(), today, now, false, &mut evaluated, &mut fired).await?;

    // yesterday's overnight shifts still have live check-out windows this
    // morning; evaluate them against their own service date
    let yesterday = today - Duration::days(1);
    sweep_date(pool.get_ref(), yesterday, now, true, &mut evaluated, &mut fired).await?;

    info!(evaluated, fired = fired.len(), "Reminder run finished");

    Ok(HttpResponse::Ok().json(ReminderRunResponse { evaluated, fired }))
}

async fn sweep_date(
    pool: &MySqlPool,
    date: NaiveDate,
    now: NaiveDateTime,
    overnight_only: bool,
    evaluated: &mut usize,
    fired: &mut Vec<FiredReminder>,
) -> actix_web::Result<()> {
    let holiday = store::is_holiday(pool, date)
        .await
        .map_err(ErrorInternalServerError)?;

    let schedules = store::schedules_for_weekday(pool, weekday_index(date))
        .await
        .map_err(ErrorInternalServerError)?;

    for schedule in schedules {
        if overnight_only && !schedule.is_overnight() {
            continue;
        }
        *evaluated += 1;

        // one bad user never stops the run; failures are logged, not surfaced
        match evaluate_user(pool, &schedule, date, now, holiday).await {
            Ok(Some(reminder)) => fired.push(reminder),
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, user_id = schedule.user_id, %date, "Reminder evaluation failed");
            }
        }
    }

    Ok(())
}

async fn evaluate_user(
    pool: &MySqlPool,
    schedule: &Schedule,
    date: NaiveDate,
    now: NaiveDateTime,
    holiday: bool,
) -> Result<Option<FiredReminder>, sqlx::Error> {
    let window = ShiftWindow::for_date(schedule, date);

    let record = sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT id, user_id, date, time_in, time_out, status, notes
        FROM attendance
        WHERE user_id = ? AND date = ?
        "#,
    )
    .bind(schedule.user_id)
    .bind(date)
    .fetch_optional(pool)
    .await?;

    let Some(kind) = due_reminder(&window, record.as_ref(), now, holiday) else {
        return Ok(None);
    };
    let scheduled_time = kind.scheduled_time(&window);

    // fire-and-forget dispatch into the notification log; a failed insert is
    // logged and must not fail the evaluation
    let dispatch =
        sqlx::query("INSERT INTO notifications (user_id, reminder_type, scheduled_time) VALUES (?, ?, ?)")
            .bind(schedule.user_id)
            .bind(kind.to_string())
            .bind(scheduled_time)
            .execute(pool)
            .await;
    if let Err(e) = dispatch {
        warn!(error = %e, user_id = schedule.user_id, reminder = %kind, "Failed to record notification");
    }

    Ok(Some(FiredReminder {
        user_id: schedule.user_id,
        reminder: kind,
        scheduled_time,
    }))
}
