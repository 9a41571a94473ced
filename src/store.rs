use chrono::{Datelike, NaiveDate};
use sqlx::MySqlPool;

use crate::model::schedule::Schedule;
use crate::model::user::User;

/// Shared lookups used by the scan, reminder and reconciliation paths.
/// All reads; ledger writes stay with their endpoints under row locks.

pub async fn get_schedule(
    pool: &MySqlPool,
    user_id: u64,
    day_of_week: u8,
) -> Result<Option<Schedule>, sqlx::Error> {
    sqlx::query_as::<_, Schedule>(
        r#"
        SELECT id, user_id, day_of_week, start_time, end_time, break_start, break_duration_hours
        FROM schedules
        WHERE user_id = ? AND day_of_week = ?
        "#,
    )
    .bind(user_id)
    .bind(day_of_week)
    .fetch_optional(pool)
    .await
}

/// All schedule rows for one weekday; the sweep and reminder runs iterate this.
pub async fn schedules_for_weekday(
    pool: &MySqlPool,
    day_of_week: u8,
) -> Result<Vec<Schedule>, sqlx::Error> {
    sqlx::query_as::<_, Schedule>(
        r#"
        SELECT s.id, s.user_id, s.day_of_week, s.start_time, s.end_time,
               s.break_start, s.break_duration_hours
        FROM schedules s
        INNER JOIN users u ON u.id = s.user_id
        WHERE s.day_of_week = ? AND u.is_active
        ORDER BY s.user_id
        "#,
    )
    .bind(day_of_week)
    .fetch_all(pool)
    .await
}

/// Exact date match, or month/day match for recurring holidays.
pub async fn is_holiday(pool: &MySqlPool, date: NaiveDate) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM holidays
            WHERE date = ?
               OR (is_recurring AND MONTH(date) = ? AND DAY(date) = ?)
            LIMIT 1
        )
        "#,
    )
    .bind(date)
    .bind(date.month())
    .bind(date.day())
    .fetch_one(pool)
    .await
}

pub async fn find_user_by_token(
    pool: &MySqlPool,
    token: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, password, role_id, full_name, qr_token, is_active
        FROM users
        WHERE qr_token = ? AND is_active
        "#,
    )
    .bind(token)
    .fetch_optional(pool)
    .await
}
