use std::collections::HashMap;

use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::{debug, error};
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::engine::duration::{WorkSummary, work_summary};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::schedule::{Schedule, weekday_index};

#[derive(Debug, Deserialize, IntoParams)]
pub struct AttendanceQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub user_id: Option<u64>,
    /// Inclusive start of the date range
    #[param(example = "2026-01-01", value_type = String)]
    pub from: Option<NaiveDate>,
    /// Inclusive end of the date range
    #[param(example = "2026-01-31", value_type = String)]
    pub to: Option<NaiveDate>,
    #[param(example = "Late")]
    pub status: Option<String>,
}

/// One ledger row plus everything derived from it on read.
#[derive(Serialize, ToSchema)]
pub struct AttendanceRow {
    pub id: u64,
    pub user_id: u64,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "2026-01-05T09:10:00", format = "date-time", value_type = String)]
    pub time_in: Option<NaiveDateTime>,
    #[schema(example = "2026-01-05T17:30:00", format = "date-time", value_type = String)]
    pub time_out: Option<NaiveDateTime>,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
    /// None while either scan is missing; rendered as "-"
    pub duration: Option<WorkSummary>,
    /// Data-integrity warning (e.g. time out precedes time in)
    pub warning: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    pub data: Vec<AttendanceRow>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 42)]
    pub total: i64,
}

enum FilterValue {
    U64(u64),
    Str(String),
    Date(NaiveDate),
}

/// Paginated attendance ledger with derived worked time and overtime
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Paginated attendance list", body = AttendanceListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    // ---------- build WHERE clause dynamically ----------
    let mut conditions = Vec::new();
    let mut bindings: Vec<FilterValue> = Vec::new();

    if let Some(user_id) = query.user_id {
        conditions.push("user_id = ?");
        bindings.push(FilterValue::U64(user_id));
    }

    if let Some(from) = query.from {
        conditions.push("date >= ?");
        bindings.push(FilterValue::Date(from));
    }

    if let Some(to) = query.to {
        conditions.push("date <= ?");
        bindings.push(FilterValue::Date(to));
    }

    if let Some(status) = &query.status {
        conditions.push("status = ?");
        bindings.push(FilterValue::Str(status.clone()));
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    // ---------- total count ----------
    let count_sql = format!("SELECT COUNT(*) FROM attendance {}", where_clause);
    debug!(sql = %count_sql, "Counting attendance records");

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &bindings {
        count_query = match b {
            FilterValue::U64(v) => count_query.bind(*v),
            FilterValue::Str(v) => count_query.bind(v.clone()),
            FilterValue::Date(v) => count_query.bind(*v),
        };
    }

    let total = count_query.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %count_sql, "Failed to count attendance records");
        ErrorInternalServerError("Database error")
    })?;

    // ---------- data query ----------
    let data_sql = format!(
        "SELECT id, user_id, date, time_in, time_out, status, notes \
         FROM attendance {} ORDER BY date DESC, user_id LIMIT ? OFFSET ?",
        where_clause
    );
    debug!(sql = %data_sql, page, per_page, "Fetching attendance records");

    let mut data_query = sqlx::query_as::<_, AttendanceRecord>(&data_sql);
    for b in &bindings {
        data_query = match b {
            FilterValue::U64(v) => data_query.bind(*v),
            FilterValue::Str(v) => data_query.bind(v.clone()),
            FilterValue::Date(v) => data_query.bind(*v),
        };
    }
    data_query = data_query.bind(per_page as i64).bind(offset as i64);

    let records = data_query.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %data_sql, "Failed to fetch attendance records");
        ErrorInternalServerError("Database error")
    })?;

    let schedules = schedules_for_page(pool.get_ref(), &records)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch schedules for attendance page");
            ErrorInternalServerError("Database error")
        })?;

    let data = records
        .into_iter()
        .map(|record| {
            let schedule = schedules.get(&(record.user_id, weekday_index(record.date)));
            into_row(record, schedule)
        })
        .collect();

    Ok(HttpResponse::Ok().json(AttendanceListResponse {
        data,
        page,
        per_page,
        total,
    }))
}

/// One query for every schedule the page's records can reference, keyed by
/// (user_id, weekday).
async fn schedules_for_page(
    pool: &MySqlPool,
    records: &[AttendanceRecord],
) -> Result<HashMap<(u64, u8), Schedule>, sqlx::Error> {
    let mut user_ids: Vec<u64> = records.iter().map(|r| r.user_id).collect();
    user_ids.sort_unstable();
    user_ids.dedup();

    if user_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let placeholders = vec!["?"; user_ids.len()].join(", ");
    let sql = format!(
        "SELECT id, user_id, day_of_week, start_time, end_time, break_start, break_duration_hours \
         FROM schedules WHERE user_id IN ({})",
        placeholders
    );

    let mut q = sqlx::query_as::<_, Schedule>(&sql);
    for id in &user_ids {
        q = q.bind(*id);
    }

    let rows = q.fetch_all(pool).await?;
    Ok(rows
        .into_iter()
        .map(|s| ((s.user_id, s.day_of_week), s))
        .collect())
}

fn into_row(record: AttendanceRecord, schedule: Option<&Schedule>) -> AttendanceRow {
    let (duration, warning) = match work_summary(&record, schedule) {
        Ok(summary) => (summary, None),
        Err(e) => (None, Some(e.to_string())),
    };

    AttendanceRow {
        id: record.id,
        user_id: record.user_id,
        date: record.date,
        time_in: record.time_in,
        time_out: record.time_out,
        status: record.status,
        notes: record.notes,
        duration,
        warning,
    }
}
