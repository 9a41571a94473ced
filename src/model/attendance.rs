use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// One attendance outcome per user per calendar day.
/// Unique on (user_id, date); never deleted by the engine.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceRecord {
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
}

/// Stored as the display string in the `status` column ("No Time Out" included).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    sqlx::Type,
    Display,
    EnumString,
    ToSchema,
)]
pub enum AttendanceStatus {
    #[default]
    Present,
    Late,
    Absent,
    #[serde(rename = "No Time Out")]
    #[sqlx(rename = "No Time Out")]
    #[strum(serialize = "No Time Out")]
    NoTimeOut,
    Unscheduled,
}

impl AttendanceRecord {
    /// True when the record has a time-in but no time-out yet.
    pub fn is_checked_in(&self) -> bool {
        self.time_in.is_some() && self.time_out.is_none()
    }

    /// True once both scan events are recorded.
    pub fn is_complete(&self) -> bool {
        self.time_in.is_some() && self.time_out.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn status_serializes_with_spaces() {
        let v = serde_json::to_value(AttendanceStatus::NoTimeOut).unwrap();
        assert_eq!(v, serde_json::json!("No Time Out"));
        let s: AttendanceStatus = serde_json::from_str("\"No Time Out\"").unwrap();
        assert_eq!(s, AttendanceStatus::NoTimeOut);
    }

    #[test]
    fn status_display_matches_stored_value() {
        assert_eq!(AttendanceStatus::Present.to_string(), "Present");
        assert_eq!(AttendanceStatus::NoTimeOut.to_string(), "No Time Out");
        assert_eq!(AttendanceStatus::Unscheduled.to_string(), "Unscheduled");
    }

    #[test]
    fn scan_state_helpers() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let mut rec = AttendanceRecord {
            id: 1,
            user_id: 7,
            date,
            time_in: None,
            time_out: None,
            status: AttendanceStatus::Present,
            notes: None,
        };
        assert!(!rec.is_checked_in());
        assert!(!rec.is_complete());

        rec.time_in = Some(date.and_hms_opt(9, 0, 0).unwrap());
        assert!(rec.is_checked_in());
        assert!(!rec.is_complete());

        rec.time_out = Some(date.and_hms_opt(17, 0, 0).unwrap());
        assert!(!rec.is_checked_in());
        assert!(rec.is_complete());
    }
}
