use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Expected working window for one user on one weekday.
/// At most one row per (user_id, day_of_week); 0 = Sunday.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Schedule {
    pub id: u64,
    pub user_id: u64,
    #[schema(example = 1, minimum = 0, maximum = 6)]
    pub day_of_week: u8,
    #[schema(example = "09:00:00", value_type = String)]
    pub start_time: NaiveTime,
    #[schema(example = "17:00:00", value_type = String)]
    pub end_time: NaiveTime,
    #[schema(example = "12:00:00", value_type = String)]
    pub break_start: Option<NaiveTime>,
    #[schema(example = 1.0)]
    pub break_duration_hours: f64,
}

/// Weekday index used throughout the schedule table: 0 = Sunday .. 6 = Saturday.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

impl Schedule {
    /// An end time at or before the start time means the shift ends the next
    /// calendar day.
    pub fn is_overnight(&self) -> bool {
        self.end_time <= self.start_time
    }

    pub fn has_break(&self) -> bool {
        self.break_start.is_some() && self.break_duration_hours > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule(start: (u32, u32), end: (u32, u32)) -> Schedule {
        Schedule {
            id: 1,
            user_id: 1,
            day_of_week: 1,
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
            break_start: None,
            break_duration_hours: 0.0,
        }
    }

    #[test]
    fn weekday_index_starts_at_sunday() {
        // 2026-01-04 is a Sunday
        let sunday = NaiveDate::from_ymd_opt(2026, 1, 4).unwrap();
        assert_eq!(weekday_index(sunday), 0);
        assert_eq!(weekday_index(sunday.succ_opt().unwrap()), 1);
        assert_eq!(weekday_index(NaiveDate::from_ymd_opt(2026, 1, 10).unwrap()), 6);
    }

    #[test]
    fn overnight_detection() {
        assert!(!schedule((9, 0), (17, 0)).is_overnight());
        assert!(schedule((22, 0), (6, 0)).is_overnight());
        // equal start and end is treated as overnight rather than a zero-length day
        assert!(schedule((9, 0), (9, 0)).is_overnight());
    }

    #[test]
    fn break_requires_start_and_duration() {
        let mut s = schedule((9, 0), (17, 0));
        assert!(!s.has_break());
        s.break_start = Some(NaiveTime::from_hms_opt(12, 0, 0).unwrap());
        s.break_duration_hours = 0.0;
        assert!(!s.has_break());
        s.break_duration_hours = 1.0;
        assert!(s.has_break());
    }
}
