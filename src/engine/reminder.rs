use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::engine::clock::ShiftWindow;
use crate::model::attendance::AttendanceRecord;

/// Each window is a bounded 15-minute slot so a reminder fires at most once
/// per evaluation cadence. Dedup across cadences is the dispatcher's job.
const WINDOW_MIN: i64 = 15;
const CHECK_IN_LEAD_MIN: i64 = 15;
const LATE_CHECK_IN_AFTER_MIN: i64 = 30;
const CHECK_OUT_LEAD_MIN: i64 = 15;
const MISSED_CHECK_OUT_AFTER_MIN: i64 = 60;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    CheckIn,
    LateCheckIn,
    CheckOut,
    MissedCheckOut,
}

impl ReminderKind {
    /// The schedule instant the notification is anchored to.
    pub fn scheduled_time(&self, window: &ShiftWindow) -> NaiveDateTime {
        match self {
            ReminderKind::CheckIn | ReminderKind::LateCheckIn => window.start,
            ReminderKind::CheckOut | ReminderKind::MissedCheckOut => window.end,
        }
    }
}

/// Decides whether a reminder is due for one user right now.
///
/// Pure lookup over (window, ledger row so far, now); never mutates anything.
/// A holiday suppresses all four rules.
pub fn due_reminder(
    window: &ShiftWindow,
    record: Option<&AttendanceRecord>,
    now: NaiveDateTime,
    is_holiday: bool,
) -> Option<ReminderKind> {
    if is_holiday {
        return None;
    }

    let time_in = record.and_then(|r| r.time_in);
    let time_out = record.and_then(|r| r.time_out);
    let within = |from: NaiveDateTime| now >= from && now < from + Duration::minutes(WINDOW_MIN);

    if time_in.is_none() {
        if within(window.start - Duration::minutes(CHECK_IN_LEAD_MIN)) {
            return Some(ReminderKind::CheckIn);
        }
        if within(window.start + Duration::minutes(LATE_CHECK_IN_AFTER_MIN)) {
            return Some(ReminderKind::LateCheckIn);
        }
        return None;
    }

    if time_out.is_none() {
        if within(window.end - Duration::minutes(CHECK_OUT_LEAD_MIN)) {
            return Some(ReminderKind::CheckOut);
        }
        if within(window.end + Duration::minutes(MISSED_CHECK_OUT_AFTER_MIN)) {
            return Some(ReminderKind::MissedCheckOut);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    use crate::model::attendance::AttendanceStatus;
    use crate::model::schedule::Schedule;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
    }

    fn window_for(start: (u32, u32), end: (u32, u32)) -> ShiftWindow {
        let schedule = Schedule {
            id: 1,
            user_id: 1,
            day_of_week: 1,
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
            break_start: None,
            break_duration_hours: 0.0,
        };
        ShiftWindow::for_date(&schedule, day())
    }

    fn record(time_in: Option<(u32, u32)>, time_out: Option<(u32, u32)>) -> AttendanceRecord {
        AttendanceRecord {
            id: 1,
            user_id: 1,
            date: day(),
            time_in: time_in.map(|(h, m)| day().and_hms_opt(h, m, 0).unwrap()),
            time_out: time_out.map(|(h, m)| day().and_hms_opt(h, m, 0).unwrap()),
            status: AttendanceStatus::Present,
            notes: None,
        }
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        day().and_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn check_in_window_before_start() {
        let w = window_for((9, 0), (17, 0));
        assert_eq!(due_reminder(&w, None, at(8, 44), false), None);
        assert_eq!(
            due_reminder(&w, None, at(8, 45), false),
            Some(ReminderKind::CheckIn)
        );
        assert_eq!(
            due_reminder(&w, None, at(8, 59), false),
            Some(ReminderKind::CheckIn)
        );
        // start itself is outside the slot
        assert_eq!(due_reminder(&w, None, at(9, 0), false), None);
    }

    #[test]
    fn late_check_in_window_after_start() {
        let w = window_for((9, 0), (17, 0));
        assert_eq!(due_reminder(&w, None, at(9, 29), false), None);
        assert_eq!(
            due_reminder(&w, None, at(9, 30), false),
            Some(ReminderKind::LateCheckIn)
        );
        assert_eq!(
            due_reminder(&w, None, at(9, 44), false),
            Some(ReminderKind::LateCheckIn)
        );
        assert_eq!(due_reminder(&w, None, at(9, 45), false), None);
    }

    #[test]
    fn check_in_rules_stop_once_checked_in() {
        let w = window_for((9, 0), (17, 0));
        let rec = record(Some((8, 50)), None);
        assert_eq!(due_reminder(&w, Some(&rec), at(8, 55), false), None);
        assert_eq!(due_reminder(&w, Some(&rec), at(9, 35), false), None);
    }

    #[test]
    fn check_out_windows_need_open_check_in() {
        let w = window_for((9, 0), (17, 0));
        let open = record(Some((9, 0)), None);
        assert_eq!(
            due_reminder(&w, Some(&open), at(16, 45), false),
            Some(ReminderKind::CheckOut)
        );
        assert_eq!(due_reminder(&w, Some(&open), at(17, 0), false), None);
        assert_eq!(
            due_reminder(&w, Some(&open), at(18, 0), false),
            Some(ReminderKind::MissedCheckOut)
        );
        assert_eq!(due_reminder(&w, Some(&open), at(18, 15), false), None);

        // no check-in yet: checkout rules never apply
        assert_eq!(due_reminder(&w, None, at(16, 45), false), None);
        // already checked out: nothing fires
        let closed = record(Some((9, 0)), Some((17, 0)));
        assert_eq!(due_reminder(&w, Some(&closed), at(18, 0), false), None);
    }

    #[test]
    fn overnight_checkout_window_is_next_morning() {
        // 22:00 -> 06:00 next day; the check-out window sits before 06:00
        // on Jan 6, not before 06:00 on the service date itself.
        let w = window_for((22, 0), (6, 0));
        let open = record(Some((22, 0)), None);
        let next_morning = day()
            .succ_opt()
            .unwrap()
            .and_hms_opt(5, 50, 0)
            .unwrap();
        assert_eq!(
            due_reminder(&w, Some(&open), next_morning, false),
            Some(ReminderKind::CheckOut)
        );
        // same clock time on the service date is hours before the shift even starts
        assert_eq!(due_reminder(&w, Some(&open), at(5, 50), false), None);
    }

    #[test]
    fn holiday_suppresses_everything() {
        let w = window_for((9, 0), (17, 0));
        let open = record(Some((9, 0)), None);
        assert_eq!(due_reminder(&w, None, at(8, 50), true), None);
        assert_eq!(due_reminder(&w, None, at(9, 35), true), None);
        assert_eq!(due_reminder(&w, Some(&open), at(16, 50), true), None);
        assert_eq!(due_reminder(&w, Some(&open), at(18, 5), true), None);
    }

    #[test]
    fn scheduled_time_anchors_to_window_edges() {
        let w = window_for((9, 0), (17, 0));
        assert_eq!(ReminderKind::CheckIn.scheduled_time(&w), w.start);
        assert_eq!(ReminderKind::LateCheckIn.scheduled_time(&w), w.start);
        assert_eq!(ReminderKind::CheckOut.scheduled_time(&w), w.end);
        assert_eq!(ReminderKind::MissedCheckOut.scheduled_time(&w), w.end);
    }

    #[test]
    fn kind_serializes_snake_case() {
        assert_eq!(ReminderKind::MissedCheckOut.to_string(), "missed_check_out");
        let v = serde_json::to_value(ReminderKind::LateCheckIn).unwrap();
        assert_eq!(v, serde_json::json!("late_check_in"));
    }
}
