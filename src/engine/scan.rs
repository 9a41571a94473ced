use chrono::NaiveDateTime;

use crate::engine::clock::ShiftWindow;
use crate::engine::error::ScanError;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};

/// What a single scan resolved to. The caller persists it under the same row
/// lock it read the record with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDecision {
    CheckIn {
        time_in: NaiveDateTime,
        status: AttendanceStatus,
        minutes_late: i64,
    },
    CheckOut {
        time_out: NaiveDateTime,
    },
}

/// Decides check-in vs check-out for an already-locked ledger row.
///
/// Lateness is strict: arriving exactly `late_threshold_min` minutes after the
/// scheduled start still counts as Present. Check-out never revises the
/// Present/Late classification, and a third scan is rejected.
pub fn resolve_scan(
    record: &AttendanceRecord,
    window: &ShiftWindow,
    now: NaiveDateTime,
    late_threshold_min: i64,
) -> Result<ScanDecision, ScanError> {
    match (record.time_in, record.time_out) {
        (None, _) => {
            let minutes_late = window.minutes_late(now);
            let status = if minutes_late > late_threshold_min {
                AttendanceStatus::Late
            } else {
                AttendanceStatus::Present
            };
            Ok(ScanDecision::CheckIn {
                time_in: now,
                status,
                minutes_late,
            })
        }
        (Some(_), None) => Ok(ScanDecision::CheckOut { time_out: now }),
        (Some(_), Some(_)) => Err(ScanError::AlreadyCheckedOut),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    use crate::model::schedule::Schedule;

    const LATE_AFTER: i64 = 15;

    fn window() -> ShiftWindow {
        let schedule = Schedule {
            id: 1,
            user_id: 1,
            day_of_week: 1,
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            break_start: None,
            break_duration_hours: 0.0,
        };
        ShiftWindow::for_date(&schedule, day())
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
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
    fn first_scan_checks_in_present() {
        let decision = resolve_scan(&record(None, None), &window(), at(9, 10), LATE_AFTER).unwrap();
        assert_eq!(
            decision,
            ScanDecision::CheckIn {
                time_in: at(9, 10),
                status: AttendanceStatus::Present,
                minutes_late: 10,
            }
        );
    }

    #[test]
    fn lateness_boundary_is_strict() {
        // 15 minutes exactly is still Present, 16 is Late
        let on_boundary =
            resolve_scan(&record(None, None), &window(), at(9, 15), LATE_AFTER).unwrap();
        assert!(matches!(
            on_boundary,
            ScanDecision::CheckIn { status: AttendanceStatus::Present, minutes_late: 15, .. }
        ));

        let past_boundary =
            resolve_scan(&record(None, None), &window(), at(9, 16), LATE_AFTER).unwrap();
        assert!(matches!(
            past_boundary,
            ScanDecision::CheckIn { status: AttendanceStatus::Late, minutes_late: 16, .. }
        ));
    }

    #[test]
    fn early_scan_is_present_with_negative_lateness() {
        let decision = resolve_scan(&record(None, None), &window(), at(8, 45), LATE_AFTER).unwrap();
        assert!(matches!(
            decision,
            ScanDecision::CheckIn { status: AttendanceStatus::Present, minutes_late: -15, .. }
        ));
    }

    #[test]
    fn second_scan_checks_out_without_touching_status() {
        let mut rec = record(Some((9, 20)), None);
        rec.status = AttendanceStatus::Late;
        let decision = resolve_scan(&rec, &window(), at(17, 30), LATE_AFTER).unwrap();
        assert_eq!(decision, ScanDecision::CheckOut { time_out: at(17, 30) });
    }

    #[test]
    fn third_scan_is_rejected() {
        let rec = record(Some((9, 0)), Some((17, 0)));
        let err = resolve_scan(&rec, &window(), at(18, 0), LATE_AFTER).unwrap_err();
        assert!(matches!(err, ScanError::AlreadyCheckedOut));
        assert!(err.is_rejection());
    }

    #[test]
    fn concurrent_second_call_sees_time_in_and_becomes_checkout() {
        // Two racing scans serialize on the row lock; whichever loses the
        // check-in race must observe time_in set and resolve as a check-out,
        // never a second check-in.
        let first =
            resolve_scan(&record(None, None), &window(), at(9, 0), LATE_AFTER).unwrap();
        let ScanDecision::CheckIn { time_in, status, .. } = first else {
            panic!("first scan must be a check-in");
        };

        let mut after_first = record(None, None);
        after_first.time_in = Some(time_in);
        after_first.status = status;

        let second = resolve_scan(&after_first, &window(), at(9, 0), LATE_AFTER).unwrap();
        assert!(matches!(second, ScanDecision::CheckOut { .. }));
    }
}
