use chrono::NaiveDateTime;

use crate::engine::clock::ShiftWindow;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};

/// What the end-of-day sweep should do for one scheduled user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileAction {
    /// No ledger row exists: create one as a no-show.
    CreateAbsent,
    /// A row exists but holds no scans at all.
    MarkAbsent,
    /// Checked in, never checked out. `auto_time_out` is the implicit
    /// departure instant once the grace period has elapsed, `None` while the
    /// day is still open and a later run should finalize it.
    CloseNoTimeOut { auto_time_out: Option<NaiveDateTime> },
    /// Already terminal; nothing to write.
    Skip,
}

/// Decides the sweep action for one user and date.
///
/// Idempotent by construction: applying the returned action and running the
/// decision again yields `Skip` (or the identical write). The auto-filled
/// time-out is always `scheduled_end + grace`, a constant for the date, so
/// repeated runs cannot extend it twice.
pub fn reconcile_record(
    existing: Option<&AttendanceRecord>,
    window: &ShiftWindow,
    now: NaiveDateTime,
    grace_min: i64,
) -> ReconcileAction {
    let Some(record) = existing else {
        return ReconcileAction::CreateAbsent;
    };

    if record.time_out.is_some() {
        return ReconcileAction::Skip;
    }

    match record.time_in {
        None => {
            if record.status == AttendanceStatus::Absent {
                ReconcileAction::Skip
            } else {
                ReconcileAction::MarkAbsent
            }
        }
        Some(_) => {
            let extended = window.extended_end(grace_min);
            let auto_time_out = (now > extended).then_some(extended);
            if auto_time_out.is_none() && record.status == AttendanceStatus::NoTimeOut {
                // already flagged on an earlier run, still inside the grace period
                ReconcileAction::Skip
            } else {
                ReconcileAction::CloseNoTimeOut { auto_time_out }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    use crate::model::schedule::Schedule;

    const GRACE: i64 = 60;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
    }

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

    fn record(
        time_in: Option<(u32, u32)>,
        time_out: Option<(u32, u32)>,
        status: AttendanceStatus,
    ) -> AttendanceRecord {
        AttendanceRecord {
            id: 1,
            user_id: 1,
            date: day(),
            time_in: time_in.map(|(h, m)| day().and_hms_opt(h, m, 0).unwrap()),
            time_out: time_out.map(|(h, m)| day().and_hms_opt(h, m, 0).unwrap()),
            status,
            notes: None,
        }
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        day().and_hms_opt(h, m, 0).unwrap()
    }

    /// Mirrors the SQL the sweep endpoint runs for each action.
    fn apply(action: ReconcileAction, existing: Option<AttendanceRecord>) -> Option<AttendanceRecord> {
        match action {
            ReconcileAction::CreateAbsent => {
                Some(record(None, None, AttendanceStatus::Absent))
            }
            ReconcileAction::MarkAbsent => {
                let mut rec = existing.unwrap();
                rec.status = AttendanceStatus::Absent;
                Some(rec)
            }
            ReconcileAction::CloseNoTimeOut { auto_time_out } => {
                let mut rec = existing.unwrap();
                rec.status = AttendanceStatus::NoTimeOut;
                rec.time_out = auto_time_out;
                Some(rec)
            }
            ReconcileAction::Skip => existing,
        }
    }

    #[test]
    fn never_scanned_becomes_absent() {
        // scheduled 09:00-17:00, no scans, sweep at 23:59
        assert_eq!(
            reconcile_record(None, &window(), at(23, 59), GRACE),
            ReconcileAction::CreateAbsent
        );
    }

    #[test]
    fn empty_record_marked_absent() {
        let rec = record(None, None, AttendanceStatus::Present);
        assert_eq!(
            reconcile_record(Some(&rec), &window(), at(23, 59), GRACE),
            ReconcileAction::MarkAbsent
        );
    }

    #[test]
    fn forgotten_checkout_auto_extends_past_grace() {
        // checked in 09:00, never out; sweep at 18:30 is past 17:00 + 1h
        let rec = record(Some((9, 0)), None, AttendanceStatus::Present);
        assert_eq!(
            reconcile_record(Some(&rec), &window(), at(18, 30), GRACE),
            ReconcileAction::CloseNoTimeOut { auto_time_out: Some(at(18, 0)) }
        );
    }

    #[test]
    fn forgotten_checkout_defers_within_grace() {
        let rec = record(Some((9, 0)), None, AttendanceStatus::Present);
        assert_eq!(
            reconcile_record(Some(&rec), &window(), at(17, 30), GRACE),
            ReconcileAction::CloseNoTimeOut { auto_time_out: None }
        );
    }

    #[test]
    fn complete_record_is_skipped() {
        let rec = record(Some((9, 0)), Some((17, 5)), AttendanceStatus::Present);
        assert_eq!(
            reconcile_record(Some(&rec), &window(), at(23, 59), GRACE),
            ReconcileAction::Skip
        );
    }

    #[test]
    fn sweep_is_idempotent_from_every_starting_state() {
        let starts: Vec<Option<AttendanceRecord>> = vec![
            None,
            Some(record(None, None, AttendanceStatus::Present)),
            Some(record(Some((9, 0)), None, AttendanceStatus::Present)),
            Some(record(Some((9, 0)), Some((17, 30)), AttendanceStatus::Present)),
            Some(record(None, None, AttendanceStatus::Absent)),
            Some(record(Some((9, 0)), None, AttendanceStatus::NoTimeOut)),
        ];

        for (now, label) in [(at(17, 30), "within grace"), (at(23, 59), "past grace")] {
            for start in &starts {
                let first = reconcile_record(start.as_ref(), &window(), now, GRACE);
                let once = apply(first, start.clone());
                let second = reconcile_record(once.as_ref(), &window(), now, GRACE);
                let twice = apply(second, once.clone());
                let (once, twice) = (once.unwrap(), twice.unwrap());
                assert_eq!(once.status, twice.status, "{label}");
                assert_eq!(once.time_in, twice.time_in, "{label}");
                assert_eq!(once.time_out, twice.time_out, "{label}");
            }
        }
    }

    #[test]
    fn second_run_after_grace_fills_deferred_time_out() {
        // first run inside grace flags the record, a later run finalizes it
        let rec = record(Some((9, 0)), None, AttendanceStatus::Present);
        let flagged = apply(
            reconcile_record(Some(&rec), &window(), at(17, 30), GRACE),
            Some(rec),
        )
        .unwrap();
        assert_eq!(flagged.status, AttendanceStatus::NoTimeOut);
        assert_eq!(flagged.time_out, None);

        // still inside grace: nothing more to do
        assert_eq!(
            reconcile_record(Some(&flagged), &window(), at(17, 45), GRACE),
            ReconcileAction::Skip
        );

        assert_eq!(
            reconcile_record(Some(&flagged), &window(), at(19, 0), GRACE),
            ReconcileAction::CloseNoTimeOut { auto_time_out: Some(at(18, 0)) }
        );
    }
}
