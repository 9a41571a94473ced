use chrono::{Duration, FixedOffset, NaiveDate, NaiveDateTime, Utc};

use crate::model::schedule::Schedule;

/// Wall clock pinned to the deployment's configured UTC offset.
///
/// The service day boundary is local midnight, so every "today" and "now" the
/// engine sees must come through here rather than from `Utc::now()` directly.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    offset: FixedOffset,
}

impl Clock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn now_local(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.offset).naive_local()
    }

    pub fn today(&self) -> NaiveDate {
        self.now_local().date()
    }
}

/// Parses offsets of the form `+06:00` / `-0530` / `+08`.
pub fn parse_utc_offset(s: &str) -> Option<FixedOffset> {
    let s = s.trim();
    let (sign, rest) = match s.chars().next()? {
        '+' => (1, &s[1..]),
        '-' => (-1, &s[1..]),
        _ => (1, s),
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    let (hours, minutes) = match digits.len() {
        1 | 2 => (digits.parse::<i32>().ok()?, 0),
        4 => (
            digits[..2].parse::<i32>().ok()?,
            digits[2..].parse::<i32>().ok()?,
        ),
        _ => return None,
    };
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// A schedule projected onto a concrete service date: two local instants.
///
/// Overnight shifts (end time at or before start time) roll the end instant to
/// the next calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl ShiftWindow {
    pub fn for_date(schedule: &Schedule, date: NaiveDate) -> Self {
        let start = date.and_time(schedule.start_time);
        let end_date = if schedule.is_overnight() {
            date + Duration::days(1)
        } else {
            date
        };
        Self {
            start,
            end: end_date.and_time(schedule.end_time),
        }
    }

    /// Minutes since the scheduled start; negative when early.
    pub fn minutes_late(&self, now: NaiveDateTime) -> i64 {
        (now - self.start).num_minutes()
    }

    /// The implicit-departure instant used by the end-of-day sweep.
    pub fn extended_end(&self, grace_min: i64) -> NaiveDateTime {
        self.end + Duration::minutes(grace_min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

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

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_common_offset_forms() {
        assert_eq!(parse_utc_offset("+06:00"), FixedOffset::east_opt(6 * 3600));
        assert_eq!(
            parse_utc_offset("-0530"),
            FixedOffset::east_opt(-(5 * 3600 + 30 * 60))
        );
        assert_eq!(parse_utc_offset("+8"), FixedOffset::east_opt(8 * 3600));
        assert_eq!(parse_utc_offset("00:00"), FixedOffset::east_opt(0));
        assert_eq!(parse_utc_offset("+25:00"), None);
        assert_eq!(parse_utc_offset("abc"), None);
    }

    #[test]
    fn day_shift_window_stays_on_date() {
        let w = ShiftWindow::for_date(&schedule((9, 0), (17, 0)), date(2026, 1, 5));
        assert_eq!(w.start, date(2026, 1, 5).and_hms_opt(9, 0, 0).unwrap());
        assert_eq!(w.end, date(2026, 1, 5).and_hms_opt(17, 0, 0).unwrap());
    }

    #[test]
    fn overnight_window_ends_next_day() {
        let w = ShiftWindow::for_date(&schedule((22, 0), (6, 0)), date(2026, 1, 5));
        assert_eq!(w.start, date(2026, 1, 5).and_hms_opt(22, 0, 0).unwrap());
        assert_eq!(w.end, date(2026, 1, 6).and_hms_opt(6, 0, 0).unwrap());
    }

    #[test]
    fn minutes_late_is_signed() {
        let w = ShiftWindow::for_date(&schedule((9, 0), (17, 0)), date(2026, 1, 5));
        let early = date(2026, 1, 5).and_hms_opt(8, 50, 0).unwrap();
        let late = date(2026, 1, 5).and_hms_opt(9, 16, 0).unwrap();
        assert_eq!(w.minutes_late(early), -10);
        assert_eq!(w.minutes_late(late), 16);
    }

    #[test]
    fn extended_end_adds_grace() {
        let w = ShiftWindow::for_date(&schedule((9, 0), (17, 0)), date(2026, 1, 5));
        assert_eq!(
            w.extended_end(60),
            date(2026, 1, 5).and_hms_opt(18, 0, 0).unwrap()
        );
    }
}
