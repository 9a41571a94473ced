use serde::Serialize;
use utoipa::ToSchema;

use crate::engine::clock::ShiftWindow;
use crate::engine::error::NegativeDuration;
use crate::model::attendance::AttendanceRecord;
use crate::model::schedule::Schedule;

/// Derived on every read; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct WorkSummary {
    #[schema(example = 8.33)]
    pub total_hours: f64,
    #[schema(example = 0.5)]
    pub overtime_hours: f64,
    pub is_overtime: bool,
}

/// Computes worked time and overtime for a resolved ledger entry.
///
/// Returns `Ok(None)` while either scan is missing (rendered as "-" by
/// reporting). A time-out before the time-in is a data-integrity error the
/// caller must surface, not a zero. A record without a schedule for its
/// weekday (admin-entered `Unscheduled` days) earns no overtime.
pub fn work_summary(
    record: &AttendanceRecord,
    schedule: Option<&Schedule>,
) -> Result<Option<WorkSummary>, NegativeDuration> {
    let (Some(time_in), Some(time_out)) = (record.time_in, record.time_out) else {
        return Ok(None);
    };
    if time_out < time_in {
        return Err(NegativeDuration { time_in, time_out });
    }

    let mut total_hours = (time_out - time_in).num_minutes() as f64 / 60.0;
    if let Some(schedule) = schedule {
        if schedule.has_break() {
            total_hours = (total_hours - schedule.break_duration_hours).max(0.0);
        }
    }

    let overtime_hours = schedule
        .map(|s| {
            let window = ShiftWindow::for_date(s, record.date);
            ((time_out - window.end).num_minutes().max(0)) as f64 / 60.0
        })
        .unwrap_or(0.0);

    Ok(Some(WorkSummary {
        total_hours: round2(total_hours),
        overtime_hours: round2(overtime_hours),
        is_overtime: overtime_hours > 0.0,
    }))
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
