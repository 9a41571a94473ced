use crate::api::attendance::{AttendanceListResponse, AttendanceRow};
use crate::api::holiday::CreateHoliday;
use crate::api::reconcile::{ReconcileFailure, ReconcileReport, ReconcileRequest};
use crate::api::reminders::{FiredReminder, ReminderRunResponse};
use crate::api::scan::{ScanAction, ScanRequest, ScanResponse};
use crate::api::schedule::UpsertSchedule;
use crate::api::user::{CreateUser, UserListResponse, UserQuery, UserResponse};
use crate::engine::duration::WorkSummary;
use crate::engine::reminder::ReminderKind;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::holiday::{Holiday, HolidayType};
use crate::model::schedule::Schedule;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "QR Attendance API",
        version = "1.0.0",
        description = r#"
## QR Attendance Tracking Service

Tracks employee attendance against per-user weekly schedules: QR badge
check-in/check-out, automatic lateness and absence detection, and admin
reporting.

### 🔹 Key Features
- **Scanning**
  - One endpoint per badge read; check-in vs check-out decided by ledger state
- **Schedules & Holidays**
  - Per-user weekly schedules with overnight-shift support; recurring holidays
- **Reconciliation**
  - Idempotent end-of-day sweep closing out absences and forgotten checkouts
- **Reporting**
  - Worked hours, break deduction and overtime derived on every read

### 🔐 Security
All endpoints except login are protected using **JWT Bearer authentication**.
Scanning requires an **Admin** or **Scanner** account; everything else is
admin-only.

### 🚀 Usage
Point a cron-like scheduler at `/reconcile` (nightly) and `/reminders/run`
(every 15 minutes); point badge scanners at `/scan`.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::scan::scan,
        crate::api::attendance::list_attendance,

        crate::api::reconcile::run_reconciliation,
        crate::api::reminders::run_reminders,

        crate::api::user::create_user,
        crate::api::user::list_users,
        crate::api::user::regenerate_token,

        crate::api::schedule::upsert_schedule,
        crate::api::schedule::list_schedules,
        crate::api::schedule::delete_schedule,

        crate::api::holiday::create_holiday,
        crate::api::holiday::list_holidays,
        crate::api::holiday::delete_holiday
    ),
    components(
        schemas(
            ScanRequest,
            ScanResponse,
            ScanAction,
            AttendanceRow,
            AttendanceListResponse,
            AttendanceRecord,
            AttendanceStatus,
            WorkSummary,
            ReconcileRequest,
            ReconcileReport,
            ReconcileFailure,
            ReminderKind,
            FiredReminder,
            ReminderRunResponse,
            CreateUser,
            UserQuery,
            UserResponse,
            UserListResponse,
            Schedule,
            UpsertSchedule,
            Holiday,
            HolidayType,
            CreateHoliday
        )
    ),
    tags(
        (name = "Attendance", description = "Scanning and attendance reporting APIs"),
        (name = "Reconciliation", description = "End-of-day sweep APIs"),
        (name = "Reminders", description = "Reminder evaluation APIs"),
        (name = "User", description = "User and QR badge management APIs"),
        (name = "Schedule", description = "Weekly schedule management APIs"),
        (name = "Holiday", description = "Holiday calendar APIs"),
    )
)]
pub struct ApiDoc;
