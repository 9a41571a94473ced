pub mod attendance;
pub mod holiday;
pub mod reconcile;
pub mod reminders;
pub mod scan;
pub mod schedule;
pub mod user;
