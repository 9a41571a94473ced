pub mod attendance;
pub mod holiday;
pub mod role;
pub mod schedule;
pub mod user;
