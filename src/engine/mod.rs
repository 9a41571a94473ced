//! Attendance state-resolution engine.
//!
//! Pure decision logic: given a schedule window, the ledger row so far and the
//! current local instant, decide what a scan means, how an unfinished day is
//! closed out, which reminder is due and what a day's worked time amounts to.
//! Persistence stays in the API layer; everything here is directly unit-tested.

pub mod clock;
pub mod duration;
pub mod error;
pub mod reconcile;
pub mod reminder;
pub mod scan;
