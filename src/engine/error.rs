use chrono::NaiveDateTime;
use thiserror::Error;

/// Failures a single scan can produce. The display strings are the
/// user-visible scanner messages.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Invalid QR Code")]
    InvalidToken,
    #[error("No Schedule for Today")]
    NoScheduleToday,
    #[error("Already Checked Out")]
    AlreadyCheckedOut,
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

impl ScanError {
    /// Rejections the scanner operator resolves by rescanning; everything
    /// else is a server fault.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, ScanError::Db(_))
    }
}

/// time_out precedes time_in. Surfaced to reporting as a data-integrity
/// warning, never coerced to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("time out {time_out} precedes time in {time_in}")]
pub struct NegativeDuration {
    pub time_in: NaiveDateTime,
    pub time_out: NaiveDateTime,
}
