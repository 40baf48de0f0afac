//! Timesheet error types.

use rust_decimal::Decimal;
use thiserror::Error;
use ziklo_shared::types::TimeEntryId;

use crate::closure::{BlockReason, ClosureError};

/// Errors raised while validating or mutating time entries.
#[derive(Debug, Error)]
pub enum TimesheetError {
    /// Date is neither `YYYY-MM-DD` nor RFC 3339.
    #[error("invalid date '{0}', expected YYYY-MM-DD or an RFC 3339 timestamp")]
    InvalidDate(String),

    /// Hours must be greater than zero.
    #[error("hours must be greater than zero, got {0}")]
    InvalidHours(Decimal),

    /// The engineer would exceed the daily limit.
    #[error("daily limit exceeded: {total} hours logged, maximum is {max}")]
    DailyLimitExceeded {
        /// Total including the new entry.
        total: Decimal,
        /// Configured maximum.
        max: Decimal,
    },

    /// Entry does not exist.
    #[error("time entry {0} not found")]
    NotFound(TimeEntryId),

    /// An export closure freezes the entry.
    #[error("{0}")]
    Blocked(BlockReason),

    /// Closure lookup failed.
    #[error(transparent)]
    Closure(#[from] ClosureError),

    /// Business timezone is not a valid IANA name.
    #[error("unknown timezone '{0}'")]
    InvalidTimezone(String),

    /// Persistence failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl TimesheetError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDate(_) => "INVALID_DATE",
            Self::InvalidHours(_) => "INVALID_HOURS",
            Self::DailyLimitExceeded { .. } => "DAILY_LIMIT_EXCEEDED",
            Self::NotFound(_) => "TIME_ENTRY_NOT_FOUND",
            Self::Blocked(_) => "CLOSURE_BLOCKED",
            Self::Closure(e) => e.error_code(),
            Self::InvalidTimezone(_) => "INVALID_TIMEZONE",
            Self::Repository(_) => "REPOSITORY_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidDate(_) | Self::InvalidHours(_) | Self::DailyLimitExceeded { .. } => 400,
            Self::NotFound(_) => 404,
            Self::Blocked(_) => 409,
            Self::Closure(e) => e.http_status_code(),
            Self::InvalidTimezone(_) | Self::Repository(_) => 500,
        }
    }

    /// The block reason, if an export closure rejected the mutation.
    #[must_use]
    pub fn block_reason(&self) -> Option<&BlockReason> {
        match self {
            Self::Blocked(reason) => Some(reason),
            _ => None,
        }
    }
}
