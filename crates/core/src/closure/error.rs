//! Closure error types.

use chrono::NaiveDate;
use thiserror::Error;
use ziklo_shared::types::ClosureId;

use super::scope::ScopeDimension;
use super::types::ClosureStatus;
use crate::export::RenderError;
use crate::storage::StorageError;

/// Errors raised by the export closure workflow.
#[derive(Debug, Error)]
pub enum ClosureError {
    /// Scope start date is after its end date.
    #[error("invalid date range: {start} is after {end}")]
    InvalidDateRange {
        /// Requested start date.
        start: NaiveDate,
        /// Requested end date.
        end: NaiveDate,
    },

    /// Reopen type is unknown or its payload is incomplete.
    #[error("invalid reopen request: {0}")]
    InvalidReopenRequest(String),

    /// A reopen exception reaches outside the closure's scope.
    #[error("exception reaches outside closure {closure_id} on {dimension}")]
    ExceptionOutsideScope {
        /// The closure being reopened.
        closure_id: ClosureId,
        /// The first offending dimension.
        dimension: ScopeDimension,
    },

    /// Closure does not exist.
    #[error("export closure {0} not found")]
    NotFound(ClosureId),

    /// The closure cannot move between these states.
    #[error("invalid closure transition from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: ClosureStatus,
        /// Requested status.
        to: ClosureStatus,
    },

    /// Another writer changed the closure first.
    #[error("export closure was modified concurrently, retry the request")]
    ConcurrentModification,

    /// The closure has no stored artifact yet.
    #[error("export closure {0} has no artifact")]
    ArtifactMissing(ClosureId),

    /// Rendering the export failed.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Reading or writing the artifact failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Persistence failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl ClosureError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::InvalidReopenRequest(_) => "INVALID_REOPEN_REQUEST",
            Self::ExceptionOutsideScope { .. } => "EXCEPTION_OUTSIDE_SCOPE",
            Self::NotFound(_) => "CLOSURE_NOT_FOUND",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
            Self::ArtifactMissing(_) => "ARTIFACT_NOT_FOUND",
            Self::Render(_) => "RENDER_ERROR",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Repository(_) => "REPOSITORY_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidDateRange { .. }
            | Self::InvalidReopenRequest(_)
            | Self::ExceptionOutsideScope { .. } => 400,
            Self::NotFound(_) | Self::ArtifactMissing(_) => 404,
            Self::InvalidTransition { .. } => 409,
            Self::ConcurrentModification => 503,
            Self::Render(_) | Self::Storage(_) | Self::Repository(_) => 500,
        }
    }

    /// Returns true if a fresh read and retry may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification)
    }
}
