//! Error responses.
//!
//! Every failure leaves the API as `{"success": false, "error": CODE, "message": text}`.
//! Server-side failures are logged and replaced by a generic message.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;
use ziklo_core::closure::ClosureError;
use ziklo_core::timesheet::TimesheetError;
use ziklo_db::CatalogError;
use ziklo_shared::AppError;

/// Message returned in place of server-side error details.
pub const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// Error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Always false.
    pub success: bool,
    /// Machine-readable code.
    pub error: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Structured context, e.g. the closure that blocked a write.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// An error on its way out of a handler.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    details: Option<serde_json::Value>,
}

impl ApiError {
    /// Builds an error from a numeric status.
    #[must_use]
    pub fn new(status: u16, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            code,
            message: message.into(),
            details: None,
        }
    }

    /// A 400 validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into()).into()
    }

    /// A 500 error for failures that never reach the client verbatim.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal(message.into()).into()
    }

    /// Attaches structured details.
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// HTTP status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = if self.status.is_server_error() {
            error!(code = self.code, error = %self.message, "Request failed");
            INTERNAL_MESSAGE.to_string()
        } else {
            self.message
        };

        let body = ErrorBody {
            success: false,
            error: self.code,
            message,
            details: self.details,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        // Strip the "Validation error: " style prefix, the code already says it.
        let message = match &err {
            AppError::NotFound(m)
            | AppError::Validation(m)
            | AppError::Conflict(m)
            | AppError::Unavailable(m)
            | AppError::Database(m)
            | AppError::Internal(m) => m.clone(),
        };
        Self::new(err.status_code(), err.error_code(), message)
    }
}

impl From<ClosureError> for ApiError {
    fn from(err: ClosureError) -> Self {
        Self::new(err.http_status_code(), err.error_code(), err.to_string())
    }
}

impl From<TimesheetError> for ApiError {
    fn from(err: TimesheetError) -> Self {
        let details = err
            .block_reason()
            .and_then(|reason| serde_json::to_value(reason).ok());
        let api = Self::new(err.http_status_code(), err.error_code(), err.to_string());
        match details {
            Some(details) => api.with_details(details),
            None => api,
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        AppError::from(err).into()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}
