//! Export closure domain types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ziklo_shared::types::{ClosureId, UserId};

use super::error::ClosureError;
use super::scope::{ClosureScope, EntryCoordinates, Fingerprint};

/// Closure status.
///
/// The valid transitions are:
/// - (new) → Active (first export)
/// - Active → Reopened (total reopen)
/// - Active | PartiallyReopened → PartiallyReopened (partial reopen)
/// - Reopened | PartiallyReopened → Active (repeat export)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClosureStatus {
    /// Every entry in scope is frozen.
    Active,
    /// Every entry in scope is mutable again.
    Reopened,
    /// Only entries inside an exception are mutable.
    PartiallyReopened,
}

impl ClosureStatus {
    /// Returns the wire representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Reopened => "REOPENED",
            Self::PartiallyReopened => "PARTIALLY_REOPENED",
        }
    }

    /// Parses a status from its wire representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(Self::Active),
            "REOPENED" => Some(Self::Reopened),
            "PARTIALLY_REOPENED" => Some(Self::PartiallyReopened),
            _ => None,
        }
    }
}

impl fmt::Display for ClosureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A carve-out of a partially reopened closure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosureException {
    /// The reopened sub-scope.
    #[serde(flatten)]
    pub scope: ClosureScope,
    /// Why it was reopened.
    pub note: String,
    /// Who reopened it.
    pub created_by: Option<UserId>,
    /// When it was reopened.
    pub created_at: DateTime<Utc>,
}

/// A recorded export of a scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportClosure {
    /// Closure ID.
    pub id: ClosureId,
    /// Covered scope.
    pub scope: ClosureScope,
    /// Fingerprint of `scope`.
    pub fingerprint: Fingerprint,
    /// Current status.
    pub status: ClosureStatus,
    /// Export count, starting at 1.
    pub revision: i32,
    /// Optimistic concurrency token, bumped on every write.
    pub version: i64,
    /// Exceptions, only non-empty while partially reopened.
    pub exceptions: Vec<ClosureException>,
    /// Entries included in the latest artifact.
    pub record_count: i64,
    /// Storage key of the latest artifact.
    pub artifact_key: Option<String>,
    /// Who first exported the scope.
    pub created_by: Option<UserId>,
    /// Who exported the latest revision.
    pub last_exported_by: Option<UserId>,
    /// Who last reopened the closure.
    pub reopened_by: Option<UserId>,
    /// When the closure was last reopened.
    pub reopened_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last write timestamp.
    pub updated_at: DateTime<Utc>,
}

/// What a single closure says about an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosureVerdict {
    /// The entry is outside the closure's scope.
    NotCovering,
    /// The entry is inside a frozen part of the scope.
    Blocks,
    /// The entry is inside a reopened part of the scope.
    Reopened,
}

impl ExportClosure {
    /// Evaluate an entry against this closure alone.
    #[must_use]
    pub fn verdict(&self, coords: &EntryCoordinates) -> ClosureVerdict {
        if !self.scope.covers(coords) {
            return ClosureVerdict::NotCovering;
        }
        match self.status {
            ClosureStatus::Active => ClosureVerdict::Blocks,
            ClosureStatus::Reopened => ClosureVerdict::Reopened,
            ClosureStatus::PartiallyReopened => {
                if self.exceptions.iter().any(|e| e.scope.covers(coords)) {
                    ClosureVerdict::Reopened
                } else {
                    ClosureVerdict::Blocks
                }
            }
        }
    }
}

/// Request to export (and thereby close) a scope.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    /// Scope to export.
    pub scope: ClosureScope,
    /// Who asked for the export.
    pub requested_by: Option<UserId>,
}

/// A requested exception before it is accepted.
#[derive(Debug, Clone)]
pub struct ExceptionInput {
    /// Sub-scope to reopen.
    pub scope: ClosureScope,
    /// Justification.
    pub note: String,
}

/// How a closure is reopened.
#[derive(Debug, Clone)]
pub enum ReopenMode {
    /// Lift the closure entirely.
    Total,
    /// Carve out the given sub-scopes.
    Partial(Vec<ExceptionInput>),
}

/// Request to reopen a closure.
#[derive(Debug, Clone)]
pub struct ReopenRequest {
    /// Reopen mode.
    pub mode: ReopenMode,
    /// Who asked for the reopen.
    pub requested_by: Option<UserId>,
}

impl ReopenRequest {
    /// Build a request from the wire `type` and the supplied exceptions.
    ///
    /// # Errors
    ///
    /// Returns `ClosureError::InvalidReopenRequest` if the type is unknown,
    /// a partial request carries no exception, or a note is blank.
    pub fn parse(
        kind: &str,
        exceptions: Vec<ExceptionInput>,
        requested_by: Option<UserId>,
    ) -> Result<Self, ClosureError> {
        let mode = match kind.trim().to_ascii_lowercase().as_str() {
            "total" => ReopenMode::Total,
            "partial" => {
                if exceptions.is_empty() {
                    return Err(ClosureError::InvalidReopenRequest(
                        "partial reopen requires at least one exception".to_string(),
                    ));
                }
                if exceptions.iter().any(|e| e.note.trim().is_empty()) {
                    return Err(ClosureError::InvalidReopenRequest(
                        "every exception requires a note".to_string(),
                    ));
                }
                ReopenMode::Partial(exceptions)
            }
            other => {
                return Err(ClosureError::InvalidReopenRequest(format!(
                    "unknown reopen type '{other}', expected 'total' or 'partial'"
                )));
            }
        };
        Ok(Self { mode, requested_by })
    }
}
