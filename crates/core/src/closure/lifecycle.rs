//! Closure state transitions.
//!
//! Pure functions that compute the next closure record. Persisting the
//! result is the caller's job; every returned record that differs from its
//! input carries `version + 1` so the store can reject stale writers.

use chrono::{DateTime, Utc};
use ziklo_shared::types::{ClosureId, UserId};

use super::error::ClosureError;
use super::scope::ClosureScope;
use super::types::{
    ClosureException, ClosureStatus, ExportClosure, ReopenMode, ReopenRequest,
};

/// Stateless closure lifecycle.
pub struct ClosureLifecycle;

impl ClosureLifecycle {
    /// First export of a scope: `Active`, revision 1.
    #[must_use]
    pub fn open(
        scope: ClosureScope,
        requested_by: Option<UserId>,
        now: DateTime<Utc>,
    ) -> ExportClosure {
        ExportClosure {
            id: ClosureId::new(),
            fingerprint: scope.fingerprint(),
            scope,
            status: ClosureStatus::Active,
            revision: 1,
            version: 1,
            exceptions: Vec::new(),
            record_count: 0,
            artifact_key: None,
            created_by: requested_by,
            last_exported_by: requested_by,
            reopened_by: None,
            reopened_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Repeat export of an existing scope.
    ///
    /// Whatever the current status, the closure goes back to `Active`, its
    /// exceptions are cleared and the revision is incremented.
    #[must_use]
    pub fn reexport(
        current: &ExportClosure,
        requested_by: Option<UserId>,
        now: DateTime<Utc>,
    ) -> ExportClosure {
        ExportClosure {
            status: ClosureStatus::Active,
            revision: current.revision + 1,
            version: current.version + 1,
            exceptions: Vec::new(),
            last_exported_by: requested_by,
            updated_at: now,
            ..current.clone()
        }
    }

    /// Apply a reopen request.
    ///
    /// A total reopen of an already reopened closure returns it unchanged.
    ///
    /// # Errors
    ///
    /// - `ExceptionOutsideScope` if an exception reaches outside the closure
    /// - `InvalidTransition` for a partial reopen of a fully reopened closure
    pub fn reopen(
        current: &ExportClosure,
        request: &ReopenRequest,
        now: DateTime<Utc>,
    ) -> Result<ExportClosure, ClosureError> {
        match &request.mode {
            ReopenMode::Total => match current.status {
                ClosureStatus::Reopened => Ok(current.clone()),
                ClosureStatus::Active | ClosureStatus::PartiallyReopened => Ok(ExportClosure {
                    status: ClosureStatus::Reopened,
                    version: current.version + 1,
                    exceptions: Vec::new(),
                    reopened_by: request.requested_by,
                    reopened_at: Some(now),
                    updated_at: now,
                    ..current.clone()
                }),
            },
            ReopenMode::Partial(inputs) => {
                match current.status {
                    ClosureStatus::Reopened => {
                        return Err(ClosureError::InvalidTransition {
                            from: ClosureStatus::Reopened,
                            to: ClosureStatus::PartiallyReopened,
                        });
                    }
                    ClosureStatus::Active | ClosureStatus::PartiallyReopened => {}
                }

                for input in inputs {
                    if let Some(dimension) = input.scope.violation_within(&current.scope) {
                        return Err(ClosureError::ExceptionOutsideScope {
                            closure_id: current.id,
                            dimension,
                        });
                    }
                }

                let mut exceptions = current.exceptions.clone();
                exceptions.extend(inputs.iter().map(|input| ClosureException {
                    scope: input.scope.clone(),
                    note: input.note.trim().to_string(),
                    created_by: request.requested_by,
                    created_at: now,
                }));

                Ok(ExportClosure {
                    status: ClosureStatus::PartiallyReopened,
                    version: current.version + 1,
                    exceptions,
                    reopened_by: request.requested_by,
                    reopened_at: Some(now),
                    updated_at: now,
                    ..current.clone()
                })
            }
        }
    }
}
