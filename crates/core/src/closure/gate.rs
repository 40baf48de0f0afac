//! Mutation gate.
//!
//! Decides whether a time entry mutation may proceed given every closure
//! whose scope covers the entry. The most restrictive closure governs: a
//! single blocking closure rejects the mutation.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use ziklo_shared::types::ClosureId;

use super::scope::EntryCoordinates;
use super::types::{ClosureStatus, ClosureVerdict, ExportClosure};

/// The kind of time entry mutation being gated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationKind {
    /// New entry.
    Create,
    /// Changed entry.
    Update,
    /// Removed entry.
    Delete,
}

impl MutationKind {
    /// Returns the lowercase verb.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a mutation was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockReason {
    /// The blocking closure.
    pub closure_id: ClosureId,
    /// Its status at evaluation time.
    pub status: ClosureStatus,
    /// First date of its scope.
    pub start_date: NaiveDate,
    /// Last date of its scope.
    pub end_date: NaiveDate,
    /// Exceptions checked without a match. Zero unless partially reopened.
    pub exceptions_checked: usize,
    /// The rejected operation.
    pub operation: MutationKind,
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cannot {} time entry: period closed by export closure {} ({} to {}, {})",
            self.operation, self.closure_id, self.start_date, self.end_date, self.status
        )?;
        if self.status == ClosureStatus::PartiallyReopened {
            write!(
                f,
                "; entry is outside all {} reopened exception(s)",
                self.exceptions_checked
            )?;
        }
        Ok(())
    }
}

/// Outcome of a gate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// The mutation may proceed.
    Allow {
        /// True if a reopened closure covers the entry.
        post_export_adjustment: bool,
    },
    /// The mutation must be rejected.
    Block(BlockReason),
}

impl GateDecision {
    /// Combine two decisions. A block wins; adjustments accumulate.
    #[must_use]
    pub fn and(self, other: GateDecision) -> GateDecision {
        match (self, other) {
            (Self::Block(reason), _) | (_, Self::Block(reason)) => Self::Block(reason),
            (
                Self::Allow {
                    post_export_adjustment: a,
                },
                Self::Allow {
                    post_export_adjustment: b,
                },
            ) => Self::Allow {
                post_export_adjustment: a || b,
            },
        }
    }

    /// Returns true if the mutation may proceed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow { .. })
    }
}

/// Evaluate an entry against a set of closures.
///
/// Closures that do not cover the entry are ignored, so callers may pass a
/// superset (e.g. every closure spanning the entry's date). When several
/// closures block, the one with the earliest start date (then lowest id) is
/// reported.
pub fn evaluate<'a, I>(closures: I, coords: &EntryCoordinates, operation: MutationKind) -> GateDecision
where
    I: IntoIterator<Item = &'a ExportClosure>,
{
    let mut adjustment = false;
    let mut blocking: Option<&ExportClosure> = None;

    for closure in closures {
        match closure.verdict(coords) {
            ClosureVerdict::NotCovering => {}
            ClosureVerdict::Reopened => adjustment = true,
            ClosureVerdict::Blocks => {
                let replace = blocking.is_none_or(|current| {
                    (closure.scope.start_date, closure.id) < (current.scope.start_date, current.id)
                });
                if replace {
                    blocking = Some(closure);
                }
            }
        }
    }

    match blocking {
        Some(closure) => GateDecision::Block(BlockReason {
            closure_id: closure.id,
            status: closure.status,
            start_date: closure.scope.start_date,
            end_date: closure.scope.end_date,
            exceptions_checked: closure.exceptions.len(),
            operation,
        }),
        None => GateDecision::Allow {
            post_export_adjustment: adjustment,
        },
    }
}
