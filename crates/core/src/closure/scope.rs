//! Closure scopes and their fingerprints.
//!
//! A scope is an inclusive date range plus optional sets of project, cost
//! center and engineer ids. An empty set means the dimension is not filtered.
//! Sets are kept sorted, so two scopes built from the same ids in a different
//! order are equal and share a fingerprint.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use ziklo_shared::types::{CostCenterId, EngineerId, ProjectId};

use super::error::ClosureError;

/// Version tag of the canonical form. Bump when the encoding changes.
const CANONICAL_VERSION: &str = "v1";

/// The coordinates of a time entry that closures are matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryCoordinates {
    /// Calendar date of the entry in the business timezone.
    pub date: NaiveDate,
    /// Project the hours were logged against.
    pub project_id: ProjectId,
    /// Cost center the hours were logged against.
    pub cost_center_id: CostCenterId,
    /// Engineer who logged the hours.
    pub engineer_id: EngineerId,
}

/// A dimension of a scope, used to report which filter an exception violates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeDimension {
    /// The inclusive date range.
    DateRange,
    /// The project id set.
    Projects,
    /// The cost center id set.
    CostCenters,
    /// The engineer id set.
    Engineers,
}

impl ScopeDimension {
    /// Returns the field name used in requests.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DateRange => "date_range",
            Self::Projects => "project_ids",
            Self::CostCenters => "cost_center_ids",
            Self::Engineers => "engineer_ids",
        }
    }
}

impl fmt::Display for ScopeDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized filter set of an export or of a reopen exception.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosureScope {
    /// First covered date (inclusive).
    pub start_date: NaiveDate,
    /// Last covered date (inclusive).
    pub end_date: NaiveDate,
    /// Covered projects. Empty means all projects.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub project_ids: BTreeSet<ProjectId>,
    /// Covered cost centers. Empty means all cost centers.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub cost_center_ids: BTreeSet<CostCenterId>,
    /// Covered engineers. Empty means all engineers.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub engineer_ids: BTreeSet<EngineerId>,
}

impl ClosureScope {
    /// Create an unfiltered scope over `[start_date, end_date]`.
    ///
    /// # Errors
    ///
    /// Returns `ClosureError::InvalidDateRange` if `start_date > end_date`.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Result<Self, ClosureError> {
        if start_date > end_date {
            return Err(ClosureError::InvalidDateRange {
                start: start_date,
                end: end_date,
            });
        }
        Ok(Self {
            start_date,
            end_date,
            project_ids: BTreeSet::new(),
            cost_center_ids: BTreeSet::new(),
            engineer_ids: BTreeSet::new(),
        })
    }

    /// Restrict the scope to the given projects.
    #[must_use]
    pub fn with_projects(mut self, ids: impl IntoIterator<Item = ProjectId>) -> Self {
        self.project_ids.extend(ids);
        self
    }

    /// Restrict the scope to the given cost centers.
    #[must_use]
    pub fn with_cost_centers(mut self, ids: impl IntoIterator<Item = CostCenterId>) -> Self {
        self.cost_center_ids.extend(ids);
        self
    }

    /// Restrict the scope to the given engineers.
    #[must_use]
    pub fn with_engineers(mut self, ids: impl IntoIterator<Item = EngineerId>) -> Self {
        self.engineer_ids.extend(ids);
        self
    }

    /// Returns true if the date falls inside the range.
    #[must_use]
    pub fn covers_date(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Returns true if an entry at these coordinates is inside the scope.
    #[must_use]
    pub fn covers(&self, coords: &EntryCoordinates) -> bool {
        self.covers_date(coords.date)
            && admits(&self.project_ids, &coords.project_id)
            && admits(&self.cost_center_ids, &coords.cost_center_id)
            && admits(&self.engineer_ids, &coords.engineer_id)
    }

    /// Check that `self` lies within `parent`.
    ///
    /// Returns the first dimension where `self` reaches outside `parent`, or
    /// `None` if it is fully contained. An empty id set on `self` inherits the
    /// parent's set and is always contained.
    #[must_use]
    pub fn violation_within(&self, parent: &ClosureScope) -> Option<ScopeDimension> {
        if self.start_date < parent.start_date || self.end_date > parent.end_date {
            return Some(ScopeDimension::DateRange);
        }
        if !subset_of(&self.project_ids, &parent.project_ids) {
            return Some(ScopeDimension::Projects);
        }
        if !subset_of(&self.cost_center_ids, &parent.cost_center_ids) {
            return Some(ScopeDimension::CostCenters);
        }
        if !subset_of(&self.engineer_ids, &parent.engineer_ids) {
            return Some(ScopeDimension::Engineers);
        }
        None
    }

    /// Canonical text encoding of the scope.
    ///
    /// Absent filters are omitted, ids appear in sorted order and dates are
    /// ISO `YYYY-MM-DD`.
    #[must_use]
    pub fn canonical_form(&self) -> String {
        let mut lines = vec![
            CANONICAL_VERSION.to_string(),
            format!("start={}", self.start_date.format("%Y-%m-%d")),
            format!("end={}", self.end_date.format("%Y-%m-%d")),
        ];
        lines.extend(self.project_ids.iter().map(|id| format!("project={id}")));
        lines.extend(
            self.cost_center_ids
                .iter()
                .map(|id| format!("cost_center={id}")),
        );
        lines.extend(self.engineer_ids.iter().map(|id| format!("engineer={id}")));
        lines.join("\n")
    }

    /// Deterministic fingerprint of the scope.
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        let mut hasher = Sha256::new();
        hasher.update(self.canonical_form().as_bytes());
        Fingerprint(format!("{:x}", hasher.finalize()))
    }
}

fn admits<T: Ord>(set: &BTreeSet<T>, id: &T) -> bool {
    set.is_empty() || set.contains(id)
}

fn subset_of<T: Ord>(child: &BTreeSet<T>, parent: &BTreeSet<T>) -> bool {
    child.is_empty() || parent.is_empty() || child.is_subset(parent)
}

/// Hex-encoded SHA-256 of a scope's canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap a fingerprint loaded from storage.
    #[must_use]
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// The hex string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
