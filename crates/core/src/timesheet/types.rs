//! Time entry types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ziklo_shared::types::{ConceptId, CostCenterId, EngineerId, ProjectId, TimeEntryId, UserId};

use crate::closure::EntryCoordinates;

/// Hours logged by an engineer on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEntry {
    /// Entry ID.
    pub id: TimeEntryId,
    /// Calendar date in the business timezone.
    pub date: NaiveDate,
    /// Project.
    pub project_id: ProjectId,
    /// Cost center.
    pub cost_center_id: CostCenterId,
    /// Engineer.
    pub engineer_id: EngineerId,
    /// Billing concept.
    pub concept_id: ConceptId,
    /// Logged hours, always positive.
    pub hours: Decimal,
    /// Free-text notes.
    pub notes: String,
    /// Who logged the entry.
    pub created_by: Option<UserId>,
    /// Set once the entry is changed under a reopened closure.
    pub post_export_adjustment: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TimeEntry {
    /// The coordinates closures are matched against.
    #[must_use]
    pub fn coordinates(&self) -> EntryCoordinates {
        EntryCoordinates {
            date: self.date,
            project_id: self.project_id,
            cost_center_id: self.cost_center_id,
            engineer_id: self.engineer_id,
        }
    }
}

/// Unvalidated input for creating or replacing an entry.
#[derive(Debug, Clone)]
pub struct TimeEntryInput {
    /// `YYYY-MM-DD` or an RFC 3339 timestamp.
    pub date: String,
    /// Project.
    pub project_id: ProjectId,
    /// Cost center.
    pub cost_center_id: CostCenterId,
    /// Engineer.
    pub engineer_id: EngineerId,
    /// Billing concept.
    pub concept_id: ConceptId,
    /// Logged hours.
    pub hours: Decimal,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Who is logging the entry.
    pub created_by: Option<UserId>,
}

/// Filter for listing entries. Unset fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeEntryFilter {
    /// Earliest date (inclusive).
    pub start_date: Option<NaiveDate>,
    /// Latest date (inclusive).
    pub end_date: Option<NaiveDate>,
    /// Only this project.
    pub project_id: Option<ProjectId>,
    /// Only this engineer.
    pub engineer_id: Option<EngineerId>,
}

impl TimeEntryFilter {
    /// Returns true if the entry passes the filter.
    #[must_use]
    pub fn matches(&self, entry: &TimeEntry) -> bool {
        self.start_date.is_none_or(|d| entry.date >= d)
            && self.end_date.is_none_or(|d| entry.date <= d)
            && self.project_id.is_none_or(|p| entry.project_id == p)
            && self.engineer_id.is_none_or(|e| entry.engineer_id == e)
    }
}
