//! Time entry persistence seam.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use ziklo_shared::types::{EngineerId, TimeEntryId};

use super::error::TimesheetError;
use super::types::{TimeEntry, TimeEntryFilter};
use crate::closure::ClosureScope;

/// Repository trait for time entry persistence.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait TimeEntryStore: Send + Sync {
    /// Find an entry by ID.
    fn find_by_id(
        &self,
        id: TimeEntryId,
    ) -> impl std::future::Future<Output = Result<Option<TimeEntry>, TimesheetError>> + Send;

    /// Insert a new entry.
    fn insert(
        &self,
        entry: &TimeEntry,
    ) -> impl std::future::Future<Output = Result<(), TimesheetError>> + Send;

    /// Replace an existing entry. Returns false if it no longer exists.
    fn update(
        &self,
        entry: &TimeEntry,
    ) -> impl std::future::Future<Output = Result<bool, TimesheetError>> + Send;

    /// Delete an entry. Returns false if it did not exist.
    fn delete(
        &self,
        id: TimeEntryId,
    ) -> impl std::future::Future<Output = Result<bool, TimesheetError>> + Send;

    /// List entries matching a filter, ordered by date then id.
    fn list(
        &self,
        filter: &TimeEntryFilter,
    ) -> impl std::future::Future<Output = Result<Vec<TimeEntry>, TimesheetError>> + Send;

    /// All entries inside a closure scope, ordered by date then id.
    fn in_scope(
        &self,
        scope: &ClosureScope,
    ) -> impl std::future::Future<Output = Result<Vec<TimeEntry>, TimesheetError>> + Send;

    /// Sum of an engineer's hours on a date, optionally ignoring one entry.
    fn hours_logged(
        &self,
        engineer_id: EngineerId,
        date: NaiveDate,
        excluding: Option<TimeEntryId>,
    ) -> impl std::future::Future<Output = Result<Decimal, TimesheetError>> + Send;
}
