//! Closure persistence seam.

use chrono::NaiveDate;
use ziklo_shared::types::ClosureId;

use super::error::ClosureError;
use super::scope::Fingerprint;
use super::types::ExportClosure;

/// Repository trait for closure persistence.
///
/// This trait is implemented by the db crate. Every write replaces the whole
/// record in a single statement, so readers never see half-applied exceptions.
pub trait ClosureStore: Send + Sync {
    /// Find a closure by ID.
    fn find_by_id(
        &self,
        id: ClosureId,
    ) -> impl std::future::Future<Output = Result<Option<ExportClosure>, ClosureError>> + Send;

    /// Find the closure for a scope fingerprint.
    fn find_by_fingerprint(
        &self,
        fingerprint: &Fingerprint,
    ) -> impl std::future::Future<Output = Result<Option<ExportClosure>, ClosureError>> + Send;

    /// Insert a new closure.
    ///
    /// Fails with `ConcurrentModification` if the fingerprint already exists.
    fn insert(
        &self,
        closure: &ExportClosure,
    ) -> impl std::future::Future<Output = Result<(), ClosureError>> + Send;

    /// Replace a closure if its stored version still equals `expected_version`.
    ///
    /// Fails with `ConcurrentModification` if another writer got there first.
    fn update(
        &self,
        closure: &ExportClosure,
        expected_version: i64,
    ) -> impl std::future::Future<Output = Result<(), ClosureError>> + Send;

    /// All closures whose date range includes `date`, whatever their status.
    fn covering(
        &self,
        date: NaiveDate,
    ) -> impl std::future::Future<Output = Result<Vec<ExportClosure>, ClosureError>> + Send;

    /// All closures, newest first.
    fn list(&self) -> impl std::future::Future<Output = Result<Vec<ExportClosure>, ClosureError>> + Send;
}
