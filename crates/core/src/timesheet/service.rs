//! Time entry service.
//!
//! Every write runs the same checks in order: date, hours, closure gate,
//! daily limit, then persistence.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use ziklo_shared::types::TimeEntryId;

use super::error::TimesheetError;
use super::rules::TimesheetRules;
use super::store::TimeEntryStore;
use super::types::{TimeEntry, TimeEntryFilter, TimeEntryInput};
use crate::closure::{ClosureManager, ClosureStore, EntryCoordinates, GateDecision, MutationKind};

/// Time entry service.
pub struct TimesheetService<C: ClosureStore, T: TimeEntryStore> {
    closures: Arc<ClosureManager<C, T>>,
    entries: Arc<T>,
    rules: TimesheetRules,
}

impl<C: ClosureStore, T: TimeEntryStore> TimesheetService<C, T> {
    /// Create a new timesheet service.
    #[must_use]
    pub fn new(closures: Arc<ClosureManager<C, T>>, entries: Arc<T>, rules: TimesheetRules) -> Self {
        Self {
            closures,
            entries,
            rules,
        }
    }

    /// The rules this service enforces.
    #[must_use]
    pub fn rules(&self) -> &TimesheetRules {
        &self.rules
    }

    /// Log a new entry.
    ///
    /// # Errors
    ///
    /// - `InvalidDate` / `InvalidHours` on malformed input
    /// - `Blocked` if a closure freezes the entry
    /// - `DailyLimitExceeded` if the engineer would exceed the limit
    pub async fn create(&self, input: TimeEntryInput) -> Result<TimeEntry, TimesheetError> {
        let date = self.rules.parse_date(&input.date)?;
        self.rules.validate_hours(input.hours)?;

        let coords = EntryCoordinates {
            date,
            project_id: input.project_id,
            cost_center_id: input.cost_center_id,
            engineer_id: input.engineer_id,
        };
        let decision = self
            .closures
            .check_gate(&coords, MutationKind::Create)
            .await?;
        let adjustment = admit(decision)?;

        let logged = self
            .entries
            .hours_logged(input.engineer_id, date, None)
            .await?;
        self.rules.check_daily_limit(logged, input.hours)?;

        let now = Utc::now();
        let entry = TimeEntry {
            id: TimeEntryId::new(),
            date,
            project_id: input.project_id,
            cost_center_id: input.cost_center_id,
            engineer_id: input.engineer_id,
            concept_id: input.concept_id,
            hours: input.hours,
            notes: input.notes.unwrap_or_default(),
            created_by: input.created_by,
            post_export_adjustment: adjustment,
            created_at: now,
            updated_at: now,
        };
        self.entries.insert(&entry).await?;

        info!(
            entry_id = %entry.id,
            engineer_id = %entry.engineer_id,
            date = %entry.date,
            hours = %entry.hours,
            post_export_adjustment = entry.post_export_adjustment,
            "Time entry created"
        );
        Ok(entry)
    }

    /// Replace an existing entry.
    ///
    /// Both the stored and the new coordinates pass through the gate.
    /// `post_export_adjustment` never goes from true back to false.
    ///
    /// # Errors
    ///
    /// As [`Self::create`], plus `NotFound` if the entry does not exist.
    pub async fn update(
        &self,
        id: TimeEntryId,
        input: TimeEntryInput,
    ) -> Result<TimeEntry, TimesheetError> {
        let current = self.get(id).await?;
        let date = self.rules.parse_date(&input.date)?;
        self.rules.validate_hours(input.hours)?;

        let target = EntryCoordinates {
            date,
            project_id: input.project_id,
            cost_center_id: input.cost_center_id,
            engineer_id: input.engineer_id,
        };
        let from = self
            .closures
            .check_gate(&current.coordinates(), MutationKind::Update)
            .await?;
        let to = self
            .closures
            .check_gate(&target, MutationKind::Update)
            .await?;
        let adjustment = admit(from.and(to))?;

        let logged = self
            .entries
            .hours_logged(input.engineer_id, date, Some(id))
            .await?;
        self.rules.check_daily_limit(logged, input.hours)?;

        let entry = TimeEntry {
            id,
            date,
            project_id: input.project_id,
            cost_center_id: input.cost_center_id,
            engineer_id: input.engineer_id,
            concept_id: input.concept_id,
            hours: input.hours,
            notes: input.notes.unwrap_or_default(),
            created_by: current.created_by,
            post_export_adjustment: current.post_export_adjustment || adjustment,
            created_at: current.created_at,
            updated_at: Utc::now(),
        };
        if !self.entries.update(&entry).await? {
            return Err(TimesheetError::NotFound(id));
        }

        info!(
            entry_id = %id,
            date = %entry.date,
            hours = %entry.hours,
            post_export_adjustment = entry.post_export_adjustment,
            "Time entry updated"
        );
        Ok(entry)
    }

    /// Delete an entry, returning what was removed.
    ///
    /// # Errors
    ///
    /// `NotFound` if the entry does not exist, `Blocked` if a closure freezes it.
    pub async fn delete(&self, id: TimeEntryId) -> Result<TimeEntry, TimesheetError> {
        let current = self.get(id).await?;
        let decision = self
            .closures
            .check_gate(&current.coordinates(), MutationKind::Delete)
            .await?;
        admit(decision)?;

        if !self.entries.delete(id).await? {
            return Err(TimesheetError::NotFound(id));
        }
        info!(entry_id = %id, date = %current.date, "Time entry deleted");
        Ok(current)
    }

    /// Get an entry by ID.
    ///
    /// # Errors
    ///
    /// `NotFound` if the entry does not exist.
    pub async fn get(&self, id: TimeEntryId) -> Result<TimeEntry, TimesheetError> {
        self.entries
            .find_by_id(id)
            .await?
            .ok_or(TimesheetError::NotFound(id))
    }

    /// List entries matching a filter.
    ///
    /// # Errors
    ///
    /// `Repository` if entries cannot be loaded.
    pub async fn list(&self, filter: &TimeEntryFilter) -> Result<Vec<TimeEntry>, TimesheetError> {
        self.entries.list(filter).await
    }
}

fn admit(decision: GateDecision) -> Result<bool, TimesheetError> {
    match decision {
        GateDecision::Allow {
            post_export_adjustment,
        } => Ok(post_export_adjustment),
        GateDecision::Block(reason) => Err(TimesheetError::Blocked(reason)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::closure::{
        ClosureError, ClosureScope, ExceptionInput, ExportRequest, ReopenRequest,
    };
    use crate::export::CsvRenderer;
    use crate::storage::StorageService;
    use crate::testing::{MemoryClosureStore, MemoryTimeEntryStore};
    use chrono::NaiveDate;
    use chrono_tz::America::Bogota;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use ziklo_shared::types::{ClosureId, ConceptId, CostCenterId, EngineerId, ProjectId};

    struct Fixture {
        service: TimesheetService<MemoryClosureStore, MemoryTimeEntryStore>,
        closures: Arc<ClosureManager<MemoryClosureStore, MemoryTimeEntryStore>>,
        project: ProjectId,
        cost_center: CostCenterId,
        engineer: EngineerId,
    }

    fn fixture() -> Fixture {
        let entries = Arc::new(MemoryTimeEntryStore::new());
        let closures = Arc::new(ClosureManager::new(
            Arc::new(MemoryClosureStore::new()),
            entries.clone(),
            Arc::new(StorageService::in_memory().expect("memory storage")),
            Arc::new(CsvRenderer),
        ));
        let service = TimesheetService::new(
            closures.clone(),
            entries,
            TimesheetRules::new(Bogota, dec!(8)),
        );
        Fixture {
            service,
            closures,
            project: ProjectId::new(),
            cost_center: CostCenterId::new(),
            engineer: EngineerId::new(),
        }
    }

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).expect("valid date")
    }

    impl Fixture {
        fn input(&self, date: &str, hours: Decimal) -> TimeEntryInput {
            TimeEntryInput {
                date: date.to_string(),
                project_id: self.project,
                cost_center_id: self.cost_center,
                engineer_id: self.engineer,
                concept_id: ConceptId::new(),
                hours,
                notes: Some("work".to_string()),
                created_by: None,
            }
        }

        async fn close_december(&self) -> ClosureId {
            let scope = ClosureScope::new(date(12, 1), date(12, 31))
                .expect("valid")
                .with_projects([self.project]);
            self.closures
                .export(ExportRequest {
                    scope,
                    requested_by: None,
                })
                .await
                .expect("export")
                .closure
                .id
        }

        async fn reopen(&self, id: ClosureId, request: ReopenRequest) {
            self.closures.reopen(id, request).await.expect("reopen");
        }
    }

    fn partial_mid_month() -> ReopenRequest {
        ReopenRequest::parse(
            "partial",
            vec![ExceptionInput {
                scope: ClosureScope::new(date(12, 10), date(12, 20)).expect("valid"),
                note: "adjust".to_string(),
            }],
            None,
        )
        .expect("valid")
    }

    #[tokio::test]
    async fn test_create_without_closure_is_plain() {
        let f = fixture();
        let entry = f
            .service
            .create(f.input("2024-12-15", dec!(4)))
            .await
            .expect("create");
        assert!(!entry.post_export_adjustment);
        assert_eq!(entry.date, date(12, 15));
    }

    #[tokio::test]
    async fn test_closure_blocks_create_update_delete() {
        let f = fixture();
        let entry = f
            .service
            .create(f.input("2024-12-15", dec!(4)))
            .await
            .expect("create");
        let closure_id = f.close_december().await;

        let err = f
            .service
            .create(f.input("2024-12-16", dec!(1)))
            .await
            .unwrap_err();
        assert_eq!(err.http_status_code(), 409);
        assert_eq!(
            err.block_reason().map(|r| r.closure_id),
            Some(closure_id)
        );
        assert!(err.to_string().contains("closure"));

        let err = f
            .service
            .update(entry.id, f.input("2024-12-15", dec!(5)))
            .await
            .unwrap_err();
        assert!(matches!(err, TimesheetError::Blocked(_)));

        let err = f.service.delete(entry.id).await.unwrap_err();
        assert!(matches!(err, TimesheetError::Blocked(_)));
    }

    #[tokio::test]
    async fn test_moving_entry_out_of_closed_scope_is_blocked() {
        let f = fixture();
        let entry = f
            .service
            .create(f.input("2024-12-15", dec!(4)))
            .await
            .expect("create");
        f.close_december().await;

        let err = f
            .service
            .update(entry.id, f.input("2025-01-15", dec!(4)))
            .await
            .unwrap_err();
        assert!(matches!(err, TimesheetError::Blocked(_)));
    }

    #[tokio::test]
    async fn test_total_reopen_tags_adjustment() {
        let f = fixture();
        let id = f.close_december().await;
        f.reopen(id, ReopenRequest::parse("total", vec![], None).expect("valid"))
            .await;

        let entry = f
            .service
            .create(f.input("2024-12-15", dec!(3)))
            .await
            .expect("create");
        assert!(entry.post_export_adjustment);
    }

    #[tokio::test]
    async fn test_partial_reopen_scoping() {
        let f = fixture();
        let id = f.close_december().await;
        f.reopen(id, partial_mid_month()).await;

        let inside = f
            .service
            .create(f.input("2024-12-15", dec!(3)))
            .await
            .expect("create inside exception");
        assert!(inside.post_export_adjustment);

        let err = f
            .service
            .create(f.input("2024-12-25", dec!(3)))
            .await
            .unwrap_err();
        let reason = err.block_reason().expect("blocked");
        assert_eq!(reason.closure_id, id);
        assert_eq!(reason.exceptions_checked, 1);
    }

    #[tokio::test]
    async fn test_reexport_blocks_again() {
        let f = fixture();
        let id = f.close_december().await;
        f.reopen(id, ReopenRequest::parse("total", vec![], None).expect("valid"))
            .await;
        f.close_december().await;

        let err = f
            .service
            .create(f.input("2024-12-15", dec!(3)))
            .await
            .unwrap_err();
        assert!(matches!(err, TimesheetError::Blocked(_)));
    }

    #[tokio::test]
    async fn test_adjustment_flag_is_sticky() {
        let f = fixture();
        let id = f.close_december().await;
        f.reopen(id, ReopenRequest::parse("total", vec![], None).expect("valid"))
            .await;
        let entry = f
            .service
            .create(f.input("2024-12-15", dec!(3)))
            .await
            .expect("create");

        let moved = f
            .service
            .update(entry.id, f.input("2025-02-01", dec!(3)))
            .await
            .expect("update");
        assert!(moved.post_export_adjustment);

        // Neither date is covered by a closure any more.
        let again = f
            .service
            .update(entry.id, f.input("2025-02-02", dec!(2)))
            .await
            .expect("update");
        assert!(again.post_export_adjustment);
    }

    #[tokio::test]
    async fn test_other_project_passes_through() {
        let f = fixture();
        f.close_december().await;
        let mut input = f.input("2024-12-15", dec!(3));
        input.project_id = ProjectId::new();
        let entry = f.service.create(input).await.expect("create");
        assert!(!entry.post_export_adjustment);
    }

    #[tokio::test]
    async fn test_daily_limit_counts_existing_hours() {
        let f = fixture();
        f.service
            .create(f.input("2024-11-04", dec!(6)))
            .await
            .expect("create");
        let err = f
            .service
            .create(f.input("2024-11-04", dec!(3)))
            .await
            .unwrap_err();
        assert!(matches!(err, TimesheetError::DailyLimitExceeded { .. }));
        assert_eq!(err.http_status_code(), 400);
    }

    #[tokio::test]
    async fn test_update_excludes_own_hours_from_limit() {
        let f = fixture();
        let entry = f
            .service
            .create(f.input("2024-11-04", dec!(6)))
            .await
            .expect("create");
        let updated = f
            .service
            .update(entry.id, f.input("2024-11-04", dec!(8)))
            .await
            .expect("update");
        assert_eq!(updated.hours, dec!(8));
        assert_eq!(updated.created_at, entry.created_at);
    }

    #[tokio::test]
    async fn test_gate_precedes_daily_limit() {
        let f = fixture();
        f.close_december().await;
        let err = f
            .service
            .create(f.input("2024-12-15", dec!(20)))
            .await
            .unwrap_err();
        assert!(matches!(err, TimesheetError::Blocked(_)));
    }

    #[tokio::test]
    async fn test_validation_precedes_gate() {
        let f = fixture();
        f.close_december().await;
        let err = f
            .service
            .create(f.input("not-a-date", dec!(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, TimesheetError::InvalidDate(_)));

        let err = f
            .service
            .create(f.input("2024-12-15", dec!(0)))
            .await
            .unwrap_err();
        assert!(matches!(err, TimesheetError::InvalidHours(_)));
    }

    #[tokio::test]
    async fn test_missing_entry() {
        let f = fixture();
        let err = f.service.delete(TimeEntryId::new()).await.unwrap_err();
        assert!(matches!(err, TimesheetError::NotFound(_)));
        let err = f
            .service
            .update(TimeEntryId::new(), f.input("2024-12-15", dec!(1)))
            .await
            .unwrap_err();
        assert_eq!(err.http_status_code(), 404);
    }

    #[tokio::test]
    async fn test_list_filters_by_range() {
        let f = fixture();
        f.service
            .create(f.input("2024-11-04", dec!(1)))
            .await
            .expect("create");
        f.service
            .create(f.input("2024-11-20", dec!(1)))
            .await
            .expect("create");
        let filter = TimeEntryFilter {
            start_date: Some(date(11, 1)),
            end_date: Some(date(11, 10)),
            ..TimeEntryFilter::default()
        };
        let listed = f.service.list(&filter).await.expect("list");
        assert_eq!(listed.len(), 1);
    }

    #[test]
    fn test_closure_errors_propagate_with_their_code() {
        let err = TimesheetError::from(ClosureError::ConcurrentModification);
        assert_eq!(err.http_status_code(), 503);
        assert_eq!(err.error_code(), "CONCURRENT_MODIFICATION");
    }
}
