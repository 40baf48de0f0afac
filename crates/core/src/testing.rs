//! In-memory stores for unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::Barrier;
use ziklo_shared::types::{
    ClosureId, ConceptId, CostCenterId, EngineerId, ProjectId, TimeEntryId,
};

use crate::closure::{ClosureError, ClosureScope, ClosureStore, ExportClosure, Fingerprint};
use crate::timesheet::{TimeEntry, TimeEntryFilter, TimeEntryStore, TimesheetError};

pub(crate) fn sample_entry(date: NaiveDate, project_id: ProjectId) -> TimeEntry {
    let now = Utc::now();
    TimeEntry {
        id: TimeEntryId::new(),
        date,
        project_id,
        cost_center_id: CostCenterId::new(),
        engineer_id: EngineerId::new(),
        concept_id: ConceptId::new(),
        hours: dec!(2),
        notes: String::new(),
        created_by: None,
        post_export_adjustment: false,
        created_at: now,
        updated_at: now,
    }
}

#[derive(Default)]
pub(crate) struct MemoryClosureStore {
    closures: Mutex<HashMap<ClosureId, ExportClosure>>,
    failures_left: Mutex<usize>,
    rejected: Mutex<Vec<String>>,
    lookup_barrier: Mutex<Option<(Arc<Barrier>, usize)>>,
}

impl MemoryClosureStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.closures.lock().unwrap().len()
    }

    /// Make the next `n` writes fail as if another writer won.
    pub(crate) fn fail_next_writes(&self, n: usize) {
        *self.failures_left.lock().unwrap() = n;
    }

    /// Artifact keys of writes rejected by `fail_next_writes`.
    pub(crate) fn rejected_keys(&self) -> Vec<String> {
        self.rejected.lock().unwrap().clone()
    }

    /// Make the next `n` fingerprint lookups wait for each other, so that
    /// `n` writers all read the same closure before any of them commits.
    pub(crate) fn align_next_lookups(&self, n: usize) {
        *self.lookup_barrier.lock().unwrap() = Some((Arc::new(Barrier::new(n)), n));
    }

    fn injected_failure(&self, closure: &ExportClosure) -> bool {
        let mut left = self.failures_left.lock().unwrap();
        if *left == 0 {
            return false;
        }
        *left -= 1;
        if let Some(key) = &closure.artifact_key {
            self.rejected.lock().unwrap().push(key.clone());
        }
        true
    }
}

impl ClosureStore for MemoryClosureStore {
    async fn find_by_id(&self, id: ClosureId) -> Result<Option<ExportClosure>, ClosureError> {
        Ok(self.closures.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_fingerprint(
        &self,
        fingerprint: &Fingerprint,
    ) -> Result<Option<ExportClosure>, ClosureError> {
        let barrier = {
            let mut pending = self.lookup_barrier.lock().unwrap();
            match pending.as_mut() {
                Some((barrier, left)) if *left > 0 => {
                    *left -= 1;
                    Some(barrier.clone())
                }
                _ => None,
            }
        };
        if let Some(barrier) = barrier {
            barrier.wait().await;
        }
        Ok(self
            .closures
            .lock()
            .unwrap()
            .values()
            .find(|c| &c.fingerprint == fingerprint)
            .cloned())
    }

    async fn insert(&self, closure: &ExportClosure) -> Result<(), ClosureError> {
        if self.injected_failure(closure) {
            return Err(ClosureError::ConcurrentModification);
        }
        let mut closures = self.closures.lock().unwrap();
        if closures.values().any(|c| c.fingerprint == closure.fingerprint) {
            return Err(ClosureError::ConcurrentModification);
        }
        closures.insert(closure.id, closure.clone());
        Ok(())
    }

    async fn update(
        &self,
        closure: &ExportClosure,
        expected_version: i64,
    ) -> Result<(), ClosureError> {
        if self.injected_failure(closure) {
            return Err(ClosureError::ConcurrentModification);
        }
        let mut closures = self.closures.lock().unwrap();
        match closures.get(&closure.id) {
            Some(stored) if stored.version == expected_version => {
                closures.insert(closure.id, closure.clone());
                Ok(())
            }
            _ => Err(ClosureError::ConcurrentModification),
        }
    }

    async fn covering(&self, date: NaiveDate) -> Result<Vec<ExportClosure>, ClosureError> {
        Ok(self
            .closures
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.scope.covers_date(date))
            .cloned()
            .collect())
    }

    async fn list(&self) -> Result<Vec<ExportClosure>, ClosureError> {
        let mut all: Vec<ExportClosure> = self.closures.lock().unwrap().values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }
}

#[derive(Default)]
pub(crate) struct MemoryTimeEntryStore {
    entries: Mutex<HashMap<TimeEntryId, TimeEntry>>,
}

impl MemoryTimeEntryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn put(&self, entry: TimeEntry) {
        self.entries.lock().unwrap().insert(entry.id, entry);
    }

    fn sorted(&self, keep: impl Fn(&TimeEntry) -> bool) -> Vec<TimeEntry> {
        let mut out: Vec<TimeEntry> = self
            .entries
            .lock()
            .unwrap()
            .values()
            .filter(|e| keep(e))
            .cloned()
            .collect();
        out.sort_by_key(|e| (e.date, e.id));
        out
    }
}

impl TimeEntryStore for MemoryTimeEntryStore {
    async fn find_by_id(&self, id: TimeEntryId) -> Result<Option<TimeEntry>, TimesheetError> {
        Ok(self.entries.lock().unwrap().get(&id).cloned())
    }

    async fn insert(&self, entry: &TimeEntry) -> Result<(), TimesheetError> {
        self.put(entry.clone());
        Ok(())
    }

    async fn update(&self, entry: &TimeEntry) -> Result<bool, TimesheetError> {
        let mut entries = self.entries.lock().unwrap();
        if !entries.contains_key(&entry.id) {
            return Ok(false);
        }
        entries.insert(entry.id, entry.clone());
        Ok(true)
    }

    async fn delete(&self, id: TimeEntryId) -> Result<bool, TimesheetError> {
        Ok(self.entries.lock().unwrap().remove(&id).is_some())
    }

    async fn list(&self, filter: &TimeEntryFilter) -> Result<Vec<TimeEntry>, TimesheetError> {
        Ok(self.sorted(|e| filter.matches(e)))
    }

    async fn in_scope(&self, scope: &ClosureScope) -> Result<Vec<TimeEntry>, TimesheetError> {
        Ok(self.sorted(|e| scope.covers(&e.coordinates())))
    }

    async fn hours_logged(
        &self,
        engineer_id: EngineerId,
        date: NaiveDate,
        excluding: Option<TimeEntryId>,
    ) -> Result<Decimal, TimesheetError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .values()
            .filter(|e| e.engineer_id == engineer_id && e.date == date && Some(e.id) != excluding)
            .map(|e| e.hours)
            .sum())
    }
}
