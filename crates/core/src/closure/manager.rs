//! Export closure manager.
//!
//! Owns the upsert of closures by fingerprint, reopen requests and gate
//! lookups. Exports of the same scope are serialized in-process by a
//! per-fingerprint lock; across processes the store's unique fingerprint and
//! version check reject the losing writer, which is retried once. Every
//! export attempt writes its artifact under its own key, so cleanup after a
//! lost race never touches an artifact another writer committed.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;
use ziklo_shared::types::ClosureId;

use super::error::ClosureError;
use super::gate::{self, GateDecision, MutationKind};
use super::lifecycle::ClosureLifecycle;
use super::scope::{EntryCoordinates, Fingerprint};
use super::store::ClosureStore;
use super::types::{ExportClosure, ExportRequest, ReopenRequest};
use crate::export::ExportRenderer;
use crate::storage::StorageService;
use crate::timesheet::TimeEntryStore;

/// Result of an export.
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    /// The closure after this export.
    pub closure: ExportClosure,
    /// Rendered artifact.
    pub artifact: Vec<u8>,
    /// MIME type of the artifact.
    pub content_type: &'static str,
    /// True if this export created the closure.
    pub created: bool,
}

/// Export closure manager.
pub struct ClosureManager<C: ClosureStore, T: TimeEntryStore> {
    closures: Arc<C>,
    entries: Arc<T>,
    storage: Arc<StorageService>,
    renderer: Arc<dyn ExportRenderer>,
    locks: DashMap<Fingerprint, Arc<Mutex<()>>>,
}

impl<C: ClosureStore, T: TimeEntryStore> ClosureManager<C, T> {
    /// Create a new closure manager.
    #[must_use]
    pub fn new(
        closures: Arc<C>,
        entries: Arc<T>,
        storage: Arc<StorageService>,
        renderer: Arc<dyn ExportRenderer>,
    ) -> Self {
        Self {
            closures,
            entries,
            storage,
            renderer,
            locks: DashMap::new(),
        }
    }

    fn lock_for(&self, fingerprint: &Fingerprint) -> Arc<Mutex<()>> {
        self.locks
            .entry(fingerprint.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop the lock entry once no other task holds or waits on it.
    fn release(&self, fingerprint: &Fingerprint, lock: Arc<Mutex<()>>) {
        drop(lock);
        self.locks
            .remove_if(fingerprint, |_, held| Arc::strong_count(held) == 1);
    }

    /// Export a scope, creating its closure or revising the existing one.
    ///
    /// The artifact is written before the closure record is committed, so a
    /// committed revision always has its artifact.
    ///
    /// # Errors
    ///
    /// - `ConcurrentModification` if the upsert lost a race twice
    /// - `Render`, `Storage` or `Repository` on collaborator failures
    pub async fn export(&self, request: ExportRequest) -> Result<ExportOutcome, ClosureError> {
        let fingerprint = request.scope.fingerprint();
        let lock = self.lock_for(&fingerprint);
        let result = {
            let _guard = lock.lock().await;
            match self.try_export(&request, &fingerprint).await {
                Err(e) if e.is_retryable() => {
                    warn!(fingerprint = %fingerprint, "Export lost a concurrent upsert, retrying");
                    self.try_export(&request, &fingerprint).await
                }
                other => other,
            }
        };
        self.release(&fingerprint, lock);
        result
    }

    async fn try_export(
        &self,
        request: &ExportRequest,
        fingerprint: &Fingerprint,
    ) -> Result<ExportOutcome, ClosureError> {
        let existing = self.closures.find_by_fingerprint(fingerprint).await?;
        let now = Utc::now();
        let mut closure = match &existing {
            Some(current) => ClosureLifecycle::reexport(current, request.requested_by, now),
            None => ClosureLifecycle::open(request.scope.clone(), request.requested_by, now),
        };

        let entries = self
            .entries
            .in_scope(&closure.scope)
            .await
            .map_err(|e| ClosureError::Repository(e.to_string()))?;
        let artifact = self.renderer.render(&closure, &entries)?;
        let key = StorageService::export_key(
            closure.id,
            closure.revision,
            Uuid::now_v7(),
            self.renderer.extension(),
        );
        self.storage.write(&key, artifact.clone()).await?;

        closure.record_count = i64::try_from(entries.len()).unwrap_or(i64::MAX);
        closure.artifact_key = Some(key.clone());

        let committed = match &existing {
            Some(current) => self.closures.update(&closure, current.version).await,
            None => self.closures.insert(&closure).await,
        };
        if let Err(e) = committed {
            if let Err(cleanup) = self.storage.delete(&key).await {
                warn!(key = %key, error = %cleanup, "Failed to delete orphaned export artifact");
            }
            return Err(e);
        }

        info!(
            closure_id = %closure.id,
            fingerprint = %fingerprint,
            revision = closure.revision,
            record_count = closure.record_count,
            created = existing.is_none(),
            "Export closure committed"
        );

        Ok(ExportOutcome {
            closure,
            artifact,
            content_type: self.renderer.content_type(),
            created: existing.is_none(),
        })
    }

    /// Reopen a closure totally or partially.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the closure does not exist
    /// - `ExceptionOutsideScope` or `InvalidTransition` from the lifecycle
    /// - `ConcurrentModification` if the write lost a race twice
    pub async fn reopen(
        &self,
        id: ClosureId,
        request: ReopenRequest,
    ) -> Result<ExportClosure, ClosureError> {
        let current = self.get(id).await?;
        let lock = self.lock_for(&current.fingerprint);
        let result = {
            let _guard = lock.lock().await;
            match self.try_reopen(id, &request).await {
                Err(e) if e.is_retryable() => {
                    warn!(closure_id = %id, "Reopen lost a concurrent update, retrying");
                    self.try_reopen(id, &request).await
                }
                other => other,
            }
        };
        self.release(&current.fingerprint, lock);
        result
    }

    async fn try_reopen(
        &self,
        id: ClosureId,
        request: &ReopenRequest,
    ) -> Result<ExportClosure, ClosureError> {
        let current = self.get(id).await?;
        let next = ClosureLifecycle::reopen(&current, request, Utc::now())?;
        if next.version == current.version {
            debug!(closure_id = %id, "Reopen left closure unchanged");
            return Ok(next);
        }

        self.closures.update(&next, current.version).await?;
        info!(
            closure_id = %id,
            status = %next.status,
            exceptions = next.exceptions.len(),
            "Export closure reopened"
        );
        Ok(next)
    }

    /// Evaluate a mutation against every closure covering the entry.
    ///
    /// # Errors
    ///
    /// Returns `Repository` if closures cannot be loaded.
    pub async fn check_gate(
        &self,
        coords: &EntryCoordinates,
        operation: MutationKind,
    ) -> Result<GateDecision, ClosureError> {
        let closures = self.closures.covering(coords.date).await?;
        let decision = gate::evaluate(&closures, coords, operation);
        if let GateDecision::Block(reason) = &decision {
            debug!(
                closure_id = %reason.closure_id,
                operation = %operation,
                date = %coords.date,
                "Mutation blocked by export closure"
            );
        }
        Ok(decision)
    }

    /// Get a closure by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the closure does not exist.
    pub async fn get(&self, id: ClosureId) -> Result<ExportClosure, ClosureError> {
        self.closures
            .find_by_id(id)
            .await?
            .ok_or(ClosureError::NotFound(id))
    }

    /// All closures, newest first.
    ///
    /// # Errors
    ///
    /// Returns `Repository` if closures cannot be loaded.
    pub async fn list(&self) -> Result<Vec<ExportClosure>, ClosureError> {
        self.closures.list().await
    }

    /// The latest artifact of a closure.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `ArtifactMissing` if there is nothing to read.
    pub async fn artifact(&self, id: ClosureId) -> Result<(ExportClosure, Vec<u8>), ClosureError> {
        let closure = self.get(id).await?;
        let key = closure
            .artifact_key
            .clone()
            .ok_or(ClosureError::ArtifactMissing(id))?;
        let bytes = self.storage.read(&key).await?;
        Ok((closure, bytes))
    }

    /// MIME type of rendered artifacts.
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        self.renderer.content_type()
    }

    /// File extension of rendered artifacts.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        self.renderer.extension()
    }
}
