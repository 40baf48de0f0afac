//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes under `/api`
//! - The `{success, data}` / `{success, error, message}` response envelopes
//! - Request tracing, request ids, CORS and request timeouts

pub mod error;
pub mod response;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::HeaderName;
use sea_orm::DatabaseConnection;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use ziklo_core::closure::ClosureManager;
use ziklo_core::export::{CsvRenderer, ExportRenderer};
use ziklo_core::storage::StorageService;
use ziklo_core::timesheet::{TimesheetRules, TimesheetService};
use ziklo_db::{AuditRepository, CatalogRepository, ClosureRepository, TimeEntryRepository};

pub use error::ApiError;

/// Closure manager wired to the database repositories.
pub type Closures = ClosureManager<ClosureRepository, TimeEntryRepository>;

/// Timesheet service wired to the database repositories.
pub type Timesheet = TimesheetService<ClosureRepository, TimeEntryRepository>;

/// Headers carrying export metadata alongside the artifact body.
pub const EXPORT_HEADERS: [&str; 3] = ["x-closure-id", "x-record-count", "x-closure-revision"];

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Export closures: upsert, reopen and the mutation gate.
    pub closures: Arc<Closures>,
    /// Gated time entry writes.
    pub timesheet: Arc<Timesheet>,
    /// Master data.
    pub catalog: CatalogRepository,
    /// Audit trail.
    pub audit: AuditRepository,
    /// Upper bound for a single request.
    pub request_timeout: Duration,
}

impl AppState {
    /// Wires repositories, services and the default CSV renderer.
    #[must_use]
    pub fn new(db: DatabaseConnection, storage: StorageService, rules: TimesheetRules) -> Self {
        Self::with_renderer(db, storage, rules, Arc::new(CsvRenderer))
    }

    /// Wires the state with a custom export renderer.
    #[must_use]
    pub fn with_renderer(
        db: DatabaseConnection,
        storage: StorageService,
        rules: TimesheetRules,
        renderer: Arc<dyn ExportRenderer>,
    ) -> Self {
        let closure_repo = Arc::new(ClosureRepository::new(db.clone()));
        let entry_repo = Arc::new(TimeEntryRepository::new(db.clone()));
        let closures = Arc::new(ClosureManager::new(
            closure_repo,
            Arc::clone(&entry_repo),
            Arc::new(storage),
            renderer,
        ));
        let timesheet = Arc::new(TimesheetService::new(
            Arc::clone(&closures),
            entry_repo,
            rules,
        ));

        Self {
            closures,
            timesheet,
            catalog: CatalogRepository::new(db.clone()),
            audit: AuditRepository::new(db),
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Overrides the request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    let exposed = EXPORT_HEADERS.map(HeaderName::from_static);

    Router::new()
        .nest("/api", routes::api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TimeoutLayer::new(state.request_timeout)),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers(exposed),
        )
        .with_state(state)
}
