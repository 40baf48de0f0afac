//! Time entry routes.
//!
//! Every write goes through `TimesheetService`, which consults the export
//! closures before anything is persisted.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    routing::get,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use ziklo_core::timesheet::{TimeEntry, TimeEntryFilter, TimeEntryInput};
use ziklo_db::{AuditAction, AuditRecord};
use ziklo_shared::types::{
    ConceptId, CostCenterId, EngineerId, ProjectId, TimeEntryId, UserId,
};

use crate::response::{Envelope, ok};
use crate::{ApiError, AppState};

/// Creates the time entry routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/time-entries", get(list_entries).post(create_entry))
        .route(
            "/time-entries/{entry_id}",
            get(get_entry).put(update_entry).delete(delete_entry),
        )
}

// ============================================================================
// Request Types
// ============================================================================

/// Body for creating or replacing a time entry.
#[derive(Debug, Deserialize)]
pub struct TimeEntryRequest {
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
    /// Hours, a JSON number or a decimal string.
    pub hours: Decimal,
    /// Free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Who is logging the entry.
    #[serde(default)]
    pub created_by: Option<UserId>,
}

impl From<TimeEntryRequest> for TimeEntryInput {
    fn from(req: TimeEntryRequest) -> Self {
        Self {
            date: req.date,
            project_id: req.project_id,
            cost_center_id: req.cost_center_id,
            engineer_id: req.engineer_id,
            concept_id: req.concept_id,
            hours: req.hours,
            notes: req.notes,
            created_by: req.created_by,
        }
    }
}

/// Query parameters for listing entries.
#[derive(Debug, Default, Deserialize)]
pub struct ListEntriesQuery {
    /// Earliest date (inclusive).
    pub start_date: Option<String>,
    /// Latest date (inclusive).
    pub end_date: Option<String>,
    /// Only this project.
    pub project_id: Option<ProjectId>,
    /// Only this engineer.
    pub engineer_id: Option<EngineerId>,
}

/// Query parameters for deleting an entry.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteEntryQuery {
    /// Who is deleting the entry.
    pub user_id: Option<UserId>,
}

fn parse_entry_id(raw: &str) -> Result<TimeEntryId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::validation(format!("invalid time entry id '{raw}'")))
}

async fn audit(state: &AppState, action: AuditAction, actor: Option<UserId>, entry: &TimeEntry) {
    state
        .audit
        .record_best_effort(AuditRecord {
            actor_user_id: actor.map(UserId::into_inner),
            action,
            entity: "time_entries",
            entity_id: entry.id.into_inner(),
            payload: super::audit_payload("time_entries", entry),
        })
        .await;
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/time-entries`
async fn list_entries(
    State(state): State<AppState>,
    query: Result<Query<ListEntriesQuery>, QueryRejection>,
) -> Result<Json<Envelope<Vec<TimeEntry>>>, ApiError> {
    let Query(query) = query?;
    let rules = state.timesheet.rules();
    let filter = TimeEntryFilter {
        start_date: query
            .start_date
            .as_deref()
            .map(|d| rules.parse_date(d))
            .transpose()?,
        end_date: query
            .end_date
            .as_deref()
            .map(|d| rules.parse_date(d))
            .transpose()?,
        project_id: query.project_id,
        engineer_id: query.engineer_id,
    };
    Ok(ok(state.timesheet.list(&filter).await?))
}

/// GET `/time-entries/{entry_id}`
async fn get_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
) -> Result<Json<Envelope<TimeEntry>>, ApiError> {
    let id = parse_entry_id(&entry_id)?;
    Ok(ok(state.timesheet.get(id).await?))
}

/// POST `/time-entries`
async fn create_entry(
    State(state): State<AppState>,
    payload: Result<Json<TimeEntryRequest>, JsonRejection>,
) -> Result<Json<Envelope<TimeEntry>>, ApiError> {
    let Json(request) = payload?;
    let entry = state.timesheet.create(request.into()).await?;

    audit(&state, AuditAction::Create, entry.created_by, &entry).await;
    Ok(ok(entry))
}

/// PUT `/time-entries/{entry_id}`
async fn update_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
    payload: Result<Json<TimeEntryRequest>, JsonRejection>,
) -> Result<Json<Envelope<TimeEntry>>, ApiError> {
    let id = parse_entry_id(&entry_id)?;
    let Json(request) = payload?;
    let actor = request.created_by;
    let entry = state.timesheet.update(id, request.into()).await?;

    audit(&state, AuditAction::Update, actor, &entry).await;
    Ok(ok(entry))
}

/// DELETE `/time-entries/{entry_id}`
async fn delete_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
    query: Result<Query<DeleteEntryQuery>, QueryRejection>,
) -> Result<Json<Envelope<TimeEntry>>, ApiError> {
    let id = parse_entry_id(&entry_id)?;
    let Query(query) = query?;
    let entry = state.timesheet.delete(id).await?;

    audit(&state, AuditAction::Delete, query.user_id, &entry).await;
    Ok(ok(entry))
}
