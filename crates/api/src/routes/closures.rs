//! Export and export closure routes.
//!
//! Exporting a scope closes it. The artifact is the response body and the
//! closure metadata travels in `X-Closure-*` headers.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderName, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use ziklo_core::closure::{
    ClosureException, ClosureScope, ClosureStatus, ExceptionInput, ExportClosure, ExportRequest,
    ReopenMode, ReopenRequest,
};
use ziklo_core::timesheet::TimesheetRules;
use ziklo_db::{AuditAction, AuditRecord};
use ziklo_shared::types::{ClosureId, CostCenterId, EngineerId, ProjectId, UserId};

use crate::response::{Envelope, ok};
use crate::{ApiError, AppState};

/// Creates the export closure routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/export-excel", post(export))
        .route("/exports", post(export))
        .route("/export-closures", get(list_closures))
        .route("/export-closures-detailed", get(list_closures_detailed))
        .route("/export-closures/{closure_id}", get(get_closure))
        .route("/export-closures/{closure_id}/artifact", get(get_artifact))
        .route("/export-closures/{closure_id}/reopen", post(reopen_closure))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Body of an export request.
#[derive(Debug, Deserialize)]
pub struct ExportBody {
    /// First date (inclusive).
    pub start_date: String,
    /// Last date (inclusive).
    pub end_date: String,
    /// Restrict to these projects.
    #[serde(default)]
    pub project_ids: Option<Vec<ProjectId>>,
    /// Restrict to these cost centers.
    #[serde(default)]
    pub cost_center_ids: Option<Vec<CostCenterId>>,
    /// Restrict to these engineers.
    #[serde(default)]
    pub engineer_ids: Option<Vec<EngineerId>>,
    /// Who is exporting.
    #[serde(default)]
    pub user_id: Option<UserId>,
}

/// One reopen exception as sent by clients.
#[derive(Debug, Deserialize)]
pub struct ExceptionBody {
    /// First reopened date (inclusive).
    pub start_date: String,
    /// Last reopened date (inclusive).
    pub end_date: String,
    /// Only these projects. Absent means the closure's projects.
    #[serde(default)]
    pub project_ids: Option<Vec<ProjectId>>,
    /// Only these cost centers. Absent means the closure's cost centers.
    #[serde(default)]
    pub cost_center_ids: Option<Vec<CostCenterId>>,
    /// Only these engineers. Absent means the closure's engineers.
    #[serde(default)]
    pub engineer_ids: Option<Vec<EngineerId>>,
    /// Justification.
    #[serde(default)]
    pub note: String,
}

/// Body of a reopen request.
#[derive(Debug, Deserialize)]
pub struct ReopenBody {
    /// `total` or `partial`.
    #[serde(rename = "type")]
    pub kind: String,
    /// A single exception.
    #[serde(default)]
    pub partial_filters: Option<ExceptionBody>,
    /// Further exceptions.
    #[serde(default)]
    pub exceptions: Vec<ExceptionBody>,
    /// Who is reopening.
    #[serde(default)]
    pub user_id: Option<UserId>,
}

/// Closure as listed.
#[derive(Debug, Serialize)]
pub struct ClosureSummary {
    /// Closure ID.
    pub id: ClosureId,
    /// Lifecycle status.
    pub status: ClosureStatus,
    /// Export revision.
    pub revision: i32,
    /// First covered date.
    pub start_date: NaiveDate,
    /// Last covered date.
    pub end_date: NaiveDate,
    /// Entries in the latest artifact.
    pub record_count: i64,
    /// Who first exported the scope.
    pub created_by: Option<UserId>,
    /// Who exported it last.
    pub last_exported_by: Option<UserId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last change.
    pub updated_at: DateTime<Utc>,
}

/// Closure with its scope and exceptions inline.
#[derive(Debug, Serialize)]
pub struct ClosureDetail {
    /// Listed fields.
    #[serde(flatten)]
    pub summary: ClosureSummary,
    /// Scope fingerprint.
    pub fingerprint: String,
    /// Covered scope.
    pub scope: ClosureScope,
    /// Reopened carve-outs.
    pub exceptions: Vec<ClosureException>,
    /// Storage key of the latest artifact.
    pub artifact_key: Option<String>,
    /// Who last reopened it.
    pub reopened_by: Option<UserId>,
    /// When it was last reopened.
    pub reopened_at: Option<DateTime<Utc>>,
}

impl From<&ExportClosure> for ClosureSummary {
    fn from(c: &ExportClosure) -> Self {
        Self {
            id: c.id,
            status: c.status,
            revision: c.revision,
            start_date: c.scope.start_date,
            end_date: c.scope.end_date,
            record_count: c.record_count,
            created_by: c.created_by,
            last_exported_by: c.last_exported_by,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

impl From<ExportClosure> for ClosureDetail {
    fn from(c: ExportClosure) -> Self {
        Self {
            summary: ClosureSummary::from(&c),
            fingerprint: c.fingerprint.as_str().to_string(),
            scope: c.scope,
            exceptions: c.exceptions,
            artifact_key: c.artifact_key,
            reopened_by: c.reopened_by,
            reopened_at: c.reopened_at,
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn parse_closure_id(raw: &str) -> Result<ClosureId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::validation(format!("invalid closure id '{raw}'")))
}

fn build_scope(
    rules: &TimesheetRules,
    start_date: &str,
    end_date: &str,
    project_ids: Option<Vec<ProjectId>>,
    cost_center_ids: Option<Vec<CostCenterId>>,
    engineer_ids: Option<Vec<EngineerId>>,
) -> Result<ClosureScope, ApiError> {
    let scope = ClosureScope::new(rules.parse_date(start_date)?, rules.parse_date(end_date)?)?
        .with_projects(project_ids.unwrap_or_default())
        .with_cost_centers(cost_center_ids.unwrap_or_default())
        .with_engineers(engineer_ids.unwrap_or_default());
    Ok(scope)
}

fn custom_header(name: &'static str, value: &str) -> Result<(HeaderName, HeaderValue), ApiError> {
    Ok((HeaderName::from_static(name), header_value(value)?))
}

fn artifact_response(
    closure: &ExportClosure,
    content_type: &str,
    extension: &str,
    body: Vec<u8>,
) -> Result<Response, ApiError> {
    let filename = format!(
        "attachment; filename=\"ziklo-export-{}-{}-r{}.{extension}\"",
        closure.scope.start_date, closure.scope.end_date, closure.revision
    );
    let headers = [
        (header::CONTENT_TYPE, header_value(content_type)?),
        (header::CONTENT_DISPOSITION, header_value(&filename)?),
        custom_header("x-closure-id", &closure.id.to_string())?,
        custom_header("x-record-count", &closure.record_count.to_string())?,
        custom_header("x-closure-revision", &closure.revision.to_string())?,
    ];
    Ok((StatusCode::OK, headers, body).into_response())
}

fn header_value(value: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(value).map_err(|e| ApiError::internal(format!("invalid header: {e}")))
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/export-excel` and `/exports`
async fn export(
    State(state): State<AppState>,
    payload: Result<Json<ExportBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = payload?;
    let scope = build_scope(
        state.timesheet.rules(),
        &body.start_date,
        &body.end_date,
        body.project_ids,
        body.cost_center_ids,
        body.engineer_ids,
    )?;

    let outcome = state
        .closures
        .export(ExportRequest {
            scope,
            requested_by: body.user_id,
        })
        .await?;

    let closure = &outcome.closure;
    state
        .audit
        .record_best_effort(AuditRecord {
            actor_user_id: body.user_id.map(UserId::into_inner),
            action: AuditAction::Export,
            entity: "export_closures",
            entity_id: closure.id.into_inner(),
            payload: json!({
                "fingerprint": closure.fingerprint.as_str(),
                "revision": closure.revision,
                "record_count": closure.record_count,
                "created": outcome.created,
            }),
        })
        .await;

    artifact_response(
        closure,
        outcome.content_type,
        state.closures.extension(),
        outcome.artifact,
    )
}

/// GET `/export-closures`
async fn list_closures(
    State(state): State<AppState>,
) -> Result<Json<Envelope<Vec<ClosureSummary>>>, ApiError> {
    let closures = state.closures.list().await?;
    Ok(ok(closures.iter().map(ClosureSummary::from).collect()))
}

/// GET `/export-closures-detailed`
async fn list_closures_detailed(
    State(state): State<AppState>,
) -> Result<Json<Envelope<Vec<ClosureDetail>>>, ApiError> {
    let closures = state.closures.list().await?;
    Ok(ok(closures.into_iter().map(ClosureDetail::from).collect()))
}

/// GET `/export-closures/{closure_id}`
async fn get_closure(
    State(state): State<AppState>,
    Path(closure_id): Path<String>,
) -> Result<Json<Envelope<ClosureDetail>>, ApiError> {
    let id = parse_closure_id(&closure_id)?;
    Ok(ok(state.closures.get(id).await?.into()))
}

/// GET `/export-closures/{closure_id}/artifact`
async fn get_artifact(
    State(state): State<AppState>,
    Path(closure_id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_closure_id(&closure_id)?;
    let (closure, body) = state.closures.artifact(id).await?;
    artifact_response(
        &closure,
        state.closures.content_type(),
        state.closures.extension(),
        body,
    )
}

/// POST `/export-closures/{closure_id}/reopen`
async fn reopen_closure(
    State(state): State<AppState>,
    Path(closure_id): Path<String>,
    payload: Result<Json<ReopenBody>, JsonRejection>,
) -> Result<Json<Envelope<ClosureDetail>>, ApiError> {
    let id = parse_closure_id(&closure_id)?;
    let Json(body) = payload?;

    let rules = state.timesheet.rules();
    let exceptions = body
        .partial_filters
        .into_iter()
        .chain(body.exceptions)
        .map(|e| {
            let scope = build_scope(
                rules,
                &e.start_date,
                &e.end_date,
                e.project_ids,
                e.cost_center_ids,
                e.engineer_ids,
            )?;
            Ok(ExceptionInput {
                scope,
                note: e.note,
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    let request = ReopenRequest::parse(&body.kind, exceptions, body.user_id)?;
    let (kind, exception_count) = match &request.mode {
        ReopenMode::Total => ("total", 0),
        ReopenMode::Partial(inputs) => ("partial", inputs.len()),
    };
    let closure = state.closures.reopen(id, request).await?;

    state
        .audit
        .record_best_effort(AuditRecord {
            actor_user_id: body.user_id.map(UserId::into_inner),
            action: AuditAction::Reopen,
            entity: "export_closures",
            entity_id: closure.id.into_inner(),
            payload: json!({
                "type": kind,
                "status": closure.status,
                "exceptions_added": exception_count,
                "version": closure.version,
            }),
        })
        .await;

    Ok(ok(closure.into()))
}
