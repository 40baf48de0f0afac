//! Master data routes: users, cost centers, projects, engineers and concepts.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::get,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;
use ziklo_db::entities::{concepts, cost_centers, engineers, projects, users};
use ziklo_db::repositories::{NewConcept, NewCostCenter, NewEngineer, NewProject, NewUser};
use ziklo_db::{AuditAction, AuditRecord};

use crate::response::{Envelope, ok};
use crate::{ApiError, AppState};

type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

/// Creates the catalog routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/cost-centers", get(list_cost_centers).post(create_cost_center))
        .route("/projects", get(list_projects).post(create_project))
        .route("/engineers", get(list_engineers).post(create_engineer))
        .route("/concepts", get(list_concepts).post(create_concept))
}

async fn audit_created<T: Serialize>(state: &AppState, entity: &'static str, id: Uuid, record: &T) {
    info!(entity, id = %id, "Catalog record created");
    state
        .audit
        .record_best_effort(AuditRecord {
            actor_user_id: None,
            action: AuditAction::Create,
            entity,
            entity_id: id,
            payload: super::audit_payload(entity, record),
        })
        .await;
}

/// POST `/users`
async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> ApiResult<users::Model> {
    let Json(input) = payload?;
    let user = state.catalog.create_user(input).await?;
    audit_created(&state, "users", user.id, &user).await;
    Ok(ok(user))
}

/// GET `/users`
async fn list_users(State(state): State<AppState>) -> ApiResult<Vec<users::Model>> {
    Ok(ok(state.catalog.list_users().await?))
}

/// POST `/cost-centers`
async fn create_cost_center(
    State(state): State<AppState>,
    payload: Result<Json<NewCostCenter>, JsonRejection>,
) -> ApiResult<cost_centers::Model> {
    let Json(input) = payload?;
    let cost_center = state.catalog.create_cost_center(input).await?;
    audit_created(&state, "cost_centers", cost_center.id, &cost_center).await;
    Ok(ok(cost_center))
}

/// GET `/cost-centers`
async fn list_cost_centers(State(state): State<AppState>) -> ApiResult<Vec<cost_centers::Model>> {
    Ok(ok(state.catalog.list_cost_centers().await?))
}

/// POST `/projects`
async fn create_project(
    State(state): State<AppState>,
    payload: Result<Json<NewProject>, JsonRejection>,
) -> ApiResult<projects::Model> {
    let Json(input) = payload?;
    let project = state.catalog.create_project(input).await?;
    audit_created(&state, "projects", project.id, &project).await;
    Ok(ok(project))
}

/// GET `/projects`
async fn list_projects(State(state): State<AppState>) -> ApiResult<Vec<projects::Model>> {
    Ok(ok(state.catalog.list_projects().await?))
}

/// POST `/engineers`
async fn create_engineer(
    State(state): State<AppState>,
    payload: Result<Json<NewEngineer>, JsonRejection>,
) -> ApiResult<engineers::Model> {
    let Json(input) = payload?;
    let engineer = state.catalog.create_engineer(input).await?;
    audit_created(&state, "engineers", engineer.id, &engineer).await;
    Ok(ok(engineer))
}

/// GET `/engineers`
async fn list_engineers(State(state): State<AppState>) -> ApiResult<Vec<engineers::Model>> {
    Ok(ok(state.catalog.list_engineers().await?))
}

/// POST `/concepts`
async fn create_concept(
    State(state): State<AppState>,
    payload: Result<Json<NewConcept>, JsonRejection>,
) -> ApiResult<concepts::Model> {
    let Json(input) = payload?;
    let concept = state.catalog.create_concept(input).await?;
    audit_created(&state, "concepts", concept.id, &concept).await;
    Ok(ok(concept))
}

/// GET `/concepts`
async fn list_concepts(State(state): State<AppState>) -> ApiResult<Vec<concepts::Model>> {
    Ok(ok(state.catalog.list_concepts().await?))
}
