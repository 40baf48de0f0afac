//! API route definitions.

use axum::Router;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::AppState;

pub mod catalog;
pub mod closures;
pub mod health;
pub mod time_entries;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(catalog::routes())
        .merge(time_entries::routes())
        .merge(closures::routes())
}

/// JSON payload for an audit record. Serialization failures are logged and
/// recorded as `null`.
pub(crate) fn audit_payload<T: Serialize>(entity: &'static str, record: &T) -> Value {
    serde_json::to_value(record).unwrap_or_else(|e| {
        warn!(entity, error = %e, "Failed to serialize audit payload");
        Value::Null
    })
}
