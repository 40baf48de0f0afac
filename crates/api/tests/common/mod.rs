//! Shared harness for HTTP tests.

#![allow(dead_code)]

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use rust_decimal_macros::dec;
use sea_orm::{ConnectOptions, Database};
use serde_json::{Value, json};
use tower::ServiceExt;
use ziklo_api::{AppState, create_router};
use ziklo_core::storage::StorageService;
use ziklo_core::timesheet::TimesheetRules;

/// Router over a fresh in-memory SQLite database.
pub async fn app() -> Router {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("Failed to open SQLite");
    ziklo_db::migrate(&db).await.expect("Failed to migrate");

    let state = AppState::new(
        db,
        StorageService::in_memory().expect("memory storage"),
        TimesheetRules::new(chrono_tz::America::Bogota, dec!(8)),
    );
    create_router(state)
}

/// Raw response parts.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("JSON body")
    }

    /// `data` of a success envelope.
    pub fn data(&self) -> Value {
        let body = self.json();
        assert_eq!(body["success"], json!(true), "not a success envelope: {body}");
        body["data"].clone()
    }

    /// `error` code of a failure envelope.
    pub fn error_code(&self) -> String {
        let body = self.json();
        assert_eq!(body["success"], json!(false), "not an error envelope: {body}");
        body["error"].as_str().expect("error code").to_string()
    }

    pub fn header(&self, name: &str) -> &str {
        self.headers
            .get(name)
            .unwrap_or_else(|| panic!("missing header {name}"))
            .to_str()
            .expect("ASCII header")
    }
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("valid request");

    let response = app.clone().oneshot(request).await.expect("infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    TestResponse {
        status,
        headers,
        body,
    }
}

pub async fn get(app: &Router, uri: &str) -> TestResponse {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> TestResponse {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put(app: &Router, uri: &str, body: Value) -> TestResponse {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str) -> TestResponse {
    send(app, Method::DELETE, uri, None).await
}

/// Catalog records every entry needs.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub user_id: String,
    pub cost_center_id: String,
    pub project_id: String,
    pub engineer_id: String,
    pub concept_id: String,
}

fn id_of(response: &TestResponse) -> String {
    assert_eq!(response.status, StatusCode::OK, "{}", response.json());
    response.data()["id"].as_str().expect("id").to_string()
}

/// Creates one of each catalog record through the API.
pub async fn seed_catalog(app: &Router, suffix: &str) -> Catalog {
    let user_id = id_of(
        &post(
            app,
            "/api/users",
            json!({"name": "Export Test User", "email": format!("export.{suffix}@ziklo.test"), "status": "active"}),
        )
        .await,
    );
    let cost_center_id = id_of(
        &post(
            app,
            "/api/cost-centers",
            json!({"code": format!("CC-{suffix}"), "name": "Export Test Cost Center"}),
        )
        .await,
    );
    let project_id = id_of(
        &post(
            app,
            "/api/projects",
            json!({
                "code": format!("PROJ-{suffix}"),
                "name": "Export Test Project",
                "client": "Test Client",
                "leader_user_id": user_id,
                "cost_center_id": cost_center_id,
            }),
        )
        .await,
    );
    let engineer_id = id_of(
        &post(
            app,
            "/api/engineers",
            json!({"user_id": user_id, "document_number": format!("DOC-{suffix}"), "title": "Engineer"}),
        )
        .await,
    );
    let concept_id = id_of(
        &post(
            app,
            "/api/concepts",
            json!({"code": format!("CONC-{suffix}"), "name": "Development"}),
        )
        .await,
    );

    Catalog {
        user_id,
        cost_center_id,
        project_id,
        engineer_id,
        concept_id,
    }
}

impl Catalog {
    pub fn entry(&self, date: &str, hours: f64, notes: &str) -> Value {
        json!({
            "date": date,
            "project_id": self.project_id,
            "cost_center_id": self.cost_center_id,
            "engineer_id": self.engineer_id,
            "concept_id": self.concept_id,
            "hours": hours,
            "notes": notes,
            "created_by": self.user_id,
        })
    }

    pub fn december_export(&self) -> Value {
        json!({
            "start_date": "2024-12-01",
            "end_date": "2024-12-31",
            "project_ids": [self.project_id],
            "user_id": self.user_id,
        })
    }
}
