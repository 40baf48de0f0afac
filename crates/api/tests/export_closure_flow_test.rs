//! End-to-end export closure workflow over HTTP.

mod common;

use axum::http::StatusCode;
use common::{Catalog, app, delete, get, post, put, seed_catalog};
use serde_json::{Value, json};

fn closure_in(list: &Value, id: &str) -> Value {
    list.as_array()
        .expect("closure list")
        .iter()
        .find(|c| c["id"] == json!(id))
        .cloned()
        .unwrap_or_else(|| panic!("closure {id} not listed"))
}

async fn create_december_entries(app: &axum::Router, catalog: &Catalog) -> Vec<String> {
    let mut ids = Vec::new();
    for date in [
        "2024-12-01",
        "2024-12-02",
        "2024-12-03",
        "2024-12-15",
        "2024-12-16",
        "2024-12-30",
    ] {
        let response = post(
            app,
            "/api/time-entries",
            catalog.entry(date, 4.0, &format!("Test entry for {date}")),
        )
        .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.json());
        let entry = response.data();
        assert_eq!(entry["post_export_adjustment"], json!(false));
        ids.push(entry["id"].as_str().expect("id").to_string());
    }
    ids
}

#[tokio::test]
async fn test_export_reopen_and_reclose_cycle() {
    let app = app().await;
    let catalog = seed_catalog(&app, "FLOW").await;
    let entry_ids = create_december_entries(&app, &catalog).await;

    // First export creates the closure.
    let export = post(&app, "/api/export-excel", catalog.december_export()).await;
    assert_eq!(export.status, StatusCode::OK);
    let closure_id = export.header("x-closure-id").to_string();
    assert_eq!(export.header("x-record-count"), "6");
    assert_eq!(export.header("x-closure-revision"), "1");
    assert!(export.header("content-type").starts_with("text/csv"));
    assert!(export.header("content-disposition").contains("attachment"));
    let csv = String::from_utf8(export.body.to_vec()).expect("utf-8 csv");
    assert!(csv.starts_with("entry_id,date,"));
    assert_eq!(csv.lines().count(), 7);

    let listed = get(&app, "/api/export-closures").await.data();
    let closure = closure_in(&listed, &closure_id);
    assert_eq!(closure["status"], json!("ACTIVE"));
    assert_eq!(closure["revision"], json!(1));

    // Same filters resolve to the same closure with the next revision.
    let again = post(&app, "/api/export-excel", catalog.december_export()).await;
    assert_eq!(again.status, StatusCode::OK);
    assert_eq!(again.header("x-closure-id"), closure_id);
    assert_eq!(again.header("x-closure-revision"), "2");

    // Every mutation inside the closed scope is refused.
    let blocked = post(
        &app,
        "/api/time-entries",
        catalog.entry("2024-12-15", 2.0, "This should be blocked"),
    )
    .await;
    assert_eq!(blocked.status, StatusCode::CONFLICT);
    assert_eq!(blocked.error_code(), "CLOSURE_BLOCKED");
    let body = blocked.json();
    assert!(body["message"].as_str().expect("message").contains("closure"));
    assert_eq!(body["details"]["closure_id"], json!(closure_id));
    assert_eq!(body["details"]["operation"], json!("create"));

    let existing = &entry_ids[0];
    let update = put(
        &app,
        &format!("/api/time-entries/{existing}"),
        catalog.entry("2024-12-15", 6.0, "Updated - should be blocked"),
    )
    .await;
    assert_eq!(update.status, StatusCode::CONFLICT);

    let removal = delete(&app, &format!("/api/time-entries/{existing}")).await;
    assert_eq!(removal.status, StatusCode::CONFLICT);

    // Total reopen lifts the block and tags new writes.
    let reopened = post(
        &app,
        &format!("/api/export-closures/{closure_id}/reopen"),
        json!({"type": "total", "user_id": catalog.user_id}),
    )
    .await;
    assert_eq!(reopened.status, StatusCode::OK);
    assert_eq!(reopened.data()["status"], json!("REOPENED"));

    let listed = get(&app, "/api/export-closures").await.data();
    assert_eq!(closure_in(&listed, &closure_id)["status"], json!("REOPENED"));

    let adjusted = post(
        &app,
        "/api/time-entries",
        catalog.entry("2024-12-15", 2.0, "Post-reopen entry"),
    )
    .await;
    assert_eq!(adjusted.status, StatusCode::OK);
    assert_eq!(adjusted.data()["post_export_adjustment"], json!(true));

    // Exporting again closes the scope once more.
    let reclosed = post(&app, "/api/export-excel", catalog.december_export()).await;
    assert_eq!(reclosed.header("x-closure-id"), closure_id);
    assert_eq!(reclosed.header("x-closure-revision"), "3");
    assert_eq!(reclosed.header("x-record-count"), "7");

    let detail = get(&app, &format!("/api/export-closures/{closure_id}")).await.data();
    assert_eq!(detail["status"], json!("ACTIVE"));
    assert_eq!(detail["exceptions"], json!([]));

    let blocked_again = post(
        &app,
        "/api/time-entries",
        catalog.entry("2024-12-16", 1.0, "Closed again"),
    )
    .await;
    assert_eq!(blocked_again.status, StatusCode::CONFLICT);

    // Partial reopen only frees its exception.
    let partial = post(
        &app,
        &format!("/api/export-closures/{closure_id}/reopen"),
        json!({
            "type": "partial",
            "partial_filters": {
                "start_date": "2024-12-10",
                "end_date": "2024-12-20",
                "project_ids": [catalog.project_id],
                "note": "Partial reopening for corrections",
            },
            "user_id": catalog.user_id,
        }),
    )
    .await;
    assert_eq!(partial.status, StatusCode::OK, "{}", partial.json());
    let data = partial.data();
    assert_eq!(data["status"], json!("PARTIALLY_REOPENED"));
    assert_eq!(data["exceptions"].as_array().expect("exceptions").len(), 1);
    assert_eq!(
        data["exceptions"][0]["note"],
        json!("Partial reopening for corrections")
    );

    let inside = post(
        &app,
        "/api/time-entries",
        catalog.entry("2024-12-12", 3.0, "Entry in exception range"),
    )
    .await;
    assert_eq!(inside.status, StatusCode::OK);
    assert_eq!(inside.data()["post_export_adjustment"], json!(true));

    let outside = post(
        &app,
        "/api/time-entries",
        catalog.entry("2024-12-25", 2.0, "Entry outside exception range"),
    )
    .await;
    assert_eq!(outside.status, StatusCode::CONFLICT);
    assert_eq!(outside.json()["details"]["exceptions_checked"], json!(1));

    // Detailed listing carries scope and exceptions inline.
    let detailed = get(&app, "/api/export-closures-detailed").await.data();
    let closure = closure_in(&detailed, &closure_id);
    assert_eq!(closure["scope"]["start_date"], json!("2024-12-01"));
    assert_eq!(closure["scope"]["project_ids"], json!([catalog.project_id]));
    assert_eq!(closure["exceptions"].as_array().expect("exceptions").len(), 1);
}

#[tokio::test]
async fn test_project_order_does_not_change_closure() {
    let app = app().await;
    let first = seed_catalog(&app, "A").await;
    let second = seed_catalog(&app, "B").await;

    let forward = post(
        &app,
        "/api/exports",
        json!({
            "start_date": "2024-11-01",
            "end_date": "2024-11-30",
            "project_ids": [first.project_id, second.project_id],
        }),
    )
    .await;
    let backward = post(
        &app,
        "/api/exports",
        json!({
            "start_date": "2024-11-01",
            "end_date": "2024-11-30",
            "project_ids": [second.project_id, first.project_id],
        }),
    )
    .await;

    assert_eq!(forward.status, StatusCode::OK);
    assert_eq!(backward.status, StatusCode::OK);
    assert_eq!(
        forward.header("x-closure-id"),
        backward.header("x-closure-id")
    );
    assert_eq!(backward.header("x-closure-revision"), "2");
    assert_eq!(forward.header("x-record-count"), "0");
}

#[tokio::test]
async fn test_entries_without_closure_pass_through() {
    let app = app().await;
    let catalog = seed_catalog(&app, "FREE").await;

    post(&app, "/api/export-excel", catalog.december_export()).await;

    let january = post(
        &app,
        "/api/time-entries",
        catalog.entry("2025-01-15", 4.0, "Outside every closure"),
    )
    .await;
    assert_eq!(january.status, StatusCode::OK);
    assert_eq!(january.data()["post_export_adjustment"], json!(false));
}

#[tokio::test]
async fn test_artifact_returns_latest_revision() {
    let app = app().await;
    let catalog = seed_catalog(&app, "ART").await;
    post(
        &app,
        "/api/time-entries",
        catalog.entry("2024-12-05", 4.0, "Exported"),
    )
    .await;
    post(&app, "/api/export-excel", catalog.december_export()).await;
    let second = post(&app, "/api/export-excel", catalog.december_export()).await;
    let closure_id = second.header("x-closure-id").to_string();

    let artifact = get(&app, &format!("/api/export-closures/{closure_id}/artifact")).await;
    assert_eq!(artifact.status, StatusCode::OK);
    assert_eq!(artifact.header("x-closure-revision"), "2");
    assert_eq!(artifact.header("x-record-count"), "1");
    assert_eq!(artifact.body, second.body);
}
