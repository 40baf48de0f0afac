//! Shared fixtures for repository tests.

#![allow(dead_code)]

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use ziklo_core::timesheet::TimeEntry;
use ziklo_shared::types::{ConceptId, CostCenterId, EngineerId, ProjectId, TimeEntryId};

/// Fresh in-memory SQLite database with all migrations applied.
///
/// A single pooled connection keeps the in-memory database alive and shared.
pub async fn setup() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("Failed to open SQLite");
    ziklo_db::migrate(&db).await.expect("Failed to migrate");
    db
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// One set of catalog coordinates to hang entries on.
#[derive(Debug, Clone, Copy)]
pub struct Coordinates {
    pub project_id: ProjectId,
    pub cost_center_id: CostCenterId,
    pub engineer_id: EngineerId,
    pub concept_id: ConceptId,
}

impl Coordinates {
    pub fn new() -> Self {
        Self {
            project_id: ProjectId::new(),
            cost_center_id: CostCenterId::new(),
            engineer_id: EngineerId::new(),
            concept_id: ConceptId::new(),
        }
    }

    pub fn entry(&self, date: NaiveDate, hours: Decimal) -> TimeEntry {
        let now = Utc::now();
        TimeEntry {
            id: TimeEntryId::new(),
            date,
            project_id: self.project_id,
            cost_center_id: self.cost_center_id,
            engineer_id: self.engineer_id,
            concept_id: self.concept_id,
            hours,
            notes: "Integration work".to_string(),
            created_by: None,
            post_export_adjustment: false,
            created_at: now,
            updated_at: now,
        }
    }
}
