//! `SeaORM` Entity for export_closures table.
//!
//! Scope and exceptions are JSON documents so a reopen is a single-row write.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "export_closures")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub fingerprint: String,
    pub date_start: Date,
    pub date_end: Date,
    pub status: String,
    pub revision: i32,
    pub version: i64,
    pub scope: Json,
    pub exceptions: Json,
    pub record_count: i64,
    pub artifact_key: Option<String>,
    pub created_by: Option<Uuid>,
    pub last_exported_by: Option<Uuid>,
    pub reopened_by: Option<Uuid>,
    pub reopened_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
