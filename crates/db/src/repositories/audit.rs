//! Append-only audit log.

use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::audit_log;

/// Audited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    /// Record created.
    Create,
    /// Record updated.
    Update,
    /// Record deleted.
    Delete,
    /// Closure exported or re-exported.
    Export,
    /// Closure reopened.
    Reopen,
}

impl AuditAction {
    /// Stored value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Export => "EXPORT",
            Self::Reopen => "REOPEN",
        }
    }
}

/// A single audit record to append.
#[derive(Debug, Clone)]
pub struct AuditRecord {
    /// Who acted, when known.
    pub actor_user_id: Option<Uuid>,
    /// What they did.
    pub action: AuditAction,
    /// Table or entity kind, e.g. `time_entries`.
    pub entity: &'static str,
    /// Affected record.
    pub entity_id: Uuid,
    /// Snapshot of the change.
    pub payload: serde_json::Value,
}

/// Audit log repository.
#[derive(Debug, Clone)]
pub struct AuditRepository {
    db: DatabaseConnection,
}

impl AuditRepository {
    /// Creates a new audit repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Appends a record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn record(&self, record: AuditRecord) -> Result<(), DbErr> {
        let model = audit_log::ActiveModel {
            id: Set(Uuid::now_v7()),
            actor_user_id: Set(record.actor_user_id),
            action: Set(record.action.as_str().to_string()),
            entity: Set(record.entity.to_string()),
            entity_id: Set(record.entity_id),
            payload: Set(record.payload),
            created_at: Set(chrono::Utc::now().into()),
        };
        audit_log::Entity::insert(model)
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }

    /// Appends a record, logging instead of failing.
    pub async fn record_best_effort(&self, record: AuditRecord) {
        let action = record.action.as_str();
        let entity = record.entity;
        let entity_id = record.entity_id;
        if let Err(e) = self.record(record).await {
            tracing::warn!(
                action,
                entity,
                entity_id = %entity_id,
                error = %e,
                "Failed to write audit log"
            );
        }
    }

    /// Lists records for one entity, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for(
        &self,
        entity: &str,
        entity_id: Uuid,
    ) -> Result<Vec<audit_log::Model>, DbErr> {
        audit_log::Entity::find()
            .filter(audit_log::Column::Entity.eq(entity))
            .filter(audit_log::Column::EntityId.eq(entity_id))
            .order_by_asc(audit_log::Column::CreatedAt)
            .order_by_asc(audit_log::Column::Id)
            .all(&self.db)
            .await
    }
}
