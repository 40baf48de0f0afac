//! Export closure repository.
//!
//! Every write is one statement on one row. Inserts rely on the unique
//! fingerprint index and updates on the `version` column to reject a writer
//! that lost a race.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Set, SqlErr,
};
use ziklo_core::closure::{
    ClosureError, ClosureStatus, ClosureStore, ExportClosure, Fingerprint,
};
use ziklo_shared::types::{ClosureId, UserId};

use crate::entities::export_closures;

/// Export closure repository implementation.
#[derive(Debug, Clone)]
pub struct ClosureRepository {
    db: DatabaseConnection,
}

impl ClosureRepository {
    /// Create a new closure repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl ClosureStore for ClosureRepository {
    async fn find_by_id(&self, id: ClosureId) -> Result<Option<ExportClosure>, ClosureError> {
        export_closures::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .map(to_domain)
            .transpose()
    }

    async fn find_by_fingerprint(
        &self,
        fingerprint: &Fingerprint,
    ) -> Result<Option<ExportClosure>, ClosureError> {
        export_closures::Entity::find()
            .filter(export_closures::Column::Fingerprint.eq(fingerprint.as_str()))
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .map(to_domain)
            .transpose()
    }

    async fn insert(&self, closure: &ExportClosure) -> Result<(), ClosureError> {
        let model = to_active_model(closure)?;
        export_closures::Entity::insert(model)
            .exec_without_returning(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }

    async fn update(
        &self,
        closure: &ExportClosure,
        expected_version: i64,
    ) -> Result<(), ClosureError> {
        let model = to_active_model(closure)?;
        let result = export_closures::Entity::update_many()
            .set(model)
            .filter(export_closures::Column::Id.eq(closure.id.into_inner()))
            .filter(export_closures::Column::Version.eq(expected_version))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(ClosureError::ConcurrentModification);
        }
        Ok(())
    }

    async fn covering(&self, date: NaiveDate) -> Result<Vec<ExportClosure>, ClosureError> {
        export_closures::Entity::find()
            .filter(export_closures::Column::DateStart.lte(date))
            .filter(export_closures::Column::DateEnd.gte(date))
            .all(&self.db)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    async fn list(&self) -> Result<Vec<ExportClosure>, ClosureError> {
        export_closures::Entity::find()
            .order_by_desc(export_closures::Column::CreatedAt)
            .order_by_desc(export_closures::Column::Id)
            .all(&self.db)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(to_domain)
            .collect()
    }
}

/// Unique violations mean another writer created the same fingerprint.
fn map_db_err(err: DbErr) -> ClosureError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => ClosureError::ConcurrentModification,
        _ => ClosureError::Repository(err.to_string()),
    }
}

fn json_err(err: serde_json::Error) -> ClosureError {
    ClosureError::Repository(format!("closure document: {err}"))
}

fn to_active_model(closure: &ExportClosure) -> Result<export_closures::ActiveModel, ClosureError> {
    Ok(export_closures::ActiveModel {
        id: Set(closure.id.into_inner()),
        fingerprint: Set(closure.fingerprint.as_str().to_string()),
        date_start: Set(closure.scope.start_date),
        date_end: Set(closure.scope.end_date),
        status: Set(closure.status.as_str().to_string()),
        revision: Set(closure.revision),
        version: Set(closure.version),
        scope: Set(serde_json::to_value(&closure.scope).map_err(json_err)?),
        exceptions: Set(serde_json::to_value(&closure.exceptions).map_err(json_err)?),
        record_count: Set(closure.record_count),
        artifact_key: Set(closure.artifact_key.clone()),
        created_by: Set(closure.created_by.map(UserId::into_inner)),
        last_exported_by: Set(closure.last_exported_by.map(UserId::into_inner)),
        reopened_by: Set(closure.reopened_by.map(UserId::into_inner)),
        reopened_at: Set(closure.reopened_at.map(Into::into)),
        created_at: Set(closure.created_at.into()),
        updated_at: Set(closure.updated_at.into()),
    })
}

fn to_domain(model: export_closures::Model) -> Result<ExportClosure, ClosureError> {
    let status = ClosureStatus::parse(&model.status).ok_or_else(|| {
        ClosureError::Repository(format!("unknown closure status '{}'", model.status))
    })?;

    Ok(ExportClosure {
        id: ClosureId::from_uuid(model.id),
        scope: serde_json::from_value(model.scope).map_err(json_err)?,
        fingerprint: Fingerprint::from_hex(model.fingerprint),
        status,
        revision: model.revision,
        version: model.version,
        exceptions: serde_json::from_value(model.exceptions).map_err(json_err)?,
        record_count: model.record_count,
        artifact_key: model.artifact_key,
        created_by: model.created_by.map(UserId::from_uuid),
        last_exported_by: model.last_exported_by.map(UserId::from_uuid),
        reopened_by: model.reopened_by.map(UserId::from_uuid),
        reopened_at: model.reopened_at.map(|t| t.with_timezone(&Utc)),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}
