//! Time entry repository.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set,
};
use ziklo_core::closure::ClosureScope;
use ziklo_core::timesheet::{TimeEntry, TimeEntryFilter, TimeEntryStore, TimesheetError};
use ziklo_shared::types::{
    ConceptId, CostCenterId, EngineerId, ProjectId, TimeEntryId, UserId,
};

use crate::entities::time_entries;

/// Time entry repository implementation.
#[derive(Debug, Clone)]
pub struct TimeEntryRepository {
    db: DatabaseConnection,
}

impl TimeEntryRepository {
    /// Create a new time entry repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn fetch_ordered(
        &self,
        query: Select<time_entries::Entity>,
    ) -> Result<Vec<TimeEntry>, TimesheetError> {
        let models = query
            .order_by_asc(time_entries::Column::Date)
            .order_by_asc(time_entries::Column::Id)
            .all(&self.db)
            .await
            .map_err(repo_err)?;
        Ok(models.into_iter().map(to_domain).collect())
    }
}

impl TimeEntryStore for TimeEntryRepository {
    async fn find_by_id(&self, id: TimeEntryId) -> Result<Option<TimeEntry>, TimesheetError> {
        let model = time_entries::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(repo_err)?;
        Ok(model.map(to_domain))
    }

    async fn insert(&self, entry: &TimeEntry) -> Result<(), TimesheetError> {
        time_entries::Entity::insert(to_active_model(entry))
            .exec_without_returning(&self.db)
            .await
            .map_err(repo_err)?;
        Ok(())
    }

    async fn update(&self, entry: &TimeEntry) -> Result<bool, TimesheetError> {
        match to_active_model(entry).update(&self.db).await {
            Ok(_) => Ok(true),
            Err(DbErr::RecordNotUpdated) => Ok(false),
            Err(e) => Err(repo_err(e)),
        }
    }

    async fn delete(&self, id: TimeEntryId) -> Result<bool, TimesheetError> {
        let result = time_entries::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await
            .map_err(repo_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn list(&self, filter: &TimeEntryFilter) -> Result<Vec<TimeEntry>, TimesheetError> {
        let mut query = time_entries::Entity::find();
        if let Some(start) = filter.start_date {
            query = query.filter(time_entries::Column::Date.gte(start));
        }
        if let Some(end) = filter.end_date {
            query = query.filter(time_entries::Column::Date.lte(end));
        }
        if let Some(project) = filter.project_id {
            query = query.filter(time_entries::Column::ProjectId.eq(project.into_inner()));
        }
        if let Some(engineer) = filter.engineer_id {
            query = query.filter(time_entries::Column::EngineerId.eq(engineer.into_inner()));
        }
        self.fetch_ordered(query).await
    }

    async fn in_scope(&self, scope: &ClosureScope) -> Result<Vec<TimeEntry>, TimesheetError> {
        let mut condition = Condition::all()
            .add(time_entries::Column::Date.gte(scope.start_date))
            .add(time_entries::Column::Date.lte(scope.end_date));
        if !scope.project_ids.is_empty() {
            condition = condition.add(
                time_entries::Column::ProjectId
                    .is_in(scope.project_ids.iter().map(|id| id.into_inner())),
            );
        }
        if !scope.cost_center_ids.is_empty() {
            condition = condition.add(
                time_entries::Column::CostCenterId
                    .is_in(scope.cost_center_ids.iter().map(|id| id.into_inner())),
            );
        }
        if !scope.engineer_ids.is_empty() {
            condition = condition.add(
                time_entries::Column::EngineerId
                    .is_in(scope.engineer_ids.iter().map(|id| id.into_inner())),
            );
        }
        self.fetch_ordered(time_entries::Entity::find().filter(condition))
            .await
    }

    async fn hours_logged(
        &self,
        engineer_id: EngineerId,
        date: NaiveDate,
        excluding: Option<TimeEntryId>,
    ) -> Result<Decimal, TimesheetError> {
        let mut query = time_entries::Entity::find()
            .select_only()
            .column(time_entries::Column::Hours)
            .filter(time_entries::Column::EngineerId.eq(engineer_id.into_inner()))
            .filter(time_entries::Column::Date.eq(date));
        if let Some(id) = excluding {
            query = query.filter(time_entries::Column::Id.ne(id.into_inner()));
        }

        let hours: Vec<Decimal> = query
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(repo_err)?;
        Ok(hours.into_iter().map(|h| h.round_dp(2)).sum())
    }
}

fn repo_err(err: DbErr) -> TimesheetError {
    TimesheetError::Repository(err.to_string())
}

fn to_active_model(entry: &TimeEntry) -> time_entries::ActiveModel {
    time_entries::ActiveModel {
        id: Set(entry.id.into_inner()),
        date: Set(entry.date),
        project_id: Set(entry.project_id.into_inner()),
        cost_center_id: Set(entry.cost_center_id.into_inner()),
        engineer_id: Set(entry.engineer_id.into_inner()),
        concept_id: Set(entry.concept_id.into_inner()),
        hours: Set(entry.hours),
        notes: Set(entry.notes.clone()),
        created_by: Set(entry.created_by.map(UserId::into_inner)),
        post_export_adjustment: Set(entry.post_export_adjustment),
        created_at: Set(entry.created_at.into()),
        updated_at: Set(entry.updated_at.into()),
    }
}

fn to_domain(model: time_entries::Model) -> TimeEntry {
    TimeEntry {
        id: TimeEntryId::from_uuid(model.id),
        date: model.date,
        project_id: ProjectId::from_uuid(model.project_id),
        cost_center_id: CostCenterId::from_uuid(model.cost_center_id),
        engineer_id: EngineerId::from_uuid(model.engineer_id),
        concept_id: ConceptId::from_uuid(model.concept_id),
        // SQLite stores decimals as REAL
        hours: model.hours.round_dp(2).normalize(),
        notes: model.notes,
        created_by: model.created_by.map(UserId::from_uuid),
        post_export_adjustment: model.post_export_adjustment,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
