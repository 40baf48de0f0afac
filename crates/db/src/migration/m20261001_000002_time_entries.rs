//! Time entries.
//!
//! Catalog ids are plain references: entries may point at records managed
//! elsewhere, so no foreign keys are declared.

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TimeEntries::Table)
                    .if_not_exists()
                    .col(pk_uuid(TimeEntries::Id))
                    .col(date(TimeEntries::Date))
                    .col(uuid(TimeEntries::ProjectId))
                    .col(uuid(TimeEntries::CostCenterId))
                    .col(uuid(TimeEntries::EngineerId))
                    .col(uuid(TimeEntries::ConceptId))
                    .col(decimal_len(TimeEntries::Hours, 6, 2))
                    .col(text(TimeEntries::Notes))
                    .col(uuid_null(TimeEntries::CreatedBy))
                    .col(boolean(TimeEntries::PostExportAdjustment).default(false))
                    .col(timestamp_with_time_zone(TimeEntries::CreatedAt))
                    .col(timestamp_with_time_zone(TimeEntries::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // Daily limit lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_time_entries_engineer_date")
                    .table(TimeEntries::Table)
                    .col(TimeEntries::EngineerId)
                    .col(TimeEntries::Date)
                    .to_owned(),
            )
            .await?;

        // Export snapshots and range listings
        manager
            .create_index(
                Index::create()
                    .name("idx_time_entries_date_project")
                    .table(TimeEntries::Table)
                    .col(TimeEntries::Date)
                    .col(TimeEntries::ProjectId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TimeEntries::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TimeEntries {
    Table,
    Id,
    Date,
    ProjectId,
    CostCenterId,
    EngineerId,
    ConceptId,
    Hours,
    Notes,
    CreatedBy,
    PostExportAdjustment,
    CreatedAt,
    UpdatedAt,
}
