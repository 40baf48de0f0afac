//! Export closures.

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ExportClosures::Table)
                    .if_not_exists()
                    .col(pk_uuid(ExportClosures::Id))
                    .col(string_len_uniq(ExportClosures::Fingerprint, 64))
                    .col(date(ExportClosures::DateStart))
                    .col(date(ExportClosures::DateEnd))
                    .col(string_len(ExportClosures::Status, 32))
                    .col(integer(ExportClosures::Revision))
                    .col(big_integer(ExportClosures::Version))
                    .col(json(ExportClosures::Scope))
                    .col(json(ExportClosures::Exceptions))
                    .col(big_integer(ExportClosures::RecordCount).default(0))
                    .col(string_null(ExportClosures::ArtifactKey))
                    .col(uuid_null(ExportClosures::CreatedBy))
                    .col(uuid_null(ExportClosures::LastExportedBy))
                    .col(uuid_null(ExportClosures::ReopenedBy))
                    .col(timestamp_with_time_zone_null(ExportClosures::ReopenedAt))
                    .col(timestamp_with_time_zone(ExportClosures::CreatedAt))
                    .col(timestamp_with_time_zone(ExportClosures::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // Gate lookups by entry date
        manager
            .create_index(
                Index::create()
                    .name("idx_export_closures_date_range")
                    .table(ExportClosures::Table)
                    .col(ExportClosures::DateStart)
                    .col(ExportClosures::DateEnd)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ExportClosures::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ExportClosures {
    Table,
    Id,
    Fingerprint,
    DateStart,
    DateEnd,
    Status,
    Revision,
    Version,
    Scope,
    Exceptions,
    RecordCount,
    ArtifactKey,
    CreatedBy,
    LastExportedBy,
    ReopenedBy,
    ReopenedAt,
    CreatedAt,
    UpdatedAt,
}
