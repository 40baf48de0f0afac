//! Catalog tables: users, cost centers, projects, engineers and concepts.

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_uuid(Users::Id))
                    .col(string(Users::Name))
                    .col(string_uniq(Users::Email))
                    .col(string(Users::Status))
                    .col(timestamp_with_time_zone(Users::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CostCenters::Table)
                    .if_not_exists()
                    .col(pk_uuid(CostCenters::Id))
                    .col(string_uniq(CostCenters::Code))
                    .col(string(CostCenters::Name))
                    .col(string(CostCenters::Status))
                    .col(timestamp_with_time_zone(CostCenters::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Projects::Table)
                    .if_not_exists()
                    .col(pk_uuid(Projects::Id))
                    .col(string_uniq(Projects::Code))
                    .col(string(Projects::Name))
                    .col(string(Projects::Client))
                    .col(string(Projects::Status))
                    .col(uuid_null(Projects::LeaderUserId))
                    .col(uuid_null(Projects::CostCenterId))
                    .col(timestamp_with_time_zone(Projects::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_projects_cost_center")
                            .from(Projects::Table, Projects::CostCenterId)
                            .to(CostCenters::Table, CostCenters::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Engineers::Table)
                    .if_not_exists()
                    .col(pk_uuid(Engineers::Id))
                    .col(uuid_null(Engineers::UserId))
                    .col(string_uniq(Engineers::DocumentNumber))
                    .col(string(Engineers::Title))
                    .col(string(Engineers::Status))
                    .col(timestamp_with_time_zone(Engineers::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Concepts::Table)
                    .if_not_exists()
                    .col(pk_uuid(Concepts::Id))
                    .col(string_uniq(Concepts::Code))
                    .col(string(Concepts::Name))
                    .col(string(Concepts::Status))
                    .col(timestamp_with_time_zone(Concepts::CreatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Concepts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Engineers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CostCenters::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum CostCenters {
    Table,
    Id,
    Code,
    Name,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Projects {
    Table,
    Id,
    Code,
    Name,
    Client,
    Status,
    LeaderUserId,
    CostCenterId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Engineers {
    Table,
    Id,
    UserId,
    DocumentNumber,
    Title,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Concepts {
    Table,
    Id,
    Code,
    Name,
    Status,
    CreatedAt,
}
