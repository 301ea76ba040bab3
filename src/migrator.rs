use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_supply_items_table::Migration),
            Box::new(m20240101_000002_create_usage_records_table::Migration),
            Box::new(m20240101_000003_create_supply_requests_table::Migration),
        ]
    }
}

#[derive(DeriveIden)]
enum SupplyItems {
    Table,
    Id,
    Name,
    Type,
    Model,
    Quantity,
    MinQuantity,
    Unit,
    Location,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum UsageRecords {
    Table,
    Id,
    SupplyId,
    QuantityUsed,
    UsedBy,
    Department,
    Purpose,
    UsedAt,
}

#[derive(DeriveIden)]
enum SupplyRequests {
    Table,
    Id,
    SupplyId,
    Quantity,
    RequestedBy,
    Department,
    Status,
    CreatedAt,
    UpdatedAt,
}

mod m20240101_000001_create_supply_items_table {
    use super::SupplyItems;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_supply_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(SupplyItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SupplyItems::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(SupplyItems::Name).string().not_null())
                        .col(ColumnDef::new(SupplyItems::Type).string().not_null())
                        .col(ColumnDef::new(SupplyItems::Model).string().not_null())
                        .col(
                            ColumnDef::new(SupplyItems::Quantity)
                                .integer()
                                .not_null()
                                .default(0)
                                .check(Expr::col(SupplyItems::Quantity).gte(0)),
                        )
                        .col(
                            ColumnDef::new(SupplyItems::MinQuantity)
                                .integer()
                                .not_null()
                                .default(5)
                                .check(Expr::col(SupplyItems::MinQuantity).gte(0)),
                        )
                        .col(ColumnDef::new(SupplyItems::Unit).string().not_null())
                        .col(ColumnDef::new(SupplyItems::Location).string().null())
                        .col(
                            ColumnDef::new(SupplyItems::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SupplyItems::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_supply_items_type")
                        .table(SupplyItems::Table)
                        .col(SupplyItems::Type)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SupplyItems::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000002_create_usage_records_table {
    use super::{SupplyItems, UsageRecords};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_usage_records_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(UsageRecords::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(UsageRecords::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(UsageRecords::SupplyId).integer().not_null())
                        .col(
                            ColumnDef::new(UsageRecords::QuantityUsed)
                                .integer()
                                .not_null()
                                .check(Expr::col(UsageRecords::QuantityUsed).gt(0)),
                        )
                        .col(ColumnDef::new(UsageRecords::UsedBy).string().not_null())
                        .col(ColumnDef::new(UsageRecords::Department).string().not_null())
                        .col(ColumnDef::new(UsageRecords::Purpose).string().null())
                        .col(
                            ColumnDef::new(UsageRecords::UsedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_usage_records_supply_id")
                                .from(UsageRecords::Table, UsageRecords::SupplyId)
                                .to(SupplyItems::Table, SupplyItems::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_usage_records_supply_id")
                        .table(UsageRecords::Table)
                        .col(UsageRecords::SupplyId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_usage_records_used_at")
                        .table(UsageRecords::Table)
                        .col(UsageRecords::UsedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(UsageRecords::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000003_create_supply_requests_table {
    use super::{SupplyItems, SupplyRequests};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_supply_requests_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(SupplyRequests::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SupplyRequests::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(SupplyRequests::SupplyId).integer().not_null())
                        .col(
                            ColumnDef::new(SupplyRequests::Quantity)
                                .integer()
                                .not_null()
                                .check(Expr::col(SupplyRequests::Quantity).gt(0)),
                        )
                        .col(ColumnDef::new(SupplyRequests::RequestedBy).string().not_null())
                        .col(ColumnDef::new(SupplyRequests::Department).string().not_null())
                        .col(
                            ColumnDef::new(SupplyRequests::Status)
                                .string_len(16)
                                .not_null()
                                .default("pending"),
                        )
                        .col(
                            ColumnDef::new(SupplyRequests::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SupplyRequests::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_supply_requests_supply_id")
                                .from(SupplyRequests::Table, SupplyRequests::SupplyId)
                                .to(SupplyItems::Table, SupplyItems::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_supply_requests_status")
                        .table(SupplyRequests::Table)
                        .col(SupplyRequests::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SupplyRequests::Table).to_owned())
                .await
        }
    }
}
