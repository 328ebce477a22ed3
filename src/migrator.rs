use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_warehouse_slots_table::Migration),
            Box::new(m20240101_000002_create_movement_logs_table::Migration),
            Box::new(m20240101_000003_create_user_profiles_table::Migration),
            Box::new(m20240101_000004_create_expedition_logs_table::Migration),
            Box::new(m20240101_000005_create_supply_tables::Migration),
            Box::new(m20240101_000006_create_task_tables::Migration),
        ]
    }
}

mod m20240101_000001_create_warehouse_slots_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_warehouse_slots_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(WarehouseSlots::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(WarehouseSlots::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WarehouseSlots::Code)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(WarehouseSlots::Status)
                                .string()
                                .not_null()
                                .default("empty"),
                        )
                        .col(ColumnDef::new(WarehouseSlots::Size).string().not_null())
                        .col(
                            ColumnDef::new(WarehouseSlots::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(WarehouseSlots::IsScannedOnce)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(WarehouseSlots::LastUpdated)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WarehouseSlots::CreatedAt)
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
                        .name("idx_warehouse_slots_scanned")
                        .table(WarehouseSlots::Table)
                        .col(WarehouseSlots::IsScannedOnce)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(WarehouseSlots::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum WarehouseSlots {
        Table,
        Id,
        Code,
        Status,
        Size,
        Quantity,
        IsScannedOnce,
        LastUpdated,
        CreatedAt,
    }
}

mod m20240101_000002_create_movement_logs_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_movement_logs_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(MovementLogs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(MovementLogs::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MovementLogs::OperatorName)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MovementLogs::OperatorEmail)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(MovementLogs::CartId).string().null())
                        .col(ColumnDef::new(MovementLogs::SlotCode).string().not_null())
                        .col(
                            ColumnDef::new(MovementLogs::OldQuantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MovementLogs::NewQuantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MovementLogs::CreatedAt)
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
                        .name("idx_movement_logs_created_at")
                        .table(MovementLogs::Table)
                        .col(MovementLogs::CreatedAt)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_movement_logs_operator_email")
                        .table(MovementLogs::Table)
                        .col(MovementLogs::OperatorEmail)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(MovementLogs::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum MovementLogs {
        Table,
        Id,
        OperatorName,
        OperatorEmail,
        CartId,
        SlotCode,
        OldQuantity,
        NewQuantity,
        CreatedAt,
    }
}

mod m20240101_000003_create_user_profiles_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_user_profiles_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(UserProfiles::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(UserProfiles::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(UserProfiles::Email)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(UserProfiles::FullName).string().not_null())
                        .col(
                            ColumnDef::new(UserProfiles::Role)
                                .string()
                                .not_null()
                                .default("viewer"),
                        )
                        .col(
                            ColumnDef::new(UserProfiles::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(UserProfiles::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum UserProfiles {
        Table,
        Id,
        Email,
        FullName,
        Role,
        CreatedAt,
    }
}

mod m20240101_000004_create_expedition_logs_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_expedition_logs_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ExpeditionLogs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ExpeditionLogs::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ExpeditionLogs::DockId).string().not_null())
                        .col(ColumnDef::new(ExpeditionLogs::Side).string().not_null())
                        .col(ColumnDef::new(ExpeditionLogs::TruckId).string().not_null())
                        .col(
                            ColumnDef::new(ExpeditionLogs::Status)
                                .string()
                                .not_null()
                                .default("loading"),
                        )
                        .col(
                            ColumnDef::new(ExpeditionLogs::StartedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ExpeditionLogs::FinishedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_expedition_logs_dock_side_status")
                        .table(ExpeditionLogs::Table)
                        .col(ExpeditionLogs::DockId)
                        .col(ExpeditionLogs::Side)
                        .col(ExpeditionLogs::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ExpeditionLogs::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ExpeditionLogs {
        Table,
        Id,
        DockId,
        Side,
        TruckId,
        Status,
        StartedAt,
        FinishedAt,
    }
}

mod m20240101_000005_create_supply_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_supply_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(WarehouseSupplies::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(WarehouseSupplies::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WarehouseSupplies::Name)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(WarehouseSupplies::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(WarehouseSupplies::MinQuantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(WarehouseSupplies::Unit).string().not_null())
                        .col(
                            ColumnDef::new(WarehouseSupplies::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(WarehouseSupplyLogs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(WarehouseSupplyLogs::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WarehouseSupplyLogs::SupplyId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WarehouseSupplyLogs::ChangeAmount)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(WarehouseSupplyLogs::Comment).string().null())
                        .col(
                            ColumnDef::new(WarehouseSupplyLogs::OperatorEmail)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WarehouseSupplyLogs::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_supply_logs_supply_id")
                                .from(WarehouseSupplyLogs::Table, WarehouseSupplyLogs::SupplyId)
                                .to(WarehouseSupplies::Table, WarehouseSupplies::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(WarehouseSupplyLogs::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(WarehouseSupplies::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum WarehouseSupplies {
        Table,
        Id,
        Name,
        Quantity,
        MinQuantity,
        Unit,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum WarehouseSupplyLogs {
        Table,
        Id,
        SupplyId,
        ChangeAmount,
        Comment,
        OperatorEmail,
        CreatedAt,
    }
}

mod m20240101_000006_create_task_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_task_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Tasks::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Tasks::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Tasks::Name)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Tasks::AllowedRoles).string().not_null())
                        .col(
                            ColumnDef::new(Tasks::IsTimed)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(TaskLogs::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(TaskLogs::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(TaskLogs::TaskId).uuid().not_null())
                        .col(ColumnDef::new(TaskLogs::OperatorEmail).string().not_null())
                        .col(
                            ColumnDef::new(TaskLogs::StartTime)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TaskLogs::EndTime)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_task_logs_task_id")
                                .from(TaskLogs::Table, TaskLogs::TaskId)
                                .to(Tasks::Table, Tasks::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_task_logs_operator_email")
                        .table(TaskLogs::Table)
                        .col(TaskLogs::OperatorEmail)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(TaskLogs::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Tasks::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Tasks {
        Table,
        Id,
        Name,
        AllowedRoles,
        IsTimed,
    }

    #[derive(DeriveIden)]
    enum TaskLogs {
        Table,
        Id,
        TaskId,
        OperatorEmail,
        StartTime,
        EndTime,
    }
}
