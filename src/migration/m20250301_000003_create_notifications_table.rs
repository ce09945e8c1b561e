use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Notifications {
    Table,
    Id,
    EventType,
    Payload,
    RelatedEntityType,
    RelatedEntityId,
    TargetRoles,
    Priority,
    CreatedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Notifications::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Notifications::EventType)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Notifications::Payload).json().not_null())
                    .col(ColumnDef::new(Notifications::RelatedEntityType).string_len(20))
                    .col(ColumnDef::new(Notifications::RelatedEntityId).integer())
                    .col(ColumnDef::new(Notifications::TargetRoles).json().not_null())
                    .col(
                        ColumnDef::new(Notifications::Priority)
                            .string_len(10)
                            .not_null()
                            .default("medium"),
                    )
                    .col(ColumnDef::new(Notifications::CreatedBy).integer())
                    .col(
                        ColumnDef::new(Notifications::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notifications_created_by")
                            .from(Notifications::Table, Notifications::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_notifications_event_type")
                    .table(Notifications::Table)
                    .col(Notifications::EventType)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Notifications::Table).to_owned())
            .await
    }
}
