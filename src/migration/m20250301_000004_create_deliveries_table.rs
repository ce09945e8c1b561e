use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Deliveries {
    Table,
    Id,
    NotificationId,
    UserId,
    Title,
    Message,
    IsRead,
    ReadAt,
    IsVisible,
    HiddenAt,
    IsEmailSent,
    EmailSentAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Notifications {
    Table,
    Id,
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
                    .table(Deliveries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Deliveries::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Deliveries::NotificationId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Deliveries::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(Deliveries::Title)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Deliveries::Message)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Deliveries::IsRead)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Deliveries::ReadAt).timestamp())
                    .col(
                        ColumnDef::new(Deliveries::IsVisible)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Deliveries::HiddenAt).timestamp())
                    .col(
                        ColumnDef::new(Deliveries::IsEmailSent)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Deliveries::EmailSentAt).timestamp())
                    .col(
                        ColumnDef::new(Deliveries::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_deliveries_notification_id")
                            .from(Deliveries::Table, Deliveries::NotificationId)
                            .to(Notifications::Table, Notifications::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_deliveries_user_id")
                            .from(Deliveries::Table, Deliveries::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Fan-out retries rely on this: a duplicate (notification, user)
        // insert must conflict, not create a second row.
        manager
            .create_index(
                Index::create()
                    .name("uq_deliveries_notification_user")
                    .table(Deliveries::Table)
                    .col(Deliveries::NotificationId)
                    .col(Deliveries::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Partial index for the visible-inbox query
        let db = manager.get_connection();
        db.execute_unprepared(
            "CREATE INDEX idx_deliveries_visible ON deliveries (user_id, is_visible) WHERE is_visible = TRUE",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Deliveries::Table).to_owned())
            .await
    }
}
