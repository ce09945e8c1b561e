use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Templates {
    Table,
    Id,
    EventType,
    Language,
    Channel,
    TitlePattern,
    MessagePattern,
    EmailSubjectPattern,
    EmailHtmlPattern,
    Priority,
    IsActive,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Templates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Templates::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Templates::EventType)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Templates::Language)
                            .string_len(10)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Templates::Channel).string_len(10).not_null())
                    .col(ColumnDef::new(Templates::TitlePattern).text().not_null())
                    .col(ColumnDef::new(Templates::MessagePattern).text().not_null())
                    .col(ColumnDef::new(Templates::EmailSubjectPattern).text())
                    .col(ColumnDef::new(Templates::EmailHtmlPattern).text())
                    .col(
                        ColumnDef::new(Templates::Priority)
                            .string_len(10)
                            .not_null()
                            .default("medium"),
                    )
                    .col(
                        ColumnDef::new(Templates::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Templates::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_templates_type_language_channel")
                    .table(Templates::Table)
                    .col(Templates::EventType)
                    .col(Templates::Language)
                    .col(Templates::Channel)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Templates::Table).to_owned())
            .await
    }
}
