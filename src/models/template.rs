use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One template per (event_type, language, channel), unique-indexed. Email
/// rows additionally carry subject/html patterns. Read-only at runtime;
/// managed as seed/admin data.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "templates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "String(StringLen::N(50))")]
    pub event_type: String,
    #[sea_orm(column_type = "String(StringLen::N(10))")]
    pub language: String,
    #[sea_orm(column_type = "String(StringLen::N(10))")]
    pub channel: String,
    #[sea_orm(column_type = "Text")]
    pub title_pattern: String,
    #[sea_orm(column_type = "Text")]
    pub message_pattern: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub email_subject_pattern: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub email_html_pattern: Option<String>,
    /// Default priority for the event type.
    #[sea_orm(column_type = "String(StringLen::N(10))")]
    pub priority: String,
    pub is_active: bool,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
