use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-user, per-event-type delivery settings. A missing row means system
/// defaults. Stock thresholds are nullable because they only apply to the
/// stock event types; malformed values are repaired at read time, never
/// rejected at the call site of a stock write.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "preferences")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    #[sea_orm(column_type = "String(StringLen::N(50))")]
    pub notification_type: String,
    pub in_app_enabled: bool,
    pub email_enabled: bool,
    #[sea_orm(column_type = "String(StringLen::N(10))", nullable)]
    pub language: Option<String>,
    pub threshold_low: Option<i32>,
    pub threshold_medium: Option<i32>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl ActiveModelBehavior for ActiveModel {}
