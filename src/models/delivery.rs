use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-recipient state for one notification: read/visibility for the in-app
/// channel, sent-flag for email. Rows are never deleted; hiding flips
/// `is_visible` so the audit trail survives. At most one row per
/// (notification_id, user_id), enforced by a unique index.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "deliveries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub notification_id: i32,
    pub user_id: i32,
    /// Rendered in the recipient's language at delivery time.
    #[sea_orm(column_type = "Text")]
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub is_read: bool,
    pub read_at: Option<DateTime>,
    pub is_visible: bool,
    pub hidden_at: Option<DateTime>,
    pub is_email_sent: bool,
    pub email_sent_at: Option<DateTime>,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::notification::Entity",
        from = "Column::NotificationId",
        to = "super::notification::Column::Id"
    )]
    Notification,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::notification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notification.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
