use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Immutable broadcast record, one per published event. Per-recipient state
/// lives on `delivery`, never here.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "String(StringLen::N(50))")]
    pub event_type: String,
    /// Variable bag the templates render against.
    pub payload: Json,
    #[sea_orm(column_type = "String(StringLen::N(20))", nullable)]
    pub related_entity_type: Option<String>,
    pub related_entity_id: Option<i32>,
    /// Role names as a JSON array; empty array means every active user.
    pub target_roles: Json,
    #[sea_orm(column_type = "String(StringLen::N(10))")]
    pub priority: String,
    /// None for system-generated events.
    pub created_by: Option<i32>,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::delivery::Entity")]
    Delivery,
}

impl Related<super::delivery::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Delivery.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
