use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One consumption event. Rows are written once and never updated.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "usage_records")]
#[schema(as = UsageRecord)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub supply_id: i32,
    pub quantity_used: i32,
    pub used_by: String,
    pub department: String,
    #[sea_orm(nullable)]
    pub purpose: Option<String>,
    pub used_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::supply_item::Entity",
        from = "Column::SupplyId",
        to = "super::supply_item::Column::Id",
        on_delete = "Restrict"
    )]
    SupplyItem,
}

impl Related<super::supply_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SupplyItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
