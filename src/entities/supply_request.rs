use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Replenishment request for a supply item.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "supply_requests")]
#[schema(as = SupplyRequest)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub supply_id: i32,
    pub quantity: i32,
    pub requested_by: String,
    pub department: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
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

/// Lifecycle of a replenishment request.
///
/// `completed` and `rejected` are terminal. Entering `completed` is the only
/// transition that touches stock.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
    strum::Display,
    strum::EnumString,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RequestStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "completed")]
    Completed,
}

impl RequestStatus {
    /// Terminal requests accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Rejected)
    }

    /// Whether a request in `self` may be moved to `next`.
    ///
    /// Same-status writes are allowed on every state; the caller treats them
    /// as no-ops.
    pub fn can_transition_to(self, next: RequestStatus) -> bool {
        use RequestStatus::*;
        if self == next {
            return true;
        }
        match self {
            Pending => matches!(next, Approved | Rejected | Completed),
            Approved => matches!(next, Completed | Rejected),
            Rejected | Completed => false,
        }
    }
}

impl Default for RequestStatus {
    fn default() -> Self {
        Self::Pending
    }
}
