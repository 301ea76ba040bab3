use crate::{
    db::{self, DbPool},
    entities::{
        supply_item::{self, Entity as SupplyItem},
        usage_record,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use metrics::counter;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Input for recording consumption of a supply item.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RecordUsageInput {
    pub supply_id: i32,
    #[validate(range(min = 1, message = "quantity_used must be positive"))]
    pub quantity_used: i32,
    #[validate(length(min = 1, message = "used_by is required"))]
    pub used_by: String,
    #[validate(length(min = 1, message = "department is required"))]
    pub department: String,
    #[serde(default)]
    pub purpose: Option<String>,
}

/// Authority for stock decrements.
///
/// Every decrement runs as one transaction: the item row is locked, the
/// sufficiency check is repeated in the `UPDATE ... WHERE quantity >= n`
/// guard, and the usage record is inserted before commit.
#[derive(Clone)]
pub struct LedgerService {
    db_pool: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl LedgerService {
    pub fn new(db_pool: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Decrements stock and logs the consumption atomically.
    #[instrument(skip(self, input), fields(supply_id = input.supply_id, quantity_used = input.quantity_used))]
    pub async fn record_usage(
        &self,
        input: RecordUsageInput,
    ) -> Result<usage_record::Model, ServiceError> {
        input.validate()?;

        let RecordUsageInput {
            supply_id,
            quantity_used,
            used_by,
            department,
            purpose,
        } = input;

        let result = db::transaction(&self.db_pool, "record_usage", move |txn| {
            let used_by = used_by.clone();
            let department = department.clone();
            let purpose = purpose.clone();
            Box::pin(async move {
                let item = SupplyItem::find_by_id(supply_id)
                    .lock_exclusive()
                    .one(txn)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("Supply item {} not found", supply_id))
                    })?;

                if item.quantity < quantity_used {
                    return Err(insufficient(&item, quantity_used));
                }

                let now = Utc::now();
                let update = SupplyItem::update_many()
                    .col_expr(
                        supply_item::Column::Quantity,
                        Expr::col(supply_item::Column::Quantity).sub(quantity_used),
                    )
                    .col_expr(supply_item::Column::UpdatedAt, Expr::value(now))
                    .filter(supply_item::Column::Id.eq(supply_id))
                    .filter(supply_item::Column::Quantity.gte(quantity_used))
                    .exec(txn)
                    .await?;

                if update.rows_affected == 0 {
                    return Err(insufficient(&item, quantity_used));
                }

                let record = usage_record::ActiveModel {
                    supply_id: Set(supply_id),
                    quantity_used: Set(quantity_used),
                    used_by: Set(used_by),
                    department: Set(department),
                    purpose: Set(purpose),
                    used_at: Set(now),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                Ok((record, item.quantity - quantity_used, item.min_quantity))
            })
        })
        .await;

        let (record, remaining, min_quantity) = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                if matches!(e, ServiceError::InsufficientStock(_)) {
                    counter!("supplies_ledger.insufficient_stock", 1);
                }
                return Err(e);
            }
        };

        counter!("supplies_ledger.usage_recorded", 1);
        info!(
            usage_id = record.id,
            remaining, "Recorded usage of {} unit(s)", record.quantity_used
        );

        self.event_sender
            .send_or_log(Event::UsageRecorded {
                usage_id: record.id,
                supply_id: record.supply_id,
                quantity_used: record.quantity_used,
                remaining,
                department: record.department.clone(),
            })
            .await;

        if remaining <= min_quantity {
            warn!(supply_id = record.supply_id, remaining, min_quantity, "Supply is low on stock");
            self.event_sender
                .send_or_log(Event::LowStockReached {
                    supply_id: record.supply_id,
                    quantity: remaining,
                    min_quantity,
                })
                .await;
        }

        Ok(record)
    }

    /// Items at or below their reorder threshold, most depleted first.
    #[instrument(skip(self))]
    pub async fn get_low_stock(&self) -> Result<Vec<supply_item::Model>, ServiceError> {
        let items = SupplyItem::find()
            .filter(
                Expr::col(supply_item::Column::Quantity)
                    .lte(Expr::col(supply_item::Column::MinQuantity)),
            )
            .order_by_asc(supply_item::Column::Quantity)
            .order_by_asc(supply_item::Column::Id)
            .all(self.db())
            .await?;

        Ok(items)
    }

    fn db(&self) -> &DbPool {
        self.db_pool.as_ref()
    }
}

fn insufficient(item: &supply_item::Model, requested: i32) -> ServiceError {
    ServiceError::InsufficientStock(format!(
        "supply {} has {} unit(s), {} requested",
        item.id, item.quantity, requested
    ))
}
