use crate::{
    db::{self, DbPool},
    entities::{
        supply_item::{self, Entity as SupplyItem},
        supply_request::{self, Entity as SupplyRequest},
        usage_record::{self, Entity as UsageRecord},
    },
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

/// Reorder threshold used when a new supply does not specify one.
pub const DEFAULT_MIN_QUANTITY: i32 = 5;

fn default_min_quantity() -> i32 {
    DEFAULT_MIN_QUANTITY
}

/// Fields of a supply item accepted on create and on full update.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SupplyInput {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1, message = "type is required"))]
    pub supply_type: String,
    #[validate(length(min = 1, message = "model is required"))]
    pub model: String,
    #[validate(range(min = 0, message = "quantity must not be negative"))]
    pub quantity: i32,
    #[serde(default = "default_min_quantity")]
    #[validate(range(min = 0, message = "min_quantity must not be negative"))]
    pub min_quantity: i32,
    #[validate(length(min = 1, message = "unit is required"))]
    pub unit: String,
    #[serde(default)]
    pub location: Option<String>,
}

/// Administrative catalog of supply items.
#[derive(Clone)]
pub struct SupplyService {
    db_pool: Arc<DatabaseConnection>,
}

impl SupplyService {
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn list_supplies(&self) -> Result<Vec<supply_item::Model>, ServiceError> {
        let items = SupplyItem::find()
            .order_by_asc(supply_item::Column::Name)
            .order_by_asc(supply_item::Column::Id)
            .all(self.db())
            .await?;
        Ok(items)
    }

    #[instrument(skip(self))]
    pub async fn get_supply(&self, id: i32) -> Result<supply_item::Model, ServiceError> {
        SupplyItem::find_by_id(id)
            .one(self.db())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Supply item {} not found", id)))
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_supply(&self, input: SupplyInput) -> Result<supply_item::Model, ServiceError> {
        input.validate()?;

        let now = Utc::now();
        let item = supply_item::ActiveModel {
            name: Set(input.name),
            supply_type: Set(input.supply_type),
            model: Set(input.model),
            quantity: Set(input.quantity),
            min_quantity: Set(input.min_quantity),
            unit: Set(input.unit),
            location: Set(input.location),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.db())
        .await?;

        info!(supply_id = item.id, "Supply item created");
        Ok(item)
    }

    /// Replaces the descriptive fields and stock levels of an item.
    #[instrument(skip(self, input))]
    pub async fn update_supply(
        &self,
        id: i32,
        input: SupplyInput,
    ) -> Result<supply_item::Model, ServiceError> {
        input.validate()?;

        let item = db::transaction(&self.db_pool, "update_supply", move |txn| {
            let input = input.clone();
            Box::pin(async move {
                let existing = SupplyItem::find_by_id(id)
                    .one(txn)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("Supply item {} not found", id))
                    })?;

                let mut active: supply_item::ActiveModel = existing.into();
                active.name = Set(input.name);
                active.supply_type = Set(input.supply_type);
                active.model = Set(input.model);
                active.quantity = Set(input.quantity);
                active.min_quantity = Set(input.min_quantity);
                active.unit = Set(input.unit);
                active.location = Set(input.location);
                active.updated_at = Set(Utc::now());

                Ok::<_, ServiceError>(active.update(txn).await?)
            })
        })
        .await?;

        info!(supply_id = item.id, "Supply item updated");
        Ok(item)
    }

    /// Deletes an item that nothing references. Items with usage history or
    /// requests are kept and the call fails with `Conflict`.
    #[instrument(skip(self))]
    pub async fn delete_supply(&self, id: i32) -> Result<(), ServiceError> {
        db::transaction(&self.db_pool, "delete_supply", move |txn| {
            Box::pin(async move {
                SupplyItem::find_by_id(id)
                    .one(txn)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("Supply item {} not found", id))
                    })?;

                let usage_count = UsageRecord::find()
                    .filter(usage_record::Column::SupplyId.eq(id))
                    .count(txn)
                    .await?;
                let request_count = SupplyRequest::find()
                    .filter(supply_request::Column::SupplyId.eq(id))
                    .count(txn)
                    .await?;

                if usage_count > 0 || request_count > 0 {
                    return Err(ServiceError::Conflict(format!(
                        "supply item {} is referenced by {} usage record(s) and {} request(s)",
                        id, usage_count, request_count
                    )));
                }

                SupplyItem::delete_by_id(id).exec(txn).await?;
                Ok(())
            })
        })
        .await?;

        info!(supply_id = id, "Supply item deleted");
        Ok(())
    }

    /// Inserts the demo catalog when the table is empty. Returns how many
    /// rows were written.
    #[instrument(skip(self))]
    pub async fn seed_demo_data(&self) -> Result<usize, ServiceError> {
        if SupplyItem::find().count(self.db()).await? > 0 {
            return Ok(0);
        }

        let catalog = demo_catalog();
        let count = catalog.len();
        for input in catalog {
            self.create_supply(input).await?;
        }

        info!(count, "Seeded demo supply catalog");
        Ok(count)
    }

    fn db(&self) -> &DbPool {
        self.db_pool.as_ref()
    }
}

fn demo_catalog() -> Vec<SupplyInput> {
    let item = |name: &str,
                supply_type: &str,
                model: &str,
                quantity: i32,
                min_quantity: i32,
                unit: &str| {
        SupplyInput {
            name: name.to_string(),
            supply_type: supply_type.to_string(),
            model: model.to_string(),
            quantity,
            min_quantity,
            unit: unit.to_string(),
            location: Some("Supply room".to_string()),
        }
    };

    vec![
        item("HP LaserJet toner", "toner", "HP 85A", 10, 3, "pcs"),
        item("A4 copy paper", "paper", "A4 80gsm", 50, 10, "ream"),
        item("Canon ink cartridge", "cartridge", "Canon 045", 8, 2, "pcs"),
        item("Epson ink bottle", "ink", "Epson 002", 5, 2, "bottle"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{insert_supply, insert_usage_at, memory_db};
    use assert_matches::assert_matches;

    fn input(name: &str, quantity: i32) -> SupplyInput {
        SupplyInput {
            name: name.into(),
            supply_type: "toner".into(),
            model: "X1".into(),
            quantity,
            min_quantity: 2,
            unit: "pcs".into(),
            location: None,
        }
    }

    #[test]
    fn min_quantity_defaults_to_five() {
        let parsed: SupplyInput = serde_json::from_value(serde_json::json!({
            "name": "Stapler pins",
            "type": "misc",
            "model": "24/6",
            "quantity": 12,
            "unit": "box"
        }))
        .unwrap();
        assert_eq!(parsed.min_quantity, DEFAULT_MIN_QUANTITY);
        assert_eq!(parsed.supply_type, "misc");
    }

    #[tokio::test]
    async fn create_and_list_sorted_by_name() {
        let db = memory_db().await;
        let service = SupplyService::new(db);
        service.create_supply(input("Toner", 3)).await.unwrap();
        service.create_supply(input("Binder clips", 30)).await.unwrap();

        let names: Vec<String> = service
            .list_supplies()
            .await
            .unwrap()
            .into_iter()
            .map(|item| item.name)
            .collect();
        assert_eq!(names, vec!["Binder clips", "Toner"]);
    }

    #[tokio::test]
    async fn create_rejects_invalid_fields() {
        let db = memory_db().await;
        let service = SupplyService::new(db);

        let err = service.create_supply(input("", 1)).await.unwrap_err();
        assert_matches!(err, ServiceError::ValidationError(_));
        let err = service.create_supply(input("Toner", -1)).await.unwrap_err();
        assert_matches!(err, ServiceError::ValidationError(_));
    }

    #[tokio::test]
    async fn update_replaces_fields() {
        let db = memory_db().await;
        let service = SupplyService::new(db);
        let created = service.create_supply(input("Toner", 3)).await.unwrap();

        let mut changed = input("Toner XL", 9);
        changed.location = Some("Cabinet B".into());
        let updated = service.update_supply(created.id, changed).await.unwrap();

        assert_eq!(updated.name, "Toner XL");
        assert_eq!(updated.quantity, 9);
        assert_eq!(updated.location.as_deref(), Some("Cabinet B"));
        assert!(updated.updated_at >= created.updated_at);

        let missing = service.update_supply(9999, input("x", 1)).await.unwrap_err();
        assert_matches!(missing, ServiceError::NotFound(_));
    }

    #[tokio::test]
    async fn delete_refuses_referenced_items() {
        let db = memory_db().await;
        let service = SupplyService::new(db.clone());
        let used = insert_supply(&db, "Used", 5, 1).await;
        let unused = insert_supply(&db, "Unused", 5, 1).await;
        insert_usage_at(&db, used.id, 1, "IT", Utc::now()).await;

        let err = service.delete_supply(used.id).await.unwrap_err();
        assert_matches!(err, ServiceError::Conflict(_));
        assert!(service.get_supply(used.id).await.is_ok());

        service.delete_supply(unused.id).await.unwrap();
        assert_matches!(
            service.get_supply(unused.id).await,
            Err(ServiceError::NotFound(_))
        );
        assert_matches!(
            service.delete_supply(unused.id).await,
            Err(ServiceError::NotFound(_))
        );
    }

    #[tokio::test]
    async fn seeding_only_fills_an_empty_catalog() {
        let db = memory_db().await;
        let service = SupplyService::new(db);

        assert_eq!(service.seed_demo_data().await.unwrap(), 4);
        assert_eq!(service.seed_demo_data().await.unwrap(), 0);
        assert_eq!(service.list_supplies().await.unwrap().len(), 4);
    }
}
