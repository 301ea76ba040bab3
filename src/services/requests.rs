use crate::{
    db::{self, DbPool},
    entities::{
        supply_item::{self, Entity as SupplyItem},
        supply_request::{self, Entity as SupplyRequest},
        RequestStatus,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use metrics::counter;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateRequestInput {
    pub supply_id: i32,
    #[validate(range(min = 1, message = "quantity must be positive"))]
    pub quantity: i32,
    #[validate(length(min = 1, message = "requested_by is required"))]
    pub requested_by: String,
    #[validate(length(min = 1, message = "department is required"))]
    pub department: String,
}

/// A request row joined with the name of the supply it refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult, ToSchema)]
pub struct RequestWithSupply {
    pub id: i32,
    pub supply_id: i32,
    pub supply_name: String,
    pub quantity: i32,
    pub requested_by: String,
    pub department: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parses a client-supplied status name.
pub fn parse_status(raw: &str) -> Result<RequestStatus, ServiceError> {
    RequestStatus::from_str(raw.trim()).map_err(|_| {
        ServiceError::ValidationError(format!(
            "unknown status '{}', expected one of pending, approved, rejected, completed",
            raw
        ))
    })
}

/// Largest quantity a supply item can hold.
pub const MAX_STOCK: i32 = i32::MAX;

struct StatusChange {
    request: supply_request::Model,
    old_status: RequestStatus,
    credited: bool,
}

/// Replenishment workflow.
///
/// Entering `completed` credits the requested quantity to the supply in the
/// same transaction as the status write. `completed` and `rejected` are
/// terminal, so a request can be credited at most once.
#[derive(Clone)]
pub struct RequestService {
    db_pool: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl RequestService {
    pub fn new(db_pool: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, input), fields(supply_id = input.supply_id, quantity = input.quantity))]
    pub async fn create_request(
        &self,
        input: CreateRequestInput,
    ) -> Result<supply_request::Model, ServiceError> {
        input.validate()?;

        let CreateRequestInput {
            supply_id,
            quantity,
            requested_by,
            department,
        } = input;

        let request = db::transaction(&self.db_pool, "create_request", move |txn| {
            let requested_by = requested_by.clone();
            let department = department.clone();
            Box::pin(async move {
                SupplyItem::find_by_id(supply_id)
                    .one(txn)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("Supply item {} not found", supply_id))
                    })?;

                let now = Utc::now();
                let request = supply_request::ActiveModel {
                    supply_id: Set(supply_id),
                    quantity: Set(quantity),
                    requested_by: Set(requested_by),
                    department: Set(department),
                    status: Set(RequestStatus::Pending),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                Ok::<_, ServiceError>(request)
            })
        })
        .await?;

        counter!("supplies_requests.created", 1);
        info!(request_id = request.id, "Supply request created");

        self.event_sender
            .send_or_log(Event::RequestCreated {
                request_id: request.id,
                supply_id: request.supply_id,
                quantity: request.quantity,
            })
            .await;

        Ok(request)
    }

    /// Moves a request to `new_status`, crediting stock on entry into
    /// `completed`. Writing the current status again is a no-op.
    #[instrument(skip(self))]
    pub async fn update_request_status(
        &self,
        request_id: i32,
        new_status: RequestStatus,
    ) -> Result<supply_request::Model, ServiceError> {
        let change = db::transaction(&self.db_pool, "update_request_status", move |txn| {
            Box::pin(async move {
                let request = SupplyRequest::find_by_id(request_id)
                    .lock_exclusive()
                    .one(txn)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("Supply request {} not found", request_id))
                    })?;

                let old_status = request.status;
                if old_status == new_status {
                    return Ok(StatusChange {
                        request,
                        old_status,
                        credited: false,
                    });
                }

                if old_status.is_terminal() {
                    return Err(ServiceError::InvalidStatus(format!(
                        "request {} is already {} and can no longer change",
                        request_id, old_status
                    )));
                }
                if !old_status.can_transition_to(new_status) {
                    return Err(ServiceError::InvalidStatus(format!(
                        "request {} is {} and cannot become {}",
                        request_id, old_status, new_status
                    )));
                }

                let now = Utc::now();
                let credited = new_status == RequestStatus::Completed;
                if credited {
                    let update = SupplyItem::update_many()
                        .col_expr(
                            supply_item::Column::Quantity,
                            Expr::col(supply_item::Column::Quantity).add(request.quantity),
                        )
                        .col_expr(supply_item::Column::UpdatedAt, Expr::value(now))
                        .filter(supply_item::Column::Id.eq(request.supply_id))
                        .filter(supply_item::Column::Quantity.lte(MAX_STOCK - request.quantity))
                        .exec(txn)
                        .await?;

                    if update.rows_affected == 0 {
                        let item = SupplyItem::find_by_id(request.supply_id)
                            .one(txn)
                            .await?
                            .ok_or_else(|| {
                                ServiceError::NotFound(format!(
                                    "Supply item {} not found",
                                    request.supply_id
                                ))
                            })?;
                        return Err(ServiceError::Conflict(format!(
                            "crediting {} unit(s) to supply {} would exceed the stock limit of {} (current {})",
                            request.quantity, item.id, MAX_STOCK, item.quantity
                        )));
                    }
                }

                let mut active: supply_request::ActiveModel = request.into();
                active.status = Set(new_status);
                active.updated_at = Set(now);
                let request = active.update(txn).await?;

                Ok(StatusChange {
                    request,
                    old_status,
                    credited,
                })
            })
        })
        .await?;

        let StatusChange {
            request,
            old_status,
            credited,
        } = change;

        if old_status == request.status {
            info!(request_id, status = %old_status, "Status unchanged");
            return Ok(request);
        }

        counter!("supplies_requests.status_changed", 1, "status" => request.status.to_string());
        info!(request_id, from = %old_status, to = %request.status, "Request status updated");

        self.event_sender
            .send_or_log(Event::RequestStatusChanged {
                request_id,
                old_status,
                new_status: request.status,
            })
            .await;

        if credited {
            self.event_sender
                .send_or_log(Event::StockCredited {
                    supply_id: request.supply_id,
                    request_id,
                    quantity: request.quantity,
                })
                .await;
        }

        Ok(request)
    }

    /// Requests with their supply name, newest first.
    #[instrument(skip(self))]
    pub async fn list_requests(
        &self,
        status: Option<RequestStatus>,
    ) -> Result<Vec<RequestWithSupply>, ServiceError> {
        let mut query = SupplyRequest::find()
            .select_only()
            .columns([
                supply_request::Column::Id,
                supply_request::Column::SupplyId,
                supply_request::Column::Quantity,
                supply_request::Column::RequestedBy,
                supply_request::Column::Department,
                supply_request::Column::Status,
                supply_request::Column::CreatedAt,
                supply_request::Column::UpdatedAt,
            ])
            .column_as(supply_item::Column::Name, "supply_name")
            .join(JoinType::InnerJoin, supply_request::Relation::SupplyItem.def());

        if let Some(status) = status {
            query = query.filter(supply_request::Column::Status.eq(status));
        }

        let requests = query
            .order_by_desc(supply_request::Column::CreatedAt)
            .order_by_desc(supply_request::Column::Id)
            .into_model::<RequestWithSupply>()
            .all(self.db())
            .await?;

        Ok(requests)
    }

    fn db(&self) -> &DbPool {
        self.db_pool.as_ref()
    }
}
