use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};

use super::common::{created_response, Created};
use crate::{
    entities::supply_item, errors::ServiceError, services::supplies::SupplyInput, ApiResponse,
    ApiResult, AppState,
};

pub fn supply_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_supplies).post(create_supply))
        .route("/low-stock", get(get_low_stock))
        .route(
            "/:id",
            get(get_supply).put(update_supply).delete(delete_supply),
        )
}

#[utoipa::path(
    get,
    path = "/api/v1/supplies",
    summary = "List supplies",
    description = "All supply items ordered by name",
    responses(
        (status = 200, description = "Supplies retrieved", body = ApiResponse<Vec<supply_item::Model>>),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "supplies"
)]
pub async fn list_supplies(State(state): State<AppState>) -> ApiResult<Vec<supply_item::Model>> {
    let items = state.services.supplies.list_supplies().await?;
    Ok(Json(ApiResponse::success(items)))
}

#[utoipa::path(
    get,
    path = "/api/v1/supplies/low-stock",
    summary = "Low stock",
    description = "Supply items at or below their minimum quantity, most depleted first",
    responses(
        (status = 200, description = "Low-stock items", body = ApiResponse<Vec<supply_item::Model>>),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "supplies"
)]
pub async fn get_low_stock(State(state): State<AppState>) -> ApiResult<Vec<supply_item::Model>> {
    let items = state.services.ledger.get_low_stock().await?;
    Ok(Json(ApiResponse::success(items)))
}

#[utoipa::path(
    get,
    path = "/api/v1/supplies/{id}",
    summary = "Get supply",
    params(("id" = i32, Path, description = "Supply item id")),
    responses(
        (status = 200, description = "Supply item", body = ApiResponse<supply_item::Model>),
        (status = 404, description = "Supply item not found", body = crate::errors::ErrorResponse),
    ),
    tag = "supplies"
)]
pub async fn get_supply(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<supply_item::Model> {
    let item = state.services.supplies.get_supply(id).await?;
    Ok(Json(ApiResponse::success(item)))
}

#[utoipa::path(
    post,
    path = "/api/v1/supplies",
    summary = "Create supply",
    request_body = SupplyInput,
    responses(
        (status = 201, description = "Supply item created", body = ApiResponse<supply_item::Model>),
        (status = 400, description = "Invalid supply data", body = crate::errors::ErrorResponse),
    ),
    tag = "supplies"
)]
pub async fn create_supply(
    State(state): State<AppState>,
    Json(input): Json<SupplyInput>,
) -> Result<Created<supply_item::Model>, ServiceError> {
    let item = state.services.supplies.create_supply(input).await?;
    Ok(created_response(item))
}

#[utoipa::path(
    put,
    path = "/api/v1/supplies/{id}",
    summary = "Update supply",
    params(("id" = i32, Path, description = "Supply item id")),
    request_body = SupplyInput,
    responses(
        (status = 200, description = "Supply item updated", body = ApiResponse<supply_item::Model>),
        (status = 400, description = "Invalid supply data", body = crate::errors::ErrorResponse),
        (status = 404, description = "Supply item not found", body = crate::errors::ErrorResponse),
    ),
    tag = "supplies"
)]
pub async fn update_supply(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<SupplyInput>,
) -> ApiResult<supply_item::Model> {
    let item = state.services.supplies.update_supply(id, input).await?;
    Ok(Json(ApiResponse::success(item)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/supplies/{id}",
    summary = "Delete supply",
    description = "Deletes a supply item that has no usage records or requests",
    params(("id" = i32, Path, description = "Supply item id")),
    responses(
        (status = 204, description = "Supply item deleted"),
        (status = 404, description = "Supply item not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Supply item is still referenced", body = crate::errors::ErrorResponse),
    ),
    tag = "supplies"
)]
pub async fn delete_supply(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServiceError> {
    state.services.supplies.delete_supply(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
