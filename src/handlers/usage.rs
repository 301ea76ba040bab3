use axum::{
    extract::{Query, State},
    response::Json,
    routing::{get, post},
    Router,
};

use super::common::{created_response, Created};
use crate::{
    entities::usage_record,
    errors::ServiceError,
    services::{
        ledger::RecordUsageInput,
        statistics::{UsageHistoryFilter, UsageHistoryQuery, UsageWithSupply},
    },
    ApiResponse, ApiResult, AppState,
};

pub fn usage_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(record_usage))
        .route("/history", get(get_usage_history))
}

#[utoipa::path(
    post,
    path = "/api/v1/usage",
    summary = "Record usage",
    description = "Decrements stock and logs who consumed it",
    request_body = RecordUsageInput,
    responses(
        (status = 201, description = "Usage recorded", body = ApiResponse<usage_record::Model>),
        (status = 400, description = "Invalid usage data", body = crate::errors::ErrorResponse),
        (status = 404, description = "Supply item not found", body = crate::errors::ErrorResponse),
        (status = 422, description = "Insufficient stock", body = crate::errors::ErrorResponse),
    ),
    tag = "usage"
)]
pub async fn record_usage(
    State(state): State<AppState>,
    Json(input): Json<RecordUsageInput>,
) -> Result<Created<usage_record::Model>, ServiceError> {
    let record = state.services.ledger.record_usage(input).await?;
    Ok(created_response(record))
}

#[utoipa::path(
    get,
    path = "/api/v1/usage/history",
    summary = "Usage history",
    description = "Usage records with supply names, newest first. Filters combine with AND.",
    params(UsageHistoryQuery),
    responses(
        (status = 200, description = "Usage history", body = ApiResponse<Vec<UsageWithSupply>>),
        (status = 400, description = "Invalid filter", body = crate::errors::ErrorResponse),
    ),
    tag = "usage"
)]
pub async fn get_usage_history(
    State(state): State<AppState>,
    Query(query): Query<UsageHistoryQuery>,
) -> ApiResult<Vec<UsageWithSupply>> {
    let filter = UsageHistoryFilter::try_from(query)?;
    let history = state.services.statistics.get_usage_history(&filter).await?;
    Ok(Json(ApiResponse::success(history)))
}
