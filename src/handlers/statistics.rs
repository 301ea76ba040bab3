use axum::{extract::State, response::Json};

use crate::{services::statistics::Statistics, ApiResponse, ApiResult, AppState};

#[utoipa::path(
    get,
    path = "/api/v1/statistics",
    summary = "Inventory statistics",
    description = "Counts, stock totals and the six-month usage trend",
    responses(
        (status = 200, description = "Statistics", body = ApiResponse<Statistics>),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "statistics"
)]
pub async fn get_statistics(State(state): State<AppState>) -> ApiResult<Statistics> {
    let stats = state.services.statistics.get_statistics().await?;
    Ok(Json(ApiResponse::success(stats)))
}
