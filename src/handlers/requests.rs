use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use super::common::{created_response, Created};
use crate::{
    entities::supply_request,
    errors::ServiceError,
    services::requests::{parse_status, CreateRequestInput, RequestWithSupply},
    ApiResponse, ApiResult, AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListRequestsQuery {
    /// Only return requests in this status
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// One of pending, approved, rejected, completed
    pub status: String,
}

pub fn request_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_requests).post(create_request))
        .route("/:id/status", put(update_request_status))
}

#[utoipa::path(
    get,
    path = "/api/v1/requests",
    summary = "List requests",
    params(ListRequestsQuery),
    responses(
        (status = 200, description = "Supply requests, newest first", body = ApiResponse<Vec<RequestWithSupply>>),
        (status = 400, description = "Unknown status filter", body = crate::errors::ErrorResponse),
    ),
    tag = "requests"
)]
pub async fn list_requests(
    State(state): State<AppState>,
    Query(query): Query<ListRequestsQuery>,
) -> ApiResult<Vec<RequestWithSupply>> {
    let status = query
        .status
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .map(parse_status)
        .transpose()?;
    let requests = state.services.requests.list_requests(status).await?;
    Ok(Json(ApiResponse::success(requests)))
}

#[utoipa::path(
    post,
    path = "/api/v1/requests",
    summary = "Create request",
    description = "Opens a replenishment request in pending status",
    request_body = CreateRequestInput,
    responses(
        (status = 201, description = "Request created", body = ApiResponse<supply_request::Model>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 404, description = "Supply item not found", body = crate::errors::ErrorResponse),
    ),
    tag = "requests"
)]
pub async fn create_request(
    State(state): State<AppState>,
    Json(input): Json<CreateRequestInput>,
) -> Result<Created<supply_request::Model>, ServiceError> {
    let request = state.services.requests.create_request(input).await?;
    Ok(created_response(request))
}

#[utoipa::path(
    put,
    path = "/api/v1/requests/{id}/status",
    summary = "Update request status",
    description = "Completing a request credits its quantity to the supply once",
    params(("id" = i32, Path, description = "Supply request id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Request updated", body = ApiResponse<supply_request::Model>),
        (status = 400, description = "Unknown status or illegal transition", body = crate::errors::ErrorResponse),
        (status = 404, description = "Request not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Credit would exceed the stock limit", body = crate::errors::ErrorResponse),
    ),
    tag = "requests"
)]
pub async fn update_request_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<UpdateStatusRequest>,
) -> ApiResult<supply_request::Model> {
    let status = parse_status(&body.status)?;
    let request = state
        .services
        .requests
        .update_request_status(id, status)
        .await?;
    let message = format!("Request {} is {}", request.id, request.status);
    Ok(Json(ApiResponse::success(request).with_message(message)))
}
