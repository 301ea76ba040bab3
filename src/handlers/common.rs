use crate::ApiResponse;
use axum::{http::StatusCode, Json};
use serde::Serialize;

/// Response type for endpoints that create a resource.
pub type Created<T> = (StatusCode, Json<ApiResponse<T>>);

/// Wraps `data` in a 201 success envelope.
pub fn created_response<T: Serialize>(data: T) -> Created<T> {
    (StatusCode::CREATED, Json(ApiResponse::success(data)))
}
