/*!
 * # Health Check Module
 *
 * - Basic health check (`/health`) - database reachability, 503 when down
 * - Liveness check (`/health/live`) - the process is serving requests
 * - Version (`/health/version`) - build information
 */

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use tracing::{debug, error};

use crate::{db, AppState};

/// Basic health status
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Up,
    Down,
}

/// Health check detail
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HealthDetail {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Overall health information
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HealthInfo {
    pub status: HealthStatus,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub details: BTreeMap<String, HealthDetail>,
}

impl HealthInfo {
    fn from_details(details: BTreeMap<String, HealthDetail>) -> Self {
        let status = if details.values().any(|d| d.status == HealthStatus::Down) {
            HealthStatus::Down
        } else {
            HealthStatus::Up
        };
        Self {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            details,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.status {
            HealthStatus::Up => StatusCode::OK,
            HealthStatus::Down => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Checks the database and reports overall status
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    debug!("Health check endpoint called");

    let database = match db::check_connection(&state.db).await {
        Ok(()) => HealthDetail {
            status: HealthStatus::Up,
            message: None,
        },
        Err(e) => {
            error!("Database health check failed: {}", e);
            HealthDetail {
                status: HealthStatus::Down,
                message: Some("database unreachable".to_string()),
            }
        }
    };

    let mut details = BTreeMap::new();
    details.insert("database".to_string(), database);
    let health = HealthInfo::from_details(details);

    (health.status_code(), Json(health))
}

/// Liveness check endpoint
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "alive": true,
            "timestamp": Utc::now().to_rfc3339(),
        })),
    )
}

/// Returns build and version information
pub async fn version_info() -> impl IntoResponse {
    Json(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "service": env!("CARGO_PKG_NAME"),
    }))
}

/// Health routes, nested under `/health`
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health_check))
        .route("/live", get(liveness_check))
        .route("/version", get(version_info))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_down_component_marks_service_down() {
        let mut details = BTreeMap::new();
        details.insert(
            "database".to_string(),
            HealthDetail {
                status: HealthStatus::Down,
                message: None,
            },
        );
        let health = HealthInfo::from_details(details);
        assert_eq!(health.status, HealthStatus::Down);
        assert_eq!(health.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn no_components_is_up() {
        let health = HealthInfo::from_details(BTreeMap::new());
        assert_eq!(health.status_code(), StatusCode::OK);
        let json = serde_json::to_value(&health).unwrap();
        assert_eq!(json["status"], "up");
    }
}
