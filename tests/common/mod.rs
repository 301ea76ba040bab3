#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use office_supplies_api::{
    config::AppConfig,
    db,
    entities::supply_item,
    events,
    services::supplies::SupplyInput,
    AppState,
};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

fn test_config(database_url: String) -> AppConfig {
    let mut cfg = AppConfig::new(
        database_url,
        "127.0.0.1".to_string(),
        18_080,
        "test".to_string(),
    );
    cfg.cors_allow_any_origin = true;
    cfg
}

/// Helper harness for spinning up an application state backed by SQLite.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
    _db_dir: Option<TempDir>,
}

impl TestApp {
    /// Construct a new test application with fresh in-memory database state.
    pub async fn new() -> Self {
        let mut cfg = test_config("sqlite::memory:".to_string());
        // One connection keeps every query on the same in-memory database.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        Self::with_config(cfg, None).await
    }

    /// Application on a SQLite file in a temp directory, served by a pool of
    /// `connections` so transactions really run side by side.
    pub async fn with_file_database(connections: u32) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("supplies.db");
        let mut cfg = test_config(format!("sqlite://{}?mode=rwc", path.display()));
        cfg.db_max_connections = connections;
        cfg.db_min_connections = 1;
        Self::with_config(cfg, Some(dir)).await
    }

    async fn with_config(cfg: AppConfig, db_dir: Option<TempDir>) -> Self {
        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (event_sender, event_rx) = events::channel(256);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = AppState::new(Arc::new(pool), cfg, event_sender);
        let router = office_supplies_api::app_router(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
            _db_dir: db_dir,
        }
    }

    /// Send a request against the router with an optional JSON body.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        self.request_with_headers(method, uri, body, &[]).await
    }

    pub async fn request_with_headers(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> Response {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put_json(&self, uri: &str, body: Value) -> Response {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> Response {
        self.request(Method::DELETE, uri, None).await
    }

    /// Inserts a supply item through the catalog service.
    pub async fn seed_supply(&self, name: &str, quantity: i32, min_quantity: i32) -> supply_item::Model {
        self.state
            .services
            .supplies
            .create_supply(SupplyInput {
                name: name.to_string(),
                supply_type: "toner".to_string(),
                model: format!("{}-M", name),
                quantity,
                min_quantity,
                unit: "pcs".to_string(),
                location: None,
            })
            .await
            .expect("seed supply for tests")
    }

    /// Current stock of a supply, read straight from the service.
    pub async fn quantity_of(&self, supply_id: i32) -> i32 {
        self.state
            .services
            .supplies
            .get_supply(supply_id)
            .await
            .expect("supply exists")
            .quantity
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

/// Reads a response body as JSON.
pub async fn response_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("response body is json")
}

/// Asserts the status and returns the `data` field of a success envelope.
pub async fn expect_data(response: Response, status: StatusCode) -> Value {
    assert_eq!(response.status(), status);
    let body = response_json(response).await;
    assert_eq!(body["success"], true, "unexpected body: {body}");
    body["data"].clone()
}
