mod common;

use axum::http::{Method, StatusCode};
use common::{expect_data, response_json, TestApp};
use serde_json::json;

fn supply_body(name: &str, quantity: i32) -> serde_json::Value {
    json!({
        "name": name,
        "type": "paper",
        "model": "A4 80gsm",
        "quantity": quantity,
        "min_quantity": 10,
        "unit": "ream",
        "location": "Room 2"
    })
}

async fn use_stock(app: &TestApp, supply_id: i32, quantity: i32, department: &str) {
    let response = app
        .post_json(
            "/api/v1/usage",
            json!({
                "supply_id": supply_id,
                "quantity_used": quantity,
                "used_by": "frank",
                "department": department
            }),
        )
        .await;
    expect_data(response, StatusCode::CREATED).await;
}

#[tokio::test]
async fn health_reports_database_up() {
    let app = TestApp::new().await;
    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["details"]["database"]["status"], "up");
}

#[tokio::test]
async fn supply_crud_round() {
    let app = TestApp::new().await;

    let created = expect_data(
        app.post_json("/api/v1/supplies", supply_body("A4 copy paper", 50))
            .await,
        StatusCode::CREATED,
    )
    .await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["type"], "paper");
    assert_eq!(created["min_quantity"], 10);

    let fetched = expect_data(
        app.get(&format!("/api/v1/supplies/{id}")).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(fetched["name"], "A4 copy paper");

    let updated = expect_data(
        app.put_json(
            &format!("/api/v1/supplies/{id}"),
            supply_body("A4 copy paper", 40),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(updated["quantity"], 40);

    let listed = expect_data(app.get("/api/v1/supplies").await, StatusCode::OK).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let response = app.delete(&format!("/api/v1/supplies/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.get(&format!("/api/v1/supplies/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_supply_is_rejected() {
    let app = TestApp::new().await;
    let response = app
        .post_json("/api/v1/supplies", supply_body("", 5))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .post_json("/api/v1/supplies", supply_body("Paper", -3))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn referenced_supply_cannot_be_deleted() {
    let app = TestApp::new().await;
    let item = app.seed_supply("Toner", 5, 1).await;
    use_stock(&app, item.id, 1, "IT").await;

    let response = app.delete(&format!("/api/v1/supplies/{}", item.id)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(app.quantity_of(item.id).await, 4);
}

#[tokio::test]
async fn usage_over_stock_is_unprocessable() {
    let app = TestApp::new().await;
    let item = app.seed_supply("Toner", 2, 1).await;

    let response = app
        .post_json(
            "/api/v1/usage",
            json!({"supply_id": item.id, "quantity_used": 3, "used_by": "g", "department": "IT"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .post_json(
            "/api/v1/usage",
            json!({"supply_id": item.id, "quantity_used": 0, "used_by": "g", "department": "IT"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.quantity_of(item.id).await, 2);
}

#[tokio::test]
async fn low_stock_endpoint_lists_items_at_or_below_minimum() {
    let app = TestApp::new().await;
    let low = app.seed_supply("Low", 2, 2).await;
    app.seed_supply("Plenty", 20, 2).await;

    let data = expect_data(app.get("/api/v1/supplies/low-stock").await, StatusCode::OK).await;
    let rows = data.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"].as_i64(), Some(low.id as i64));
}

#[tokio::test]
async fn usage_history_filters_combine() {
    let app = TestApp::new().await;
    let toner = app.seed_supply("Toner", 20, 1).await;
    let paper = app.seed_supply("Paper", 20, 1).await;
    use_stock(&app, toner.id, 1, "IT").await;
    use_stock(&app, toner.id, 2, "HR").await;
    use_stock(&app, paper.id, 3, "IT").await;

    let all = expect_data(app.get("/api/v1/usage/history").await, StatusCode::OK).await;
    let all = all.as_array().unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0]["supply_name"], "Paper");

    let uri = format!("/api/v1/usage/history?supply_id={}&department=IT", toner.id);
    let both = expect_data(app.get(&uri).await, StatusCode::OK).await;
    let both = both.as_array().unwrap();
    assert_eq!(both.len(), 1);
    assert_eq!(both[0]["quantity_used"], 1);

    let wide = expect_data(
        app.get("/api/v1/usage/history?start_date=2000-01-01&end_date=2999-12-31")
            .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(wide.as_array().unwrap().len(), 3);

    let future = expect_data(
        app.get("/api/v1/usage/history?start_date=2999-01-01").await,
        StatusCode::OK,
    )
    .await;
    assert!(future.as_array().unwrap().is_empty());

    let response = app
        .get("/api/v1/usage/history?start_date=2024-05-02&end_date=2024-05-01")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.get("/api/v1/usage/history?start_date=yesterday").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn statistics_summarise_the_catalog() {
    let app = TestApp::new().await;
    let toner = app.seed_supply("Toner", 10, 3).await;
    app.seed_supply("Paper", 1, 5).await;
    use_stock(&app, toner.id, 4, "IT").await;
    app.post_json(
        "/api/v1/requests",
        json!({"supply_id": toner.id, "quantity": 5, "requested_by": "h", "department": "IT"}),
    )
    .await;

    let stats = expect_data(app.get("/api/v1/statistics").await, StatusCode::OK).await;

    assert_eq!(stats["total_supplies"], 2);
    assert_eq!(stats["total_items"], 7);
    assert_eq!(stats["low_stock_count"], 1);
    assert_eq!(stats["pending_requests"], 1);
    let monthly = stats["monthly_usage"].as_array().unwrap();
    assert_eq!(monthly.len(), 1);
    assert_eq!(monthly[0]["amount"], 4);
}

#[tokio::test]
async fn statistics_on_empty_store_are_zero() {
    let app = TestApp::new().await;
    let stats = expect_data(app.get("/api/v1/statistics").await, StatusCode::OK).await;

    assert_eq!(stats["total_supplies"], 0);
    assert_eq!(stats["total_items"], 0);
    assert_eq!(stats["low_stock_count"], 0);
    assert_eq!(stats["pending_requests"], 0);
    assert!(stats["monthly_usage"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn request_id_is_echoed_and_reported_in_errors() {
    let app = TestApp::new().await;
    let response = app
        .request_with_headers(
            Method::GET,
            "/api/v1/supplies/4242",
            None,
            &[("x-request-id", "req-test-1")],
        )
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "req-test-1"
    );
    let body = response_json(response).await;
    assert_eq!(body["request_id"], "req-test-1");
    assert!(body["message"].as_str().unwrap().contains("4242"));
}
