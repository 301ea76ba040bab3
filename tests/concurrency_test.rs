mod common;

use assert_matches::assert_matches;
use common::TestApp;
use office_supplies_api::{
    entities::RequestStatus,
    errors::ServiceError,
    services::{ledger::RecordUsageInput, requests::CreateRequestInput},
};

fn usage(supply_id: i32, quantity_used: i32) -> RecordUsageInput {
    RecordUsageInput {
        supply_id,
        quantity_used,
        used_by: "load".to_string(),
        department: "Ops".to_string(),
        purpose: Some("concurrency".to_string()),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_usage_never_overdraws() {
    let app = TestApp::new().await;
    let item = app.seed_supply("HP 85A", 10, 3).await;

    let mut tasks = Vec::new();
    for _ in 0..4 {
        let ledger = app.state.services.ledger.clone();
        let supply_id = item.id;
        tasks.push(tokio::spawn(async move {
            ledger.record_usage(usage(supply_id, 3)).await
        }));
    }

    let mut succeeded = 0;
    let mut insufficient = 0;
    for task in tasks {
        match task.await.expect("task panicked") {
            Ok(_) => succeeded += 1,
            Err(err) => {
                assert_matches!(err, ServiceError::InsufficientStock(_));
                insufficient += 1;
            }
        }
    }

    assert_eq!(succeeded, 3);
    assert_eq!(insufficient, 1);
    assert_eq!(app.quantity_of(item.id).await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn different_items_are_independent() {
    let app = TestApp::new().await;
    let toner = app.seed_supply("toner", 6, 1).await;
    let paper = app.seed_supply("paper", 6, 1).await;

    let mut tasks = Vec::new();
    for supply_id in [toner.id, paper.id, toner.id, paper.id] {
        let ledger = app.state.services.ledger.clone();
        tasks.push(tokio::spawn(async move {
            ledger.record_usage(usage(supply_id, 3)).await
        }));
    }
    for task in tasks {
        task.await.expect("task panicked").expect("usage fits");
    }

    assert_eq!(app.quantity_of(toner.id).await, 0);
    assert_eq!(app.quantity_of(paper.id).await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_completions_credit_once() {
    let app = TestApp::new().await;
    let item = app.seed_supply("Canon 045", 2, 2).await;
    let request = app
        .state
        .services
        .requests
        .create_request(CreateRequestInput {
            supply_id: item.id,
            quantity: 10,
            requested_by: "dana".to_string(),
            department: "Admin".to_string(),
        })
        .await
        .unwrap();

    let mut tasks = Vec::new();
    for _ in 0..3 {
        let requests = app.state.services.requests.clone();
        let id = request.id;
        tasks.push(tokio::spawn(async move {
            requests
                .update_request_status(id, RequestStatus::Completed)
                .await
        }));
    }
    for task in tasks {
        let updated = task.await.expect("task panicked").expect("completion ok");
        assert_eq!(updated.status, RequestStatus::Completed);
    }

    assert_eq!(app.quantity_of(item.id).await, 12);
}

const POOL_CONNECTIONS: u32 = 8;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_usage_on_a_shared_file_database_never_overdraws() {
    let app = TestApp::with_file_database(POOL_CONNECTIONS).await;
    let item = app.seed_supply("HP 85A", 10, 3).await;

    let barrier = std::sync::Arc::new(tokio::sync::Barrier::new(4));
    let mut tasks = Vec::new();
    for _ in 0..4 {
        let ledger = app.state.services.ledger.clone();
        let barrier = barrier.clone();
        let supply_id = item.id;
        tasks.push(tokio::spawn(async move {
            barrier.wait().await;
            ledger.record_usage(usage(supply_id, 3)).await
        }));
    }

    let mut succeeded = 0;
    let mut insufficient = 0;
    for task in tasks {
        match task.await.expect("task panicked") {
            Ok(_) => succeeded += 1,
            Err(err) => {
                assert_matches!(err, ServiceError::InsufficientStock(_));
                insufficient += 1;
            }
        }
    }

    assert_eq!(succeeded, 3);
    assert_eq!(insufficient, 1);
    assert_eq!(app.quantity_of(item.id).await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_completions_on_a_shared_file_database_credit_once() {
    let app = TestApp::with_file_database(POOL_CONNECTIONS).await;
    let item = app.seed_supply("Canon 045", 2, 2).await;
    let request = app
        .state
        .services
        .requests
        .create_request(CreateRequestInput {
            supply_id: item.id,
            quantity: 10,
            requested_by: "dana".to_string(),
            department: "Admin".to_string(),
        })
        .await
        .unwrap();

    let barrier = std::sync::Arc::new(tokio::sync::Barrier::new(4));
    let mut tasks = Vec::new();
    for _ in 0..4 {
        let requests = app.state.services.requests.clone();
        let barrier = barrier.clone();
        let id = request.id;
        tasks.push(tokio::spawn(async move {
            barrier.wait().await;
            requests
                .update_request_status(id, RequestStatus::Completed)
                .await
        }));
    }
    for task in tasks {
        let updated = task.await.expect("task panicked").expect("completion ok");
        assert_eq!(updated.status, RequestStatus::Completed);
    }

    assert_eq!(app.quantity_of(item.id).await, 12);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn usage_and_completion_interleave_without_store_errors() {
    let app = TestApp::with_file_database(POOL_CONNECTIONS).await;
    let item = app.seed_supply("A4", 10, 2).await;
    let request = app
        .state
        .services
        .requests
        .create_request(CreateRequestInput {
            supply_id: item.id,
            quantity: 5,
            requested_by: "erin".to_string(),
            department: "Ops".to_string(),
        })
        .await
        .unwrap();

    let barrier = std::sync::Arc::new(tokio::sync::Barrier::new(5));
    let mut usages = Vec::new();
    for _ in 0..4 {
        let ledger = app.state.services.ledger.clone();
        let barrier = barrier.clone();
        let supply_id = item.id;
        usages.push(tokio::spawn(async move {
            barrier.wait().await;
            ledger.record_usage(usage(supply_id, 3)).await
        }));
    }
    let requests = app.state.services.requests.clone();
    let completion = tokio::spawn(async move {
        barrier.wait().await;
        requests
            .update_request_status(request.id, RequestStatus::Completed)
            .await
    });

    completion
        .await
        .expect("task panicked")
        .expect("completion ok");
    let mut succeeded = 0;
    for task in usages {
        match task.await.expect("task panicked") {
            Ok(_) => succeeded += 1,
            Err(err) => assert_matches!(err, ServiceError::InsufficientStock(_)),
        }
    }

    assert!(succeeded >= 3);
    assert_eq!(app.quantity_of(item.id).await, 10 + 5 - 3 * succeeded);
}
