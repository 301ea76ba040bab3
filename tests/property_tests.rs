mod common;

use common::TestApp;
use office_supplies_api::{errors::ServiceError, services::ledger::RecordUsageInput};
use proptest::prelude::*;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("build runtime")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Any sequence of usages leaves stock equal to the starting quantity
    /// minus what was accepted, and never below zero.
    #[test]
    fn stock_is_conserved_and_never_negative(
        initial in 0i32..40,
        draws in prop::collection::vec(1i32..15, 1..8),
    ) {
        let (accepted, remaining, rejected) = runtime().block_on(async {
            let app = TestApp::new().await;
            let item = app.seed_supply("Prop", initial, 0).await;
            let ledger = app.state.services.ledger.clone();

            let mut accepted = 0;
            let mut rejected = 0;
            for quantity_used in &draws {
                let result = ledger
                    .record_usage(RecordUsageInput {
                        supply_id: item.id,
                        quantity_used: *quantity_used,
                        used_by: "prop".to_string(),
                        department: "QA".to_string(),
                        purpose: None,
                    })
                    .await;
                match result {
                    Ok(_) => accepted += quantity_used,
                    Err(ServiceError::InsufficientStock(_)) => rejected += 1,
                    Err(other) => panic!("unexpected error: {other}"),
                }
            }
            (accepted, app.quantity_of(item.id).await, rejected)
        });

        prop_assert!(remaining >= 0);
        prop_assert_eq!(remaining, initial - accepted);
        if rejected == 0 {
            prop_assert_eq!(accepted, draws.iter().sum::<i32>());
        }
    }
}
