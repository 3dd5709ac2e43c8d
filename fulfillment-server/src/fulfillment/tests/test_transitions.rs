use super::*;
use crate::db::repository::stage;
use shared::models::{ShipmentStatus, StageStatus};

#[tokio::test]
async fn test_confirm_does_not_touch_stage_tables() {
    let pool = test_pool().await;
    let order = create_test_order(&pool).await;
    let machine = test_machine(&pool);

    let outcome = machine
        .apply_transition(order.id, OrderStatus::Confirmed, Default::default())
        .await
        .unwrap();

    assert_eq!(outcome.order.status, OrderStatus::Confirmed);
    assert!(stage::find_production_for_order(&pool, order.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_entering_production_opens_record() {
    let pool = test_pool().await;
    let order = create_test_order(&pool).await;
    let machine = test_machine(&pool);

    machine
        .apply_transition(order.id, OrderStatus::Confirmed, Default::default())
        .await
        .unwrap();
    let outcome = machine
        .apply_transition(order.id, OrderStatus::Production, Default::default())
        .await
        .unwrap();

    assert_eq!(outcome.order.status, OrderStatus::Production);
    let records = stage::find_production_for_order(&pool, order.id).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, StageStatus::InProgress);
    assert!(records[0].completed_at.is_none());
    // Estimation anchors at the production start once the stage opened
    assert_eq!(outcome.estimation.anchor_at, records[0].started_at);
}

#[tokio::test]
async fn test_production_twice_keeps_single_open_record() {
    let pool = test_pool().await;
    let order = create_test_order(&pool).await;
    let machine = test_machine(&pool);

    machine
        .apply_transition(order.id, OrderStatus::Production, Default::default())
        .await
        .unwrap();
    // Re-applying the same status is an idempotent no-op on the stage table
    machine
        .apply_transition(order.id, OrderStatus::Production, Default::default())
        .await
        .unwrap();

    let records = stage::find_production_for_order(&pool, order.id).await.unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].completed_at.is_none());
}

#[tokio::test]
async fn test_full_pipeline_one_record_per_stage() {
    let pool = test_pool().await;
    let order = create_test_order(&pool).await;
    let machine = test_machine(&pool);

    for status in [
        OrderStatus::Confirmed,
        OrderStatus::Production,
        OrderStatus::Packaging,
        OrderStatus::Shipping,
    ] {
        machine
            .apply_transition(order.id, status, Default::default())
            .await
            .unwrap();
    }

    let production = stage::find_production_for_order(&pool, order.id).await.unwrap();
    let packaging = stage::find_packaging_for_order(&pool, order.id).await.unwrap();
    let shipments = stage::find_shipments_for_order(&pool, order.id).await.unwrap();

    assert_eq!(production.len(), 1);
    assert_eq!(packaging.len(), 1);
    assert_eq!(shipments.len(), 1);

    // Past stages closed, current stage open
    assert_eq!(production[0].status, StageStatus::Completed);
    assert!(production[0].completed_at.is_some());
    assert_eq!(packaging[0].status, StageStatus::Completed);
    assert!(packaging[0].completed_at.is_some());
    assert_eq!(shipments[0].status, ShipmentStatus::Pending);
    assert!(shipments[0].delivered_at.is_none());
    assert_eq!(shipments[0].courier, crate::fulfillment::machine::DEFAULT_COURIER);
}

#[tokio::test]
async fn test_shipping_uses_supplied_courier() {
    let pool = test_pool().await;
    let order = create_test_order(&pool).await;
    let machine = test_machine(&pool);

    machine
        .apply_transition(
            order.id,
            OrderStatus::Shipping,
            TransitionOptions {
                courier: Some("SEUR".to_string()),
                notes: Some("fragile".to_string()),
            },
        )
        .await
        .unwrap();

    let shipments = stage::find_shipments_for_order(&pool, order.id).await.unwrap();
    assert_eq!(shipments[0].courier, "SEUR");
    assert_eq!(shipments[0].notes.as_deref(), Some("fragile"));
}

#[tokio::test]
async fn test_backward_transition_rejected() {
    let pool = test_pool().await;
    let order = create_test_order(&pool).await;
    let machine = test_machine(&pool);

    machine
        .apply_transition(order.id, OrderStatus::Packaging, Default::default())
        .await
        .unwrap();

    let err = machine
        .apply_transition(order.id, OrderStatus::Production, Default::default())
        .await
        .unwrap_err();
    assert!(matches!(err, FulfillmentError::IllegalTransition { .. }));

    // The rejected step must not have touched the stage tables
    assert!(stage::find_production_for_order(&pool, order.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_terminal_order_accepts_nothing() {
    let pool = test_pool().await;
    let order = create_test_order(&pool).await;
    let machine = test_machine(&pool);

    machine
        .apply_transition(order.id, OrderStatus::Cancelled, Default::default())
        .await
        .unwrap();

    let err = machine
        .apply_transition(order.id, OrderStatus::Confirmed, Default::default())
        .await
        .unwrap_err();
    assert!(matches!(err, FulfillmentError::IllegalTransition { .. }));
}

#[tokio::test]
async fn test_cancel_leaves_open_shipment_untouched() {
    // Documents the observed gap: no cascading closure on cancellation
    let pool = test_pool().await;
    let order = create_test_order(&pool).await;
    let machine = test_machine(&pool);

    machine
        .apply_transition(order.id, OrderStatus::Shipping, Default::default())
        .await
        .unwrap();
    let outcome = machine
        .apply_transition(order.id, OrderStatus::Cancelled, Default::default())
        .await
        .unwrap();

    assert_eq!(outcome.order.status, OrderStatus::Cancelled);
    let shipments = stage::find_shipments_for_order(&pool, order.id).await.unwrap();
    assert_eq!(shipments.len(), 1);
    assert!(shipments[0].delivered_at.is_none());
}

#[tokio::test]
async fn test_unknown_order_rejected() {
    let pool = test_pool().await;
    let machine = test_machine(&pool);

    let err = machine
        .apply_transition(99999, OrderStatus::Confirmed, Default::default())
        .await
        .unwrap_err();
    assert!(matches!(err, FulfillmentError::OrderNotFound(99999)));
}

#[tokio::test]
async fn test_outcome_carries_estimation() {
    let pool = test_pool().await;
    // 2 × Tarta de queso (30/10) + 1 × Palmera (defaults 10/5)
    let (order, _) = test_intake_service(&pool)
        .create_order(OrderCreate {
            customer_id: 1,
            items: vec![
                OrderItemInput { product_id: 1, quantity: 2 },
                OrderItemInput { product_id: 2, quantity: 1 },
            ],
            notes: None,
        })
        .await
        .unwrap();
    let machine = test_machine(&pool);

    let outcome = machine
        .apply_transition(order.id, OrderStatus::Confirmed, Default::default())
        .await
        .unwrap();

    let e = &outcome.estimation.result;
    assert_eq!(e.production_minutes, 70);
    assert_eq!(e.packaging_minutes, 25);
    assert_eq!(e.pickup_buffer_minutes, 15);
    assert_eq!(e.total_minutes, 110);
    // Production has not started, so the anchor is the order creation time
    assert_eq!(outcome.estimation.anchor_at, order.created_at);
}
