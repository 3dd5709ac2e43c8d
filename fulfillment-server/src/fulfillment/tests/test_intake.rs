use super::*;
use crate::db::repository::{invoice as invoice_repo, order as order_repo};
use shared::models::InvoiceStatus;

#[tokio::test]
async fn test_create_order_pending_with_unpaid_invoice() {
    let pool = test_pool().await;
    let (order, invoice) = test_intake_service(&pool)
        .create_order(OrderCreate {
            customer_id: 1,
            items: vec![
                OrderItemInput { product_id: 1, quantity: 2 },
                OrderItemInput { product_id: 2, quantity: 4 },
            ],
            notes: Some("sin lactosa".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Pending);
    // 2 × 18.5 + 4 × 2.5
    assert_eq!(order.total_amount, 47.0);
    assert!(order.order_number.starts_with("PED"));
    assert_eq!(order.notes.as_deref(), Some("sin lactosa"));

    assert!(invoice.invoice_number.starts_with("FAC"));
    assert_eq!(invoice.status, InvoiceStatus::Unpaid);
    assert_eq!(invoice.paid_amount, 0.0);
    // Invoice total equals the order total at creation
    assert_eq!(invoice.total_amount, order.total_amount);

    let items = order_repo::find_items(&pool, order.id).await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].subtotal, 37.0);
    assert_eq!(items[1].subtotal, 10.0);
}

#[tokio::test]
async fn test_quick_order_born_paid() {
    let pool = test_pool().await;
    let (order, invoice) = test_intake_service(&pool)
        .quick_order(QuickOrderCreate {
            customer_id: 1,
            items: vec![OrderItemInput { product_id: 1, quantity: 1 }],
            notes: None,
            discount_percent: None,
        })
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Paid);
    assert_eq!(invoice.status, InvoiceStatus::Paid);
    assert_eq!(invoice.paid_amount, order.total_amount);
}

#[tokio::test]
async fn test_quick_order_discount_adjusts_total_before_fixing() {
    let pool = test_pool().await;
    let (order, invoice) = test_intake_service(&pool)
        .quick_order(QuickOrderCreate {
            customer_id: 1,
            items: vec![OrderItemInput { product_id: 2, quantity: 4 }],
            notes: None,
            discount_percent: Some(10.0),
        })
        .await
        .unwrap();

    // 4 × 2.5 = 10.0, minus 10%
    assert_eq!(order.total_amount, 9.0);
    assert_eq!(invoice.total_amount, 9.0);
    assert_eq!(invoice.paid_amount, 9.0);
}

#[tokio::test]
async fn test_empty_items_rejected() {
    let pool = test_pool().await;
    let err = test_intake_service(&pool)
        .create_order(OrderCreate {
            customer_id: 1,
            items: vec![],
            notes: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, FulfillmentError::Validation(_)));
}

#[tokio::test]
async fn test_zero_quantity_rejected() {
    let pool = test_pool().await;
    let err = test_intake_service(&pool)
        .create_order(OrderCreate {
            customer_id: 1,
            items: vec![OrderItemInput { product_id: 1, quantity: 0 }],
            notes: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, FulfillmentError::Validation(_)));
}

#[tokio::test]
async fn test_unknown_customer_rejected() {
    let pool = test_pool().await;
    let err = test_intake_service(&pool)
        .create_order(OrderCreate {
            customer_id: 42,
            items: vec![OrderItemInput { product_id: 1, quantity: 1 }],
            notes: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, FulfillmentError::CustomerNotFound(42)));
}

#[tokio::test]
async fn test_inactive_product_rejected() {
    let pool = test_pool().await;
    let err = test_intake_service(&pool)
        .create_order(OrderCreate {
            customer_id: 1,
            items: vec![OrderItemInput { product_id: 3, quantity: 1 }],
            notes: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, FulfillmentError::Validation(_)));

    // Nothing committed: no orphan invoice rows
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM invoice")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count.0, 0);
}

#[tokio::test]
async fn test_out_of_range_discount_rejected() {
    let pool = test_pool().await;
    let err = test_intake_service(&pool)
        .quick_order(QuickOrderCreate {
            customer_id: 1,
            items: vec![OrderItemInput { product_id: 1, quantity: 1 }],
            notes: None,
            discount_percent: Some(120.0),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, FulfillmentError::Validation(_)));
}

#[tokio::test]
async fn test_document_numbers_increment_within_day() {
    let pool = test_pool().await;
    let intake = test_intake_service(&pool);

    let (first, first_invoice) = intake
        .create_order(OrderCreate {
            customer_id: 1,
            items: vec![OrderItemInput { product_id: 2, quantity: 1 }],
            notes: None,
        })
        .await
        .unwrap();
    let (second, second_invoice) = intake
        .create_order(OrderCreate {
            customer_id: 1,
            items: vec![OrderItemInput { product_id: 2, quantity: 1 }],
            notes: None,
        })
        .await
        .unwrap();

    assert_ne!(first.order_number, second.order_number);
    assert_ne!(first_invoice.invoice_number, second_invoice.invoice_number);
    assert!(second.order_number > first.order_number);

    let stored = invoice_repo::find_by_order(&pool, second.id).await.unwrap();
    assert_eq!(
        stored.unwrap().invoice_number,
        second_invoice.invoice_number
    );
}
