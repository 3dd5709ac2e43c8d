//! Fulfillment integration tests over an in-memory SQLite pool

use super::*;
use crate::db::MIGRATOR;
use shared::models::{OrderCreate, OrderItemInput, OrderStatus, QuickOrderCreate};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

mod test_intake;
mod test_transitions;

/// Create an in-memory SQLite pool with schema and seed rows.
///
/// max_connections(1): every in-memory connection is its own database,
/// so the pool must reuse a single connection.
async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    MIGRATOR.run(&pool).await.unwrap();

    sqlx::query(
        "INSERT INTO customer (id, name, phone, email) VALUES (1, 'Maria Lopez', '+34600111222', 'maria@example.com')",
    )
    .execute(&pool)
    .await
    .unwrap();

    // Product 1: full baselines; product 2: no baselines (engine defaults);
    // product 3: inactive
    sqlx::query(
        "INSERT INTO product (id, name, price, production_minutes_per_unit, packaging_minutes_per_unit, is_active) \
         VALUES (1, 'Tarta de queso', 18.5, 30, 10, 1)",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO product (id, name, price, production_minutes_per_unit, packaging_minutes_per_unit, is_active) \
         VALUES (2, 'Palmera', 2.5, NULL, NULL, 1)",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO product (id, name, price, production_minutes_per_unit, packaging_minutes_per_unit, is_active) \
         VALUES (3, 'Descatalogado', 5.0, 10, 5, 0)",
    )
    .execute(&pool)
    .await
    .unwrap();

    pool
}

fn test_intake_service(pool: &SqlitePool) -> OrderIntake {
    OrderIntake::new(pool.clone(), chrono_tz::Europe::Madrid)
}

fn test_machine(pool: &SqlitePool) -> FulfillmentMachine {
    FulfillmentMachine::new(pool.clone())
}

/// Create a confirmed-ready order (one Tarta de queso) via standard intake
async fn create_test_order(pool: &SqlitePool) -> shared::models::Order {
    let (order, _invoice) = test_intake_service(pool)
        .create_order(OrderCreate {
            customer_id: 1,
            items: vec![OrderItemInput {
                product_id: 1,
                quantity: 1,
            }],
            notes: None,
        })
        .await
        .unwrap();
    order
}
