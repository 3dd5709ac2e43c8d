//! Order Repository
//!
//! Reads for dashboards plus the write primitives the state machine and
//! intake use inside their transactions.

use super::RepoResult;
use shared::models::{Order, OrderItem, OrderStatus};
use sqlx::SqliteConnection;

pub async fn find_by_id(
    ex: impl sqlx::SqliteExecutor<'_>,
    id: i64,
) -> RepoResult<Option<Order>> {
    let row = sqlx::query_as::<_, Order>(
        "SELECT id, order_number, customer_id, status, total_amount, notes, created_at, updated_at FROM orders WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(ex)
    .await?;
    Ok(row)
}

pub async fn find_by_number(
    ex: impl sqlx::SqliteExecutor<'_>,
    order_number: &str,
) -> RepoResult<Option<Order>> {
    let row = sqlx::query_as::<_, Order>(
        "SELECT id, order_number, customer_id, status, total_amount, notes, created_at, updated_at FROM orders WHERE order_number = ?",
    )
    .bind(order_number)
    .fetch_optional(ex)
    .await?;
    Ok(row)
}

pub async fn find_all(
    ex: impl sqlx::SqliteExecutor<'_>,
    limit: i64,
    offset: i64,
) -> RepoResult<Vec<Order>> {
    let rows = sqlx::query_as::<_, Order>(
        "SELECT id, order_number, customer_id, status, total_amount, notes, created_at, updated_at FROM orders ORDER BY created_at DESC LIMIT ? OFFSET ?",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(ex)
    .await?;
    Ok(rows)
}

pub async fn find_items(
    ex: impl sqlx::SqliteExecutor<'_>,
    order_id: i64,
) -> RepoResult<Vec<OrderItem>> {
    let rows = sqlx::query_as::<_, OrderItem>(
        "SELECT id, order_id, product_id, quantity, unit_price, subtotal FROM order_item WHERE order_id = ? ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(ex)
    .await?;
    Ok(rows)
}

/// Estimation baselines: (quantity, production_minutes_per_unit, packaging_minutes_per_unit)
/// for every line item of the order.
pub async fn find_estimation_baselines(
    ex: impl sqlx::SqliteExecutor<'_>,
    order_id: i64,
) -> RepoResult<Vec<(i64, Option<i64>, Option<i64>)>> {
    let rows = sqlx::query_as::<_, (i64, Option<i64>, Option<i64>)>(
        "SELECT oi.quantity, p.production_minutes_per_unit, p.packaging_minutes_per_unit \
         FROM order_item oi JOIN product p ON p.id = oi.product_id \
         WHERE oi.order_id = ? ORDER BY oi.id",
    )
    .bind(order_id)
    .fetch_all(ex)
    .await?;
    Ok(rows)
}

/// Insert an order row (intake transaction)
pub async fn insert(conn: &mut SqliteConnection, order: &Order) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO orders (id, order_number, customer_id, status, total_amount, notes, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(order.id)
    .bind(&order.order_number)
    .bind(order.customer_id)
    .bind(order.status)
    .bind(order.total_amount)
    .bind(&order.notes)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(conn)
    .await?;
    Ok(())
}

/// Insert a line item (intake transaction)
pub async fn insert_item(conn: &mut SqliteConnection, item: &OrderItem) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO order_item (id, order_id, product_id, quantity, unit_price, subtotal) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(item.id)
    .bind(item.order_id)
    .bind(item.product_id)
    .bind(item.quantity)
    .bind(item.unit_price)
    .bind(item.subtotal)
    .execute(conn)
    .await?;
    Ok(())
}

/// Update order status (transition transaction). Returns affected rows.
pub async fn update_status(
    conn: &mut SqliteConnection,
    id: i64,
    status: OrderStatus,
    now: i64,
) -> RepoResult<u64> {
    let result = sqlx::query("UPDATE orders SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(now)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}
