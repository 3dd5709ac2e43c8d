//! Stage record repository
//!
//! Open/close primitives for the three stage tables. "Open" means the
//! end timestamp is still NULL. All writers run inside the transition
//! transaction; insert-if-absent keeps at most one open record per
//! (order, stage).

use super::RepoResult;
use shared::models::{PackagingRecord, ProductionRecord, ShipmentRecord};
use shared::util::snowflake_id;
use sqlx::SqliteConnection;

// ========== Production ==========

pub async fn find_open_production(
    ex: impl sqlx::SqliteExecutor<'_>,
    order_id: i64,
) -> RepoResult<Option<ProductionRecord>> {
    let row = sqlx::query_as::<_, ProductionRecord>(
        "SELECT id, order_id, started_at, completed_at, status, notes \
         FROM production_record WHERE order_id = ? AND completed_at IS NULL",
    )
    .bind(order_id)
    .fetch_optional(ex)
    .await?;
    Ok(row)
}

pub async fn find_production_for_order(
    ex: impl sqlx::SqliteExecutor<'_>,
    order_id: i64,
) -> RepoResult<Vec<ProductionRecord>> {
    let rows = sqlx::query_as::<_, ProductionRecord>(
        "SELECT id, order_id, started_at, completed_at, status, notes \
         FROM production_record WHERE order_id = ? ORDER BY started_at",
    )
    .bind(order_id)
    .fetch_all(ex)
    .await?;
    Ok(rows)
}

/// Insert an open production record unless one is already open.
/// Returns true when a row was inserted (duplicate open = no-op).
pub async fn insert_production_if_absent(
    conn: &mut SqliteConnection,
    order_id: i64,
    now: i64,
    notes: Option<&str>,
) -> RepoResult<bool> {
    if find_open_production(&mut *conn, order_id).await?.is_some() {
        return Ok(false);
    }
    sqlx::query(
        "INSERT INTO production_record (id, order_id, started_at, status, notes) \
         VALUES (?, ?, ?, 'in_progress', ?)",
    )
    .bind(snowflake_id())
    .bind(order_id)
    .bind(now)
    .bind(notes)
    .execute(conn)
    .await?;
    Ok(true)
}

/// Close any open production record. Returns affected rows.
pub async fn close_open_production(
    conn: &mut SqliteConnection,
    order_id: i64,
    now: i64,
) -> RepoResult<u64> {
    let result = sqlx::query(
        "UPDATE production_record SET completed_at = ?, status = 'completed' \
         WHERE order_id = ? AND completed_at IS NULL",
    )
    .bind(now)
    .bind(order_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

// ========== Packaging ==========

pub async fn find_open_packaging(
    ex: impl sqlx::SqliteExecutor<'_>,
    order_id: i64,
) -> RepoResult<Option<PackagingRecord>> {
    let row = sqlx::query_as::<_, PackagingRecord>(
        "SELECT id, order_id, occurred_at, completed_at, status, notes \
         FROM packaging_record WHERE order_id = ? AND completed_at IS NULL",
    )
    .bind(order_id)
    .fetch_optional(ex)
    .await?;
    Ok(row)
}

pub async fn find_packaging_for_order(
    ex: impl sqlx::SqliteExecutor<'_>,
    order_id: i64,
) -> RepoResult<Vec<PackagingRecord>> {
    let rows = sqlx::query_as::<_, PackagingRecord>(
        "SELECT id, order_id, occurred_at, completed_at, status, notes \
         FROM packaging_record WHERE order_id = ? ORDER BY occurred_at",
    )
    .bind(order_id)
    .fetch_all(ex)
    .await?;
    Ok(rows)
}

pub async fn insert_packaging_if_absent(
    conn: &mut SqliteConnection,
    order_id: i64,
    now: i64,
    notes: Option<&str>,
) -> RepoResult<bool> {
    if find_open_packaging(&mut *conn, order_id).await?.is_some() {
        return Ok(false);
    }
    sqlx::query(
        "INSERT INTO packaging_record (id, order_id, occurred_at, status, notes) \
         VALUES (?, ?, ?, 'in_progress', ?)",
    )
    .bind(snowflake_id())
    .bind(order_id)
    .bind(now)
    .bind(notes)
    .execute(conn)
    .await?;
    Ok(true)
}

pub async fn close_open_packaging(
    conn: &mut SqliteConnection,
    order_id: i64,
    now: i64,
) -> RepoResult<u64> {
    let result = sqlx::query(
        "UPDATE packaging_record SET completed_at = ?, status = 'completed' \
         WHERE order_id = ? AND completed_at IS NULL",
    )
    .bind(now)
    .bind(order_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

// ========== Shipment ==========

pub async fn find_open_shipment(
    ex: impl sqlx::SqliteExecutor<'_>,
    order_id: i64,
) -> RepoResult<Option<ShipmentRecord>> {
    let row = sqlx::query_as::<_, ShipmentRecord>(
        "SELECT id, order_id, occurred_at, delivered_at, status, courier, tracking_number, notes \
         FROM shipment_record WHERE order_id = ? AND delivered_at IS NULL",
    )
    .bind(order_id)
    .fetch_optional(ex)
    .await?;
    Ok(row)
}

pub async fn find_shipments_for_order(
    ex: impl sqlx::SqliteExecutor<'_>,
    order_id: i64,
) -> RepoResult<Vec<ShipmentRecord>> {
    let rows = sqlx::query_as::<_, ShipmentRecord>(
        "SELECT id, order_id, occurred_at, delivered_at, status, courier, tracking_number, notes \
         FROM shipment_record WHERE order_id = ? ORDER BY occurred_at",
    )
    .bind(order_id)
    .fetch_all(ex)
    .await?;
    Ok(rows)
}

pub async fn insert_shipment_if_absent(
    conn: &mut SqliteConnection,
    order_id: i64,
    now: i64,
    courier: &str,
    notes: Option<&str>,
) -> RepoResult<bool> {
    if find_open_shipment(&mut *conn, order_id).await?.is_some() {
        return Ok(false);
    }
    sqlx::query(
        "INSERT INTO shipment_record (id, order_id, occurred_at, status, courier, notes) \
         VALUES (?, ?, ?, 'pending', ?, ?)",
    )
    .bind(snowflake_id())
    .bind(order_id)
    .bind(now)
    .bind(courier)
    .bind(notes)
    .execute(conn)
    .await?;
    Ok(true)
}
