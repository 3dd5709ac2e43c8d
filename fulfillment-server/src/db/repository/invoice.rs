//! Invoice Repository

use super::RepoResult;
use shared::models::Invoice;
use sqlx::SqliteConnection;

pub async fn find_by_order(
    ex: impl sqlx::SqliteExecutor<'_>,
    order_id: i64,
) -> RepoResult<Option<Invoice>> {
    let row = sqlx::query_as::<_, Invoice>(
        "SELECT id, order_id, invoice_number, total_amount, paid_amount, status, created_at, updated_at \
         FROM invoice WHERE order_id = ?",
    )
    .bind(order_id)
    .fetch_optional(ex)
    .await?;
    Ok(row)
}

pub async fn find_by_number(
    ex: impl sqlx::SqliteExecutor<'_>,
    invoice_number: &str,
) -> RepoResult<Option<Invoice>> {
    let row = sqlx::query_as::<_, Invoice>(
        "SELECT id, order_id, invoice_number, total_amount, paid_amount, status, created_at, updated_at \
         FROM invoice WHERE invoice_number = ?",
    )
    .bind(invoice_number)
    .fetch_optional(ex)
    .await?;
    Ok(row)
}

/// Insert an invoice row (intake transaction)
pub async fn insert(conn: &mut SqliteConnection, invoice: &Invoice) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO invoice (id, order_id, invoice_number, total_amount, paid_amount, status, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(invoice.id)
    .bind(invoice.order_id)
    .bind(&invoice.invoice_number)
    .bind(invoice.total_amount)
    .bind(invoice.paid_amount)
    .bind(invoice.status)
    .bind(invoice.created_at)
    .bind(invoice.updated_at)
    .execute(conn)
    .await?;
    Ok(())
}
