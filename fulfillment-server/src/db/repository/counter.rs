//! Daily document counter
//!
//! Per-business-day sequence used for PED (order) and FAC (invoice)
//! numbers. Incremented inside the creating transaction so a rollback
//! does not burn a number that was never committed.

use super::RepoResult;
use sqlx::SqliteConnection;

/// Increment and return the counter for (day, kind).
/// First call of the day returns 1.
pub async fn next_value(
    conn: &mut SqliteConnection,
    day: &str,
    kind: &str,
) -> RepoResult<i64> {
    let (value,): (i64,) = sqlx::query_as(
        "INSERT INTO daily_counter (day, kind, value) VALUES (?, ?, 1) \
         ON CONFLICT(day, kind) DO UPDATE SET value = value + 1 \
         RETURNING value",
    )
    .bind(day)
    .bind(kind)
    .fetch_one(conn)
    .await?;
    Ok(value)
}
