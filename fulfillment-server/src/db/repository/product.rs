//! Product Repository (read collaborator: pricing + estimation baselines)

use super::RepoResult;
use shared::models::Product;

pub async fn find_by_id(
    ex: impl sqlx::SqliteExecutor<'_>,
    id: i64,
) -> RepoResult<Option<Product>> {
    let row = sqlx::query_as::<_, Product>(
        "SELECT id, name, price, production_minutes_per_unit, packaging_minutes_per_unit, is_active, created_at, updated_at \
         FROM product WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(ex)
    .await?;
    Ok(row)
}

pub async fn find_active_by_ids(
    ex: impl sqlx::SqliteExecutor<'_>,
    ids: &[i64],
) -> RepoResult<Vec<Product>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    // sqlx has no array binding for SQLite; build the placeholder list
    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!(
        "SELECT id, name, price, production_minutes_per_unit, packaging_minutes_per_unit, is_active, created_at, updated_at \
         FROM product WHERE is_active = 1 AND id IN ({placeholders})"
    );
    let mut query = sqlx::query_as::<_, Product>(&sql);
    for id in ids {
        query = query.bind(id);
    }
    let rows = query.fetch_all(ex).await?;
    Ok(rows)
}
