//! Customer Repository (read collaborator for intake and invoicing)

use super::RepoResult;
use shared::models::Customer;

pub async fn find_by_id(
    ex: impl sqlx::SqliteExecutor<'_>,
    id: i64,
) -> RepoResult<Option<Customer>> {
    let row = sqlx::query_as::<_, Customer>(
        "SELECT id, name, phone, email, address, created_at, updated_at \
         FROM customer WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(ex)
    .await?;
    Ok(row)
}
