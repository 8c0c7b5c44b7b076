use sqlx::{Executor, PgPool, Postgres};

use super::query::{count_query, rows_query};
use super::repo_types::{UserFilter, UserListRow};

/// One page of the listing projection.
pub async fn list_page(
    db: &PgPool,
    filter: &UserFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<UserListRow>, sqlx::Error> {
    let mut qb = rows_query(filter, limit, offset);
    qb.build_query_as::<UserListRow>().fetch_all(db).await
}

/// Total matching users for the same filter, independent of the page window.
pub async fn count(db: &PgPool, filter: &UserFilter) -> Result<i64, sqlx::Error> {
    let mut qb = count_query(filter);
    qb.build_query_scalar::<i64>().fetch_one(db).await
}

/// Append one `user_logs` row.
pub async fn insert_activity<'e, E>(executor: E, user_id: i64, action: &str) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("INSERT INTO user_logs (user_id, action) VALUES ($1, $2)")
        .bind(user_id)
        .bind(action)
        .execute(executor)
        .await?;
    Ok(())
}
