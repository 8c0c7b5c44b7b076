use sqlx::PgPool;

use crate::auth::repo_types::Credentials;

/// Find the user owning `email` (case-insensitive).
pub async fn find_credentials(db: &PgPool, email: &str) -> Result<Option<Credentials>, sqlx::Error> {
    sqlx::query_as::<_, Credentials>(
        r#"
        SELECT u.id AS user_id, u.username, a.password_hash
        FROM auth a
        JOIN users u ON u.auth_id = a.id
        WHERE lower(a.email) = lower($1)
        "#,
    )
    .bind(email)
    .fetch_optional(db)
    .await
}
