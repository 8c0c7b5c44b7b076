use sqlx::FromRow;

/// Login lookup row: the user behind an auth record and its password hash.
#[derive(Debug, Clone, FromRow)]
pub struct Credentials {
    pub user_id: i64,
    pub username: String,
    pub password_hash: String, // argon2 PHC string, never serialized
}
