use anyhow::Context;
use sqlx::{types::Json, Executor, PgPool, Postgres};

use super::repo_types::{ProfileRow, ProfileUpdate};
use crate::models::ACTION_UPDATE_PROFILE;
use crate::users::repo::insert_activity;

const PROFILE_SQL: &str = r#"
SELECT u.id, u.username, u.full_name, a.email, u.birth_date, u.bio, u.long_bio,
       u.address, u.phone,
       CASE WHEN jsonb_typeof(u.profile) = 'object' THEN u.profile END AS profile,
       (SELECT r.role FROM user_roles r
         WHERE r.user_id = u.id
         ORDER BY r.created_at DESC, r.id DESC LIMIT 1) AS role,
       (SELECT d.division FROM user_divisions d
         WHERE d.user_id = u.id
         ORDER BY d.created_at DESC, d.id DESC LIMIT 1) AS division,
       (SELECT COUNT(*) FROM user_logs l WHERE l.user_id = u.id) AS log_count,
       (SELECT COUNT(*) FROM user_roles r WHERE r.user_id = u.id) AS role_count,
       (SELECT COUNT(*) FROM user_divisions d WHERE d.user_id = u.id) AS division_count,
       u.created_at, u.updated_at
FROM users u
LEFT JOIN auth a ON a.id = u.auth_id
WHERE u.id = $1
"#;

pub async fn fetch_profile<'e, E>(executor: E, user_id: i64) -> Result<Option<ProfileRow>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as::<_, ProfileRow>(PROFILE_SQL)
        .bind(user_id)
        .fetch_optional(executor)
        .await
}

/// Update user + auth email, append the `update_profile` log row and re-select, all in
/// one transaction. `Ok(None)` when the user does not exist (nothing is written).
pub async fn update_profile(
    db: &PgPool,
    user_id: i64,
    update: &ProfileUpdate,
) -> anyhow::Result<Option<ProfileRow>> {
    let mut tx = db.begin().await.context("begin profile update")?;

    let auth_id: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE users
        SET username = $1, full_name = $2, birth_date = $3, bio = $4, long_bio = $5,
            address = $6, phone = $7, profile = COALESCE($8, profile), updated_at = NOW()
        WHERE id = $9
        RETURNING auth_id
        "#,
    )
    .bind(&update.username)
    .bind(&update.full_name)
    .bind(update.birth_date)
    .bind(&update.bio)
    .bind(&update.long_bio)
    .bind(&update.address)
    .bind(&update.phone)
    .bind(update.profile.clone().map(Json))
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await
    .context("update users row")?;

    // dropping the transaction rolls it back
    let Some(auth_id) = auth_id else {
        return Ok(None);
    };

    sqlx::query("UPDATE auth SET email = $1, updated_at = NOW() WHERE id = $2")
        .bind(&update.email)
        .bind(auth_id)
        .execute(&mut *tx)
        .await
        .context("update auth email")?;

    insert_activity(&mut *tx, user_id, ACTION_UPDATE_PROFILE)
        .await
        .context("append update_profile log")?;

    let row = fetch_profile(&mut *tx, user_id)
        .await
        .context("re-select profile")?;

    tx.commit().await.context("commit profile update")?;
    Ok(row)
}
