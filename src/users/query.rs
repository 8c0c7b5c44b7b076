//! SQL composition for the user listing.
//!
//! Child relations are pre-aggregated per user before joining, so a user with many
//! logs, roles or divisions still yields exactly one row. "Current" role and division
//! are the newest assignment by `created_at`, ties resolved by the highest `id`.

use sqlx::{Postgres, QueryBuilder};

use super::repo_types::UserFilter;

const ROWS_SELECT: &str = r#"
WITH current_roles AS (
    SELECT DISTINCT ON (user_id) user_id, role
    FROM user_roles
    ORDER BY user_id, created_at DESC, id DESC
),
current_divisions AS (
    SELECT DISTINCT ON (user_id) user_id, division
    FROM user_divisions
    ORDER BY user_id, created_at DESC, id DESC
),
log_counts AS (
    SELECT user_id,
           COUNT(*) AS log_count,
           COUNT(*) FILTER (WHERE action = 'login') AS login_count,
           COUNT(*) FILTER (WHERE action = 'update_profile') AS update_count
    FROM user_logs
    GROUP BY user_id
),
role_counts AS (
    SELECT user_id, COUNT(*) AS role_count
    FROM user_roles
    GROUP BY user_id
),
division_counts AS (
    SELECT user_id, COUNT(*) AS division_count
    FROM user_divisions
    GROUP BY user_id
)
SELECT u.id, u.username, u.full_name, a.email, u.birth_date, u.bio, u.long_bio,
       u.address, u.phone,
       CASE WHEN jsonb_typeof(u.profile) = 'object' THEN u.profile END AS profile,
       cr.role, cd.division,
       COALESCE(lc.log_count, 0) AS log_count,
       COALESCE(lc.login_count, 0) AS login_count,
       COALESCE(lc.update_count, 0) AS update_count,
       COALESCE(rc.role_count, 0) AS role_count,
       COALESCE(dc.division_count, 0) AS division_count,
       u.created_at, u.updated_at
FROM users u
LEFT JOIN auth a ON a.id = u.auth_id
LEFT JOIN current_roles cr ON cr.user_id = u.id
LEFT JOIN current_divisions cd ON cd.user_id = u.id
LEFT JOIN log_counts lc ON lc.user_id = u.id
LEFT JOIN role_counts rc ON rc.user_id = u.id
LEFT JOIN division_counts dc ON dc.user_id = u.id"#;

const COUNT_SELECT: &str = r#"
WITH current_divisions AS (
    SELECT DISTINCT ON (user_id) user_id, division
    FROM user_divisions
    ORDER BY user_id, created_at DESC, id DESC
)
SELECT COUNT(DISTINCT u.id)
FROM users u
LEFT JOIN current_divisions cd ON cd.user_id = u.id"#;

fn push_filter(qb: &mut QueryBuilder<'static, Postgres>, filter: &UserFilter) {
    if let Some(division) = &filter.division {
        qb.push(" WHERE cd.division = ");
        qb.push_bind(division.clone());
    }
}

/// Page of listing rows, newest first. `id` breaks `created_at` ties.
pub fn rows_query(filter: &UserFilter, limit: i64, offset: i64) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(ROWS_SELECT);
    push_filter(&mut qb, filter);
    qb.push(" ORDER BY u.created_at DESC, u.id DESC LIMIT ");
    qb.push_bind(limit);
    qb.push(" OFFSET ");
    qb.push_bind(offset);
    qb
}

/// Distinct users matching `filter`, ignoring the page window.
pub fn count_query(filter: &UserFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(COUNT_SELECT);
    push_filter(&mut qb, filter);
    qb
}
