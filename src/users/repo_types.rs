use sqlx::{types::Json, FromRow};
use time::{Date, OffsetDateTime};

use crate::models::ProfileDocument;

/// Echoed back as `filteredBy` when no division filter applies.
pub const NO_FILTER: &str = "all";

/// One row of the listing projection: user, auth email, current role/division and
/// pre-aggregated per-user counts.
#[derive(Debug, Clone, FromRow)]
pub struct UserListRow {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub email: Option<String>,
    pub birth_date: Option<Date>,
    pub bio: Option<String>,
    pub long_bio: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub profile: Option<Json<ProfileDocument>>,
    pub role: Option<String>,
    pub division: Option<String>,
    pub log_count: i64,
    pub login_count: i64,
    pub update_count: i64,
    pub role_count: i64,
    pub division_count: i64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// WHERE predicate shared by the row query and the count query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    /// Matches the user's current division.
    pub division: Option<String>,
}

impl UserFilter {
    /// Empty and `all` mean "no filter".
    pub fn from_param(raw: Option<&str>) -> Self {
        let division = raw
            .map(str::trim)
            .filter(|d| !d.is_empty() && !d.eq_ignore_ascii_case(NO_FILTER))
            .map(str::to_owned);
        Self { division }
    }

    pub fn label(&self) -> &str {
        self.division.as_deref().unwrap_or(NO_FILTER)
    }
}
