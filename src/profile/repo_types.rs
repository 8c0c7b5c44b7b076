use sqlx::{types::Json, FromRow};
use time::{Date, OffsetDateTime};

use crate::models::ProfileDocument;

/// Denormalized single-user view as selected from storage.
#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
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
    pub role_count: i64,
    pub division_count: i64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Validated replacement values for the mutable user fields and the auth email.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: Option<Date>,
    pub bio: Option<String>,
    pub long_bio: Option<String>,
    pub address: Option<String>,
    /// `None` keeps the stored document.
    pub profile: Option<ProfileDocument>,
}
