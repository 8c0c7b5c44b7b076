use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use super::repo_types::ProfileRow;
use crate::models::ProfileDocument;

/// Body of `PUT /api/profile`. Everything is optional here so that missing required
/// fields surface as validation errors rather than a deserialization failure.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInput {
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<String>,
    pub bio: Option<String>,
    pub long_bio: Option<String>,
    pub address: Option<String>,
    pub profile: Option<ProfileDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub email: Option<String>,
    #[serde(serialize_with = "crate::models::iso_date::serialize_option")]
    pub birth_date: Option<Date>,
    pub bio: Option<String>,
    pub long_bio: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub profile: Option<ProfileDocument>,
    pub role: Option<String>,
    pub division: Option<String>,
    pub log_count: i64,
    pub role_count: i64,
    pub division_count: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<ProfileRow> for ProfileView {
    fn from(r: ProfileRow) -> Self {
        Self {
            id: r.id,
            username: r.username,
            full_name: r.full_name,
            email: r.email,
            birth_date: r.birth_date,
            bio: r.bio,
            long_bio: r.long_bio,
            address: r.address,
            phone: r.phone,
            profile: r.profile.map(|p| p.0),
            role: r.role,
            division: r.division,
            log_count: r.log_count,
            role_count: r.role_count,
            division_count: r.division_count,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub user: ProfileView,
}
