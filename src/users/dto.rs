use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::config::ListingConfig;

use super::repo_types::UserFilter;

/// Raw query string of `GET /api/users`. Kept as strings so bad input falls back to
/// defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersParams {
    pub division: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl PageRequest {
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

fn parse_positive(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|v| v.trim().parse::<i64>().ok()).filter(|v| *v >= 1)
}

impl ListUsersParams {
    pub fn filter(&self) -> UserFilter {
        UserFilter::from_param(self.division.as_deref())
    }

    pub fn page_request(&self, cfg: &ListingConfig) -> PageRequest {
        let page = parse_positive(self.page.as_deref()).unwrap_or(1);
        let page_size = parse_positive(self.page_size.as_deref())
            .unwrap_or(cfg.default_page_size)
            .min(cfg.max_page_size);
        PageRequest { page, page_size }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListItem {
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
    pub social_media: BTreeMap<String, String>,
    pub preferences: BTreeMap<String, serde_json::Value>,
    pub skills: Vec<String>,
    pub interests: Vec<String>,
    pub role: Option<String>,
    pub division: Option<String>,
    pub log_count: i64,
    pub login_count: i64,
    pub update_count: i64,
    pub role_count: i64,
    pub division_count: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub profile_completeness: u8,
    pub is_active: bool,
    pub is_senior: bool,
    pub days_since_created: i64,
}

/// Aggregates over the returned page only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    pub active_users: i64,
    pub senior_users: i64,
    pub users_with_complete_profiles: i64,
    pub users_by_division: BTreeMap<String, i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersResponse {
    pub users: Vec<UserListItem>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    #[serde(flatten)]
    pub summary: PageSummary,
    pub filtered_by: String,
    pub message: &'static str,
}
