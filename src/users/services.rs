use time::OffsetDateTime;

use super::dto::{ListUsersResponse, PageRequest, PageSummary, UserListItem};
use super::repo_types::{UserFilter, UserListRow};
use crate::store::UserStore;

/// `usersByDivision` key for users without a current division.
pub const NO_DIVISION: &str = "unassigned";

const SENIOR_ROLES: [&str; 2] = ["admin", "moderator"];
const ACTIVE_LOG_THRESHOLD: i64 = 5;
const COMPLETE_PROFILE_THRESHOLD: u8 = 75;
const SECONDS_PER_DAY: i64 = 86_400;

/// Share of {bio, address, phone, profile} that are present, in steps of 25.
pub fn profile_completeness(row: &UserListRow) -> u8 {
    let filled = [
        row.bio.is_some(),
        row.address.is_some(),
        row.phone.is_some(),
        row.profile.is_some(),
    ]
    .into_iter()
    .filter(|present| *present)
    .count();
    // at most 4 fields
    (filled * 25) as u8
}

/// Whole days elapsed, rounded down.
pub fn days_since(created_at: OffsetDateTime, now: OffsetDateTime) -> i64 {
    (now - created_at).whole_seconds().div_euclid(SECONDS_PER_DAY)
}

pub fn total_pages(total: i64, page_size: i64) -> i64 {
    if page_size <= 0 {
        return 0;
    }
    (total.max(0) + page_size - 1) / page_size
}

pub fn shape_row(row: UserListRow, now: OffsetDateTime) -> UserListItem {
    let profile_completeness = profile_completeness(&row);
    let is_active = row.log_count > ACTIVE_LOG_THRESHOLD;
    let is_senior = row
        .role
        .as_deref()
        .is_some_and(|r| SENIOR_ROLES.contains(&r));
    let days_since_created = days_since(row.created_at, now);
    let doc = row.profile.map(|p| p.0).unwrap_or_default();

    UserListItem {
        id: row.id,
        username: row.username,
        full_name: row.full_name,
        email: row.email,
        birth_date: row.birth_date,
        bio: row.bio,
        long_bio: row.long_bio,
        address: row.address,
        phone: row.phone,
        social_media: doc.social_media,
        preferences: doc.preferences,
        skills: doc.skills,
        interests: doc.interests,
        role: row.role,
        division: row.division,
        log_count: row.log_count,
        login_count: row.login_count,
        update_count: row.update_count,
        role_count: row.role_count,
        division_count: row.division_count,
        created_at: row.created_at,
        updated_at: row.updated_at,
        profile_completeness,
        is_active,
        is_senior,
        days_since_created,
    }
}

pub fn summarize(items: &[UserListItem]) -> PageSummary {
    items.iter().fold(PageSummary::default(), |mut acc, item| {
        if item.is_active {
            acc.active_users += 1;
        }
        if item.is_senior {
            acc.senior_users += 1;
        }
        if item.profile_completeness > COMPLETE_PROFILE_THRESHOLD {
            acc.users_with_complete_profiles += 1;
        }
        let key = item.division.clone().unwrap_or_else(|| NO_DIVISION.to_owned());
        *acc.users_by_division.entry(key).or_insert(0) += 1;
        acc
    })
}

/// Row and count queries run concurrently as two independent reads; a write landing
/// between them can leave `total` and the page momentarily inconsistent.
pub async fn list_users(
    store: &dyn UserStore,
    filter: &UserFilter,
    page: PageRequest,
    now: OffsetDateTime,
) -> anyhow::Result<ListUsersResponse> {
    let (rows, total) = tokio::try_join!(
        store.list_users(filter, page.page_size, page.offset()),
        store.count_users(filter),
    )?;

    let users: Vec<UserListItem> = rows.into_iter().map(|r| shape_row(r, now)).collect();
    let summary = summarize(&users);

    Ok(ListUsersResponse {
        users,
        total,
        page: page.page,
        page_size: page.page_size,
        total_pages: total_pages(total, page.page_size),
        summary,
        filtered_by: filter.label().to_owned(),
        message: "Users retrieved successfully",
    })
}
