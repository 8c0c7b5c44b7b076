//! Storage boundary used by the services.
//!
//! `PgUserStore` is the production implementation; tests run the same services
//! against `memory::MemoryStore`.

use async_trait::async_trait;

use crate::auth::repo_types::Credentials;
use crate::profile::repo_types::{ProfileRow, ProfileUpdate};
use crate::users::repo_types::{UserFilter, UserListRow};

mod postgres;
#[cfg(test)]
pub mod memory;

pub use postgres::PgUserStore;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Listing rows ordered by `created_at DESC, id DESC`.
    async fn list_users(
        &self,
        filter: &UserFilter,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<UserListRow>>;

    /// Distinct users matching `filter`, ignoring any page window.
    async fn count_users(&self, filter: &UserFilter) -> anyhow::Result<i64>;

    async fn fetch_profile(&self, user_id: i64) -> anyhow::Result<Option<ProfileRow>>;

    /// Atomically apply `update`, log it and return the fresh view.
    /// `Ok(None)` if the user does not exist.
    async fn update_profile(
        &self,
        user_id: i64,
        update: &ProfileUpdate,
    ) -> anyhow::Result<Option<ProfileRow>>;

    async fn find_credentials(&self, email: &str) -> anyhow::Result<Option<Credentials>>;

    async fn record_activity(&self, user_id: i64, action: &str) -> anyhow::Result<()>;
}
