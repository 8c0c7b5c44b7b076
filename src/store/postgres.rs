use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use super::UserStore;
use crate::auth::{self, repo_types::Credentials};
use crate::db::{with_read_retry, RetryPolicy};
use crate::metrics::Metrics;
use crate::profile::{
    self,
    repo_types::{ProfileRow, ProfileUpdate},
};
use crate::users::{
    self,
    repo_types::{UserFilter, UserListRow},
};

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
    metrics: Arc<Metrics>,
    retry: RetryPolicy,
}

impl PgUserStore {
    pub fn new(db: PgPool, metrics: Arc<Metrics>, retry: RetryPolicy) -> Self {
        Self { db, metrics, retry }
    }

    async fn timed<T: Send>(
        &self,
        query_type: &'static str,
        fut: impl Future<Output = anyhow::Result<T>> + Send,
    ) -> anyhow::Result<T> {
        let started = Instant::now();
        let res = fut.await;
        self.metrics.observe_query(query_type, started.elapsed());
        res
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn list_users(
        &self,
        filter: &UserFilter,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<UserListRow>> {
        let db = &self.db;
        self.timed(
            "rows",
            with_read_retry(self.retry, "list users", move || {
                users::repo::list_page(db, filter, limit, offset)
            }),
        )
        .await
    }

    async fn count_users(&self, filter: &UserFilter) -> anyhow::Result<i64> {
        let db = &self.db;
        self.timed(
            "count",
            with_read_retry(self.retry, "count users", move || {
                users::repo::count(db, filter)
            }),
        )
        .await
    }

    async fn fetch_profile(&self, user_id: i64) -> anyhow::Result<Option<ProfileRow>> {
        let db = &self.db;
        self.timed(
            "profile",
            with_read_retry(self.retry, "fetch profile", move || {
                profile::repo::fetch_profile(db, user_id)
            }),
        )
        .await
    }

    async fn update_profile(
        &self,
        user_id: i64,
        update: &ProfileUpdate,
    ) -> anyhow::Result<Option<ProfileRow>> {
        // never retried: the update is not idempotent with respect to the log row
        self.timed(
            "profile_update",
            profile::repo::update_profile(&self.db, user_id, update),
        )
        .await
    }

    async fn find_credentials(&self, email: &str) -> anyhow::Result<Option<Credentials>> {
        let db = &self.db;
        self.timed(
            "credentials",
            with_read_retry(self.retry, "find credentials", move || {
                auth::repo::find_credentials(db, email)
            }),
        )
        .await
    }

    async fn record_activity(&self, user_id: i64, action: &str) -> anyhow::Result<()> {
        self.timed("activity", async {
            users::repo::insert_activity(&self.db, user_id, action)
                .await
                .with_context(|| format!("append {action} log"))
        })
        .await
    }
}
