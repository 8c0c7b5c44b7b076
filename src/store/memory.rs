//! In-memory `UserStore` with the same ordering, aggregation and tie-break rules as
//! the SQL queries.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use sqlx::types::Json;
use time::{Date, OffsetDateTime};

use super::UserStore;
use crate::auth::repo_types::Credentials;
use crate::models::{ProfileDocument, ACTION_LOGIN, ACTION_UPDATE_PROFILE};
use crate::profile::repo_types::{ProfileRow, ProfileUpdate};
use crate::users::repo_types::{UserFilter, UserListRow};

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i64,
    pub auth_id: i64,
    pub username: String,
    pub full_name: String,
    pub birth_date: Option<Date>,
    pub bio: Option<String>,
    pub long_bio: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub profile: Option<ProfileDocument>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
struct AuthRecord {
    id: i64,
    email: String,
    password_hash: String,
}

#[derive(Debug, Clone)]
struct ChildRecord {
    id: i64,
    user_id: i64,
    label: String,
    created_at: OffsetDateTime,
}

#[derive(Default)]
struct Tables {
    next_id: i64,
    auth: Vec<AuthRecord>,
    users: Vec<UserRecord>,
    roles: Vec<ChildRecord>,
    divisions: Vec<ChildRecord>,
    logs: Vec<ChildRecord>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn current(children: &[ChildRecord], user_id: i64) -> Option<String> {
        children
            .iter()
            .filter(|c| c.user_id == user_id)
            .max_by_key(|c| (c.created_at, c.id))
            .map(|c| c.label.clone())
    }

    fn count(children: &[ChildRecord], user_id: i64, label: Option<&str>) -> i64 {
        let n = children
            .iter()
            .filter(|c| c.user_id == user_id && label.map_or(true, |l| c.label == l))
            .count();
        i64::try_from(n).unwrap_or(i64::MAX)
    }

    fn email(&self, auth_id: i64) -> Option<String> {
        self.auth.iter().find(|a| a.id == auth_id).map(|a| a.email.clone())
    }

    fn list_row(&self, u: &UserRecord) -> UserListRow {
        UserListRow {
            id: u.id,
            username: u.username.clone(),
            full_name: u.full_name.clone(),
            email: self.email(u.auth_id),
            birth_date: u.birth_date,
            bio: u.bio.clone(),
            long_bio: u.long_bio.clone(),
            address: u.address.clone(),
            phone: u.phone.clone(),
            profile: u.profile.clone().map(Json),
            role: Self::current(&self.roles, u.id),
            division: Self::current(&self.divisions, u.id),
            log_count: Self::count(&self.logs, u.id, None),
            login_count: Self::count(&self.logs, u.id, Some(ACTION_LOGIN)),
            update_count: Self::count(&self.logs, u.id, Some(ACTION_UPDATE_PROFILE)),
            role_count: Self::count(&self.roles, u.id, None),
            division_count: Self::count(&self.divisions, u.id, None),
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }

    fn profile_row(&self, user_id: i64) -> Option<ProfileRow> {
        let u = self.users.iter().find(|u| u.id == user_id)?;
        let row = self.list_row(u);
        Some(ProfileRow {
            id: row.id,
            username: row.username,
            full_name: row.full_name,
            email: row.email,
            birth_date: row.birth_date,
            bio: row.bio,
            long_bio: row.long_bio,
            address: row.address,
            phone: row.phone,
            profile: row.profile,
            role: row.role,
            division: row.division,
            log_count: row.log_count,
            role_count: row.role_count,
            division_count: row.division_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    fn matching(&self, filter: &UserFilter) -> Vec<UserListRow> {
        let mut rows: Vec<UserListRow> = self
            .users
            .iter()
            .map(|u| self.list_row(u))
            .filter(|r| match &filter.division {
                Some(d) => r.division.as_deref() == Some(d.as_str()),
                None => true,
            })
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        rows
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user with only the required fields set. Returns the user id.
    pub fn add_user(&self, username: &str, email: &str, created_at: OffsetDateTime) -> i64 {
        self.add_user_with_password(username, email, "", created_at)
    }

    pub fn add_user_with_password(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        created_at: OffsetDateTime,
    ) -> i64 {
        let mut t = self.tables.lock().unwrap();
        let auth_id = t.next_id();
        t.auth.push(AuthRecord {
            id: auth_id,
            email: email.to_owned(),
            password_hash: password_hash.to_owned(),
        });
        let id = t.next_id();
        t.users.push(UserRecord {
            id,
            auth_id,
            username: username.to_owned(),
            full_name: username.to_owned(),
            birth_date: None,
            bio: None,
            long_bio: None,
            address: None,
            phone: None,
            profile: None,
            created_at,
            updated_at: created_at,
        });
        id
    }

    pub fn edit_user(&self, user_id: i64, f: impl FnOnce(&mut UserRecord)) {
        let mut t = self.tables.lock().unwrap();
        let user = t.users.iter_mut().find(|u| u.id == user_id).expect("user exists");
        f(user);
    }

    pub fn assign_role(&self, user_id: i64, role: &str, at: OffsetDateTime) {
        let mut t = self.tables.lock().unwrap();
        let id = t.next_id();
        t.roles.push(ChildRecord { id, user_id, label: role.to_owned(), created_at: at });
    }

    pub fn assign_division(&self, user_id: i64, division: &str, at: OffsetDateTime) {
        let mut t = self.tables.lock().unwrap();
        let id = t.next_id();
        t.divisions.push(ChildRecord { id, user_id, label: division.to_owned(), created_at: at });
    }

    pub fn log(&self, user_id: i64, action: &str, at: OffsetDateTime) {
        let mut t = self.tables.lock().unwrap();
        let id = t.next_id();
        t.logs.push(ChildRecord { id, user_id, label: action.to_owned(), created_at: at });
    }

    pub fn actions(&self, user_id: i64) -> Vec<String> {
        let t = self.tables.lock().unwrap();
        t.logs
            .iter()
            .filter(|l| l.user_id == user_id)
            .map(|l| l.label.clone())
            .collect()
    }

    /// Make every subsequent call fail like a dropped connection.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("storage unavailable");
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn list_users(
        &self,
        filter: &UserFilter,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<UserListRow>> {
        self.check()?;
        let t = self.tables.lock().unwrap();
        Ok(t.matching(filter)
            .into_iter()
            .skip(usize::try_from(offset)?)
            .take(usize::try_from(limit)?)
            .collect())
    }

    async fn count_users(&self, filter: &UserFilter) -> anyhow::Result<i64> {
        self.check()?;
        let t = self.tables.lock().unwrap();
        Ok(i64::try_from(t.matching(filter).len())?)
    }

    async fn fetch_profile(&self, user_id: i64) -> anyhow::Result<Option<ProfileRow>> {
        self.check()?;
        Ok(self.tables.lock().unwrap().profile_row(user_id))
    }

    async fn update_profile(
        &self,
        user_id: i64,
        update: &ProfileUpdate,
    ) -> anyhow::Result<Option<ProfileRow>> {
        self.check()?;
        let mut t = self.tables.lock().unwrap();
        let Some(user) = t.users.iter_mut().find(|u| u.id == user_id) else {
            return Ok(None);
        };
        user.username = update.username.clone();
        user.full_name = update.full_name.clone();
        user.birth_date = update.birth_date;
        user.bio = update.bio.clone();
        user.long_bio = update.long_bio.clone();
        user.address = update.address.clone();
        user.phone = Some(update.phone.clone());
        if let Some(doc) = &update.profile {
            user.profile = Some(doc.clone());
        }
        user.updated_at = OffsetDateTime::now_utc();
        let auth_id = user.auth_id;

        if let Some(auth) = t.auth.iter_mut().find(|a| a.id == auth_id) {
            auth.email = update.email.clone();
        }
        let id = t.next_id();
        t.logs.push(ChildRecord {
            id,
            user_id,
            label: ACTION_UPDATE_PROFILE.to_owned(),
            created_at: OffsetDateTime::now_utc(),
        });
        Ok(t.profile_row(user_id))
    }

    async fn find_credentials(&self, email: &str) -> anyhow::Result<Option<Credentials>> {
        self.check()?;
        let t = self.tables.lock().unwrap();
        let Some(auth) = t.auth.iter().find(|a| a.email.eq_ignore_ascii_case(email)) else {
            return Ok(None);
        };
        Ok(t.users.iter().find(|u| u.auth_id == auth.id).map(|u| Credentials {
            user_id: u.id,
            username: u.username.clone(),
            password_hash: auth.password_hash.clone(),
        }))
    }

    async fn record_activity(&self, user_id: i64, action: &str) -> anyhow::Result<()> {
        self.check()?;
        self.log(user_id, action, OffsetDateTime::now_utc());
        Ok(())
    }
}
