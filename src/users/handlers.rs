use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{debug, instrument};

use super::dto::{ListUsersParams, ListUsersResponse};
use super::services;
use crate::{auth::jwt::AuthUser, error::ApiError, state::AppState};

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/users", get(list_users))
}

/// GET /users?division=&page=&pageSize=
#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<ListUsersParams>,
) -> Result<Json<ListUsersResponse>, ApiError> {
    let filter = params.filter();
    let page = params.page_request(&state.config.listing);

    let res = services::list_users(state.store.as_ref(), &filter, page, OffsetDateTime::now_utc())
        .await?;

    debug!(
        total = res.total,
        returned = res.users.len(),
        filtered_by = %res.filtered_by,
        "users listed"
    );
    Ok(Json(res))
}
