use axum::{
    extract::{rejection::JsonRejection, State},
    routing::get,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};

use super::dto::{ProfileInput, ProfileResponse};
use super::services;
use crate::{auth::jwt::AuthUser, error::ApiError, state::AppState};

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).put(update_profile))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = services::get_profile(state.store.as_ref(), user_id).await?;
    Ok(Json(ProfileResponse {
        success: true,
        user,
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<ProfileInput>, JsonRejection>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let Json(input) = payload?;
    let today = OffsetDateTime::now_utc().date();
    let user = services::update_profile(state.store.as_ref(), user_id, input, today).await?;
    info!(user_id, "profile updated");
    Ok(Json(ProfileResponse {
        success: true,
        user,
    }))
}
