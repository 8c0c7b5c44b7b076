use time::Date;
use tracing::debug;

use super::dto::{ProfileInput, ProfileView};
use super::validation;
use crate::error::ApiError;
use crate::store::UserStore;

pub async fn get_profile(store: &dyn UserStore, user_id: i64) -> Result<ProfileView, ApiError> {
    store
        .fetch_profile(user_id)
        .await?
        .map(ProfileView::from)
        .ok_or(ApiError::NotFound)
}

/// Validate the whole body first; storage is only touched when every field passes.
pub async fn update_profile(
    store: &dyn UserStore,
    user_id: i64,
    input: ProfileInput,
    today: Date,
) -> Result<ProfileView, ApiError> {
    let update = validation::validate(input, today).map_err(|errors| {
        debug!(user_id, fields = errors.len(), "profile update rejected");
        ApiError::Validation(errors)
    })?;

    store
        .update_profile(user_id, &update)
        .await?
        .map(ProfileView::from)
        .ok_or(ApiError::NotFound)
}
