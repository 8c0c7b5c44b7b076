use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub(crate) mod repo;
pub mod repo_types;
pub mod services;
pub mod validation;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::profile_routes())
}
