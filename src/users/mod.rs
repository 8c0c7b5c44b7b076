use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
mod query;
pub(crate) mod repo;
pub mod repo_types;
pub mod services;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::read_routes())
}
