use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, PublicUser},
        jwt::JwtKeys,
        password::verify_password,
    },
    models::ACTION_LOGIN,
    profile::validation::is_valid_email,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

fn internal() -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".into(),
    )
}

fn invalid_credentials() -> (StatusCode, String) {
    (StatusCode::UNAUTHORIZED, "Invalid credentials".into())
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, (StatusCode, String)> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err((StatusCode::BAD_REQUEST, "Invalid email".into()));
    }

    let creds = match state.store.find_credentials(&payload.email).await {
        Ok(Some(c)) => c,
        Ok(None) => {
            warn!(email = %payload.email, "login unknown email");
            return Err(invalid_credentials());
        }
        Err(e) => {
            error!(error = ?e, "find_credentials failed");
            return Err(internal());
        }
    };

    let ok = match verify_password(&payload.password, &creds.password_hash) {
        Ok(v) => v,
        Err(e) => {
            error!(error = %e, user_id = creds.user_id, "verify_password failed");
            return Err(internal());
        }
    };

    if !ok {
        warn!(user_id = creds.user_id, "login invalid password");
        return Err(invalid_credentials());
    }

    let keys = JwtKeys::from_ref(&state);
    let access_token = match keys.sign(creds.user_id) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "jwt sign failed");
            return Err(internal());
        }
    };

    // the login itself already succeeded; a lost activity row is only logged
    if let Err(e) = state.store.record_activity(creds.user_id, ACTION_LOGIN).await {
        warn!(error = ?e, user_id = creds.user_id, "login activity not recorded");
    }

    info!(user_id = creds.user_id, "user logged in");
    Ok(Json(LoginResponse {
        access_token,
        user: PublicUser {
            id: creds.user_id,
            username: creds.username,
        },
    }))
}
