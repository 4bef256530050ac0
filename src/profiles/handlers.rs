use axum::{extract::State, routing::get, Json, Router};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use crate::{
    auth::AuthUser,
    error::{AppError, AppResult},
    profiles::{dto::UpdateProfileRequest, services::is_valid_username, Profile},
    state::AppState,
};

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/api/profile", get(get_profile).patch(update_profile))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Profile>> {
    let profile = state
        .profiles
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".into()))?;
    Ok(Json(profile))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<Profile>> {
    let username = payload.username.trim();
    if !is_valid_username(username) {
        warn!(%user_id, "invalid username");
        return Err(AppError::Validation(
            "username must be 3-32 letters, digits, '.', '_' or '-'".into(),
        ));
    }

    let profile = state
        .profiles
        .update_username(user_id, username, OffsetDateTime::now_utc())
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".into()))?;

    info!(%user_id, username, "profile updated");
    Ok(Json(profile))
}
