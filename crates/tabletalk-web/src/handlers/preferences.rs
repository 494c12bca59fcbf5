//! Preference management API.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tabletalk_db::{PreferencePatch, UserPreferences};
use tracing::info;

use crate::error::ApiError;
use crate::extract::CurrentUser;
use crate::handlers::ApiResponse;
use crate::state::{AppEvent, SharedState};

/// GET /api/ai/preferences: stored preferences, created on first access
pub async fn get_preferences(
    State(state): State<SharedState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<ApiResponse<UserPreferences>>, ApiError> {
    if let Some(prefs) = state.preferences.find(&user_id).await? {
        return Ok(Json(ApiResponse::ok(prefs)));
    }
    let prefs = state.preferences.get_or_create(&user_id).await?;
    Ok(Json(ApiResponse::with_message(prefs, "Default preferences created")))
}

/// PUT /api/ai/preferences: partial update
pub async fn update_preferences(
    State(state): State<SharedState>,
    CurrentUser(user_id): CurrentUser,
    patch: Result<Json<PreferencePatch>, JsonRejection>,
) -> Result<Json<ApiResponse<UserPreferences>>, ApiError> {
    let Json(patch) = patch?;
    let prefs = state.preferences.update(&user_id, &patch).await?;
    info!(user_id = %user_id, "Preferences updated");
    state.publish(AppEvent::PreferencesUpdated { user_id });
    Ok(Json(ApiResponse::with_message(prefs, "Preferences updated")))
}

/// DELETE /api/ai/preferences: reset to defaults
pub async fn reset_preferences(
    State(state): State<SharedState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<ApiResponse<UserPreferences>>, ApiError> {
    let prefs = state.preferences.reset(&user_id).await?;
    state.publish(AppEvent::PreferencesReset { user_id });
    Ok(Json(ApiResponse::with_message(prefs, "Preferences reset to defaults")))
}
