use axum::{extract::State, Json};
use tabletalk_ranker::PreferenceInsights;

use crate::error::ApiError;
use crate::extract::CurrentUser;
use crate::handlers::ApiResponse;
use crate::state::SharedState;

/// GET /api/ai/insights: what has been learned so far. Never creates preferences.
pub async fn get_insights(
    State(state): State<SharedState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<ApiResponse<PreferenceInsights>>, ApiError> {
    let insights = match state.preferences.find(&user_id).await? {
        Some(prefs) => PreferenceInsights::from_preferences(&prefs),
        None => PreferenceInsights::none(),
    };
    Ok(Json(ApiResponse::ok(insights)))
}
