//! Interaction tracking, the input to preference learning.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tabletalk_common::entities::MealAttributes;
use tabletalk_common::InteractionType;
use tabletalk_db::ActivityCounters;
use tracing::debug;

use crate::error::ApiError;
use crate::extract::CurrentUser;
use crate::handlers::ApiResponse;
use crate::state::{AppEvent, SharedState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRequest {
    #[serde(default)]
    pub meal_id: Option<String>,
    /// Parsed by hand so an unknown type is a 400 rather than a body rejection.
    pub interaction_type: String,
    #[serde(default)]
    pub meal_data: Option<MealAttributes>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackResult {
    pub interaction_type: InteractionType,
    pub learned: bool,
    pub activity: ActivityCounters,
}

/// POST /api/ai/track: record an interaction
pub async fn track_interaction(
    State(state): State<SharedState>,
    CurrentUser(user_id): CurrentUser,
    body: Result<Json<TrackRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<TrackResult>>, ApiError> {
    let Json(req) = body?;
    let kind: InteractionType = req.interaction_type.parse()?;

    let prefs = state
        .preferences
        .record_interaction(&user_id, kind, req.meal_data.as_ref())
        .await?;
    debug!(user_id = %user_id, meal_id = ?req.meal_id, interaction = %kind, "Interaction tracked");

    state.publish(AppEvent::InteractionRecorded {
        user_id,
        interaction: kind.to_string(),
    });

    let result = TrackResult {
        interaction_type: kind,
        learned: req.meal_data.is_some() && prefs.vector.learning_enabled,
        activity: prefs.vector.activity,
    };
    Ok(Json(ApiResponse::with_message(result, "Interaction recorded")))
}
