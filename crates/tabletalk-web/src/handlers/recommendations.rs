//! Personalised recommendations API.

use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tabletalk_common::geo::{validate_coordinates, validate_radius};
use tabletalk_common::GeoPoint;
use tabletalk_db::NearbyQuery;
use tabletalk_ranker::{Provider, ScoredMeal};
use tracing::info;

use crate::error::ApiError;
use crate::extract::CurrentUser;
use crate::handlers::ApiResponse;
use crate::state::{AppEvent, SharedState};

#[derive(Debug, Default, Deserialize)]
pub struct RecommendationParams {
    pub limit: Option<usize>,
    pub radius: Option<f64>,
}

/// Either `{latitude, longitude}` or GeoJSON-style `{coordinates: [lng, lat]}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UserLocation {
    LatLng { latitude: f64, longitude: f64 },
    Coordinates { coordinates: [f64; 2] },
}

impl UserLocation {
    pub fn to_point(&self) -> GeoPoint {
        match self {
            UserLocation::LatLng { latitude, longitude } => GeoPoint::new(*latitude, *longitude),
            UserLocation::Coordinates { coordinates } => GeoPoint::from_lng_lat(*coordinates),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    #[serde(default)]
    pub user_location: Option<UserLocation>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationMeta {
    pub total_found: usize,
    pub recommended: usize,
    pub radius: f64,
    pub ai_provider: Provider,
}

/// POST /api/ai/recommendations: rank nearby meals for the caller
pub async fn recommend(
    State(state): State<SharedState>,
    CurrentUser(user_id): CurrentUser,
    params: Result<Query<RecommendationParams>, QueryRejection>,
    body: Result<Json<RecommendationRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Vec<ScoredMeal>, RecommendationMeta>>, ApiError> {
    let Query(params) = params?;
    let Json(body) = body?;
    let cfg = &state.config.recommendations;

    let location = body
        .user_location
        .ok_or_else(|| ApiError::BadRequest("userLocation is required for recommendations".to_string()))?;
    let location = validate_coordinates(location.to_point())?;
    let radius = validate_radius(params.radius.unwrap_or(cfg.default_radius_km))?;
    let limit = params.limit.unwrap_or(cfg.default_limit).min(cfg.max_limit);

    let query = NearbyQuery::joinable(location, radius);
    let nearby = tokio::time::timeout(
        Duration::from_millis(cfg.lookup_timeout_ms),
        state.meals.find_nearby(&query),
    )
    .await
    .map_err(|_| ApiError::Unavailable("nearby meal lookup timed out".to_string()))??;

    if nearby.is_empty() {
        info!(user_id = %user_id, radius, "No meals nearby");
        return Ok(Json(ApiResponse {
            success: true,
            data: vec![],
            meta: None,
            message: Some("No meals found nearby".to_string()),
        }));
    }

    let result = state
        .recommender
        .recommend(&user_id, Some(location), &nearby, limit, Utc::now())
        .await?;

    state.publish(AppEvent::RecommendationsServed {
        user_id: user_id.clone(),
        count: result.items.len(),
        provider: result.provider.to_string(),
    });

    let meta = RecommendationMeta {
        total_found: nearby.len(),
        recommended: result.items.len(),
        radius,
        ai_provider: result.provider,
    };
    Ok(Json(ApiResponse::with_meta(result.items, meta)))
}
