//! Core domain types shared by the preference store, the ranker and the HTTP layer.
//! Meals are owned by the external meal store; nothing here mutates them.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TableTalkError;

/// Cuisine assumed for meals that carry no cuisine tag.
pub const DEFAULT_CUISINE: &str = "italian";
/// Cost (EUR per person) assumed for meals without an estimate.
pub const DEFAULT_ESTIMATED_COST: f64 = 25.0;
/// Table size assumed when a meal has no (or a zero) participant cap.
pub const DEFAULT_MAX_PARTICIPANTS: u32 = 8;

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// WGS84 point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Build from a GeoJSON-style `[longitude, latitude]` pair.
    pub fn from_lng_lat(coordinates: [f64; 2]) -> Self {
        Self { latitude: coordinates[1], longitude: coordinates[0] }
    }
}

// ---------------------------------------------------------------------------
// Meal
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    #[default]
    Physical,
    Virtual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealStatus {
    Upcoming,
    Ongoing,
    Completed,
    Cancelled,
}

/// A meal eligible for recommendation, as returned by the nearby-meal lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateMeal {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub cuisine_type: Option<String>,
    /// Start time in the meal's local offset; time-of-day buckets use the local hour.
    pub scheduled_at: DateTime<FixedOffset>,
    #[serde(default)]
    pub estimated_cost: Option<f64>,
    #[serde(default)]
    pub participant_count: u32,
    #[serde(default)]
    pub max_participants: Option<u32>,
    #[serde(default)]
    pub coordinates: Option<GeoPoint>,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub meal_type: MealType,
    pub status: MealStatus,
    /// Distance from the searching user, when the lookup already computed it.
    #[serde(default)]
    pub distance_km: Option<f64>,
}

impl CandidateMeal {
    /// Lower-cased cuisine tag, falling back to [`DEFAULT_CUISINE`].
    pub fn cuisine_tag(&self) -> String {
        self.cuisine_type
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CUISINE)
            .to_lowercase()
    }

    pub fn effective_cost(&self) -> f64 {
        self.estimated_cost.unwrap_or(DEFAULT_ESTIMATED_COST)
    }

    pub fn effective_max_participants(&self) -> u32 {
        match self.max_participants {
            Some(max) if max > 0 => max,
            _ => DEFAULT_MAX_PARTICIPANTS,
        }
    }

    /// Open seats; negative when the meal is overbooked.
    pub fn available_spots(&self) -> i64 {
        i64::from(self.effective_max_participants()) - i64::from(self.participant_count)
    }

    /// The attributes the preference learner looks at.
    pub fn attributes(&self) -> MealAttributes {
        MealAttributes {
            cuisine_type: self.cuisine_type.clone(),
            scheduled_at: Some(self.scheduled_at),
            estimated_cost: self.estimated_cost,
        }
    }
}

/// Observed meal attributes fed back into the preference learner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealAttributes {
    #[serde(default)]
    pub cuisine_type: Option<String>,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub estimated_cost: Option<f64>,
}

// ---------------------------------------------------------------------------
// Interaction
// ---------------------------------------------------------------------------

/// A tracked user interaction with a meal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    Viewed,
    Joined,
    Created,
    Declined,
    Favorited,
}

impl InteractionType {
    pub const ALL: [InteractionType; 5] = [
        Self::Viewed,
        Self::Joined,
        Self::Created,
        Self::Declined,
        Self::Favorited,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Viewed => "viewed",
            Self::Joined => "joined",
            Self::Created => "created",
            Self::Declined => "declined",
            Self::Favorited => "favorited",
        }
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionType {
    type Err = TableTalkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| TableTalkError::Validation(format!("invalid interaction type: {s:?}")))
    }
}
