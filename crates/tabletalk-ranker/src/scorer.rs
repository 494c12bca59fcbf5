//! Per-candidate compatibility scoring.
//!
//! Six sub-scores, each in [0, 1], blended with [`FactorWeights`]:
//!
//! S(u, m) = Σ(w_i × f_i), clamped to [0, 1]

use chrono::{DateTime, FixedOffset, Timelike, Utc};
use serde::{Deserialize, Serialize};
use tabletalk_common::geo::{haversine_km, is_valid};
use tabletalk_common::{CandidateMeal, GeoPoint, GroupSize, PriceBand, TimeSlot};
use tabletalk_db::PreferenceVector;
use thiserror::Error;

use crate::normalise::{normalise_affinity, with_bonus};
use crate::weights::FactorWeights;

/// Cuisine that gets a flat bonus on top of the user's affinity.
pub const HOME_CUISINE: &str = "italian";
pub const HOME_CUISINE_BONUS: f64 = 0.10;

/// Time score for meals outside the four named slots.
pub const OFF_HOURS_TIME_SCORE: f64 = 0.3;

/// Distance assumed when it cannot be computed.
pub const DEFAULT_DISTANCE_KM: f64 = 5.0;
pub const DISTANCE_FLOOR: f64 = 0.2;

pub const NOVELTY_BASE: f64 = 0.8;
pub const NOVELTY_DECAY_PER_VISIT: f64 = 0.1;
pub const NOVELTY_FLOOR: f64 = 0.2;
pub const POPULARITY_PER_MEAL: f64 = 0.05;
pub const POPULARITY_CAP: f64 = 0.3;
/// Novelty used when the meal history could not be read.
pub const NEUTRAL_NOVELTY: f64 = 0.5;

/// One of the six scoring factors, in weight-table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    Cuisine,
    Time,
    Price,
    Social,
    Distance,
    Novelty,
}

impl Factor {
    pub const ALL: [Factor; 6] = [
        Self::Cuisine,
        Self::Time,
        Self::Price,
        Self::Social,
        Self::Distance,
        Self::Novelty,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cuisine => "cuisine",
            Self::Time => "time",
            Self::Price => "price",
            Self::Social => "social",
            Self::Distance => "distance",
            Self::Novelty => "novelty",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Sub-scores for one candidate, all in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorScores {
    pub cuisine: f64,
    pub time: f64,
    pub price: f64,
    pub social: f64,
    pub distance: f64,
    pub novelty: f64,
}

impl FactorScores {
    pub fn as_array(&self) -> [f64; 6] {
        [self.cuisine, self.time, self.price, self.social, self.distance, self.novelty]
    }

    pub fn get(&self, factor: Factor) -> f64 {
        self.as_array()[factor.index()]
    }

    /// Factors by descending sub-score. Equal scores keep weight-table order.
    pub fn ranked(&self) -> Vec<Factor> {
        let mut factors = Factor::ALL.to_vec();
        factors.sort_by(|a, b| {
            self.get(*b)
                .partial_cmp(&self.get(*a))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        factors
    }
}

/// What the meal store knows about a user and a location.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocationHistory {
    /// Other meals at the location the user hosted or joined.
    pub visits: u64,
    /// Completed or ongoing meals at the location.
    pub popular_meals: u64,
}

/// A malformed candidate. Any of these sends the whole batch to the
/// distance-only fallback.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreError {
    #[error("meal {meal_id} has invalid coordinates")]
    InvalidCoordinates { meal_id: String },

    #[error("meal {meal_id} has invalid distance {distance_km}")]
    InvalidDistance { meal_id: String, distance_km: f64 },

    #[error("meal {meal_id} has invalid estimated cost {cost}")]
    InvalidCost { meal_id: String, cost: f64 },
}

/// A candidate after scoring, ready to serve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredMeal {
    /// Candidate fields; `distance_km` is filled in when it was known.
    #[serde(flatten)]
    pub meal: CandidateMeal,
    pub score: f64,
    /// 1-based position after sorting.
    pub rank: usize,
    /// Top contributing factors, strongest first. Empty for fallback results.
    pub reason_tags: Vec<Factor>,
    pub reason: String,
    /// `round(score * 100)`.
    pub compatibility: u8,
    /// Per-factor breakdown. Absent for fallback results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factors: Option<FactorScores>,
}

pub fn compatibility_percent(score: f64) -> u8 {
    (score.clamp(0.0, 1.0) * 100.0).round() as u8
}

// ── Factor scorers ──────────────────────────────────────────────────────────

pub fn cuisine_score(vector: &PreferenceVector, cuisine_tag: &str) -> f64 {
    let bonus = if cuisine_tag == HOME_CUISINE { HOME_CUISINE_BONUS } else { 0.0 };
    with_bonus(normalise_affinity(vector.cuisine(cuisine_tag)), bonus)
}

/// Slot affinity, plus 0.10 if the meal starts in 2-24h or 0.05 if in 1-48h.
pub fn time_score(vector: &PreferenceVector, scheduled_at: DateTime<FixedOffset>, now: DateTime<Utc>) -> f64 {
    let Some(slot) = TimeSlot::from_hour(scheduled_at.hour()) else {
        return OFF_HOURS_TIME_SCORE;
    };

    let hours_until = (scheduled_at.with_timezone(&Utc) - now).num_milliseconds() as f64 / 3_600_000.0;
    let bonus = if (2.0..=24.0).contains(&hours_until) {
        0.10
    } else if (1.0..=48.0).contains(&hours_until) {
        0.05
    } else {
        0.0
    };

    with_bonus(normalise_affinity(vector.time(slot)), bonus)
}

pub fn price_score(vector: &PreferenceVector, estimated_cost: f64) -> f64 {
    normalise_affinity(vector.price(PriceBand::from_cost(estimated_cost)))
}

/// Group size affinity plus an urgency bonus for nearly full meals.
pub fn social_score(vector: &PreferenceVector, max_participants: u32, available_spots: i64) -> f64 {
    let urgency = if available_spots > 0 && available_spots <= 2 {
        0.2
    } else if available_spots <= 4 {
        0.1
    } else {
        0.0
    };
    let size = GroupSize::from_max_participants(max_participants);
    with_bonus(normalise_affinity(vector.group_size(size)), urgency)
}

/// Distance relative to the user's max distance.
///
/// A meal exactly at the max distance is scored by the linear branch, never by
/// the near-distance bands.
pub fn distance_score(distance_km: f64, max_distance_km: f64) -> f64 {
    let linear = || (1.0 - distance_km / max_distance_km).max(DISTANCE_FLOOR);
    if distance_km > max_distance_km {
        DISTANCE_FLOOR
    } else if distance_km >= max_distance_km {
        linear()
    } else if distance_km <= 1.0 {
        1.0
    } else if distance_km <= 3.0 {
        0.9
    } else {
        linear()
    }
}

/// 0.8 for a new place, minus 0.1 per prior visit (floor 0.2), plus 0.05 per
/// popular meal at the location (capped at 0.3).
pub fn novelty_score(history: &LocationHistory) -> f64 {
    let novelty = if history.visits == 0 {
        NOVELTY_BASE
    } else {
        (NOVELTY_BASE - history.visits as f64 * NOVELTY_DECAY_PER_VISIT).max(NOVELTY_FLOOR)
    };
    let popularity = (history.popular_meals as f64 * POPULARITY_PER_MEAL).min(POPULARITY_CAP);
    with_bonus(novelty, popularity)
}

// ── Candidate scoring ───────────────────────────────────────────────────────

/// Distance from the user to `meal`.
///
/// Uses the lookup's precomputed distance when present, otherwise haversine
/// between valid points, otherwise [`DEFAULT_DISTANCE_KM`].
pub fn resolve_distance(meal: &CandidateMeal, user_location: Option<GeoPoint>) -> Result<f64, ScoreError> {
    if let Some(point) = meal.coordinates {
        if !is_valid(point) {
            return Err(ScoreError::InvalidCoordinates { meal_id: meal.id.clone() });
        }
    }

    if let Some(distance_km) = meal.distance_km {
        if !distance_km.is_finite() || distance_km < 0.0 {
            return Err(ScoreError::InvalidDistance { meal_id: meal.id.clone(), distance_km });
        }
        return Ok(distance_km);
    }

    match (user_location.filter(|p| is_valid(*p)), meal.coordinates) {
        (Some(user), Some(point)) => Ok(haversine_km(user, point)),
        _ => Ok(DEFAULT_DISTANCE_KM),
    }
}

fn checked_cost(meal: &CandidateMeal) -> Result<f64, ScoreError> {
    let cost = meal.effective_cost();
    if !cost.is_finite() || cost < 0.0 {
        return Err(ScoreError::InvalidCost { meal_id: meal.id.clone(), cost });
    }
    Ok(cost)
}

/// Compute all six sub-scores for one candidate. Also returns the distance
/// that was used. `history` is `None` when the lookup failed.
pub fn score_factors(
    meal: &CandidateMeal,
    vector: &PreferenceVector,
    user_location: Option<GeoPoint>,
    history: Option<&LocationHistory>,
    now: DateTime<Utc>,
) -> Result<(FactorScores, f64), ScoreError> {
    let distance_km = resolve_distance(meal, user_location)?;
    let cost = checked_cost(meal)?;

    let scores = FactorScores {
        cuisine: cuisine_score(vector, &meal.cuisine_tag()),
        time: time_score(vector, meal.scheduled_at, now),
        price: price_score(vector, cost),
        social: social_score(vector, meal.effective_max_participants(), meal.available_spots()),
        distance: distance_score(distance_km, vector.max_distance()),
        novelty: history.map_or(NEUTRAL_NOVELTY, novelty_score),
    };
    Ok((scores, distance_km))
}

/// Weighted blend of the sub-scores, clamped to [0, 1].
pub fn compute_composite_score(scores: &FactorScores, weights: &FactorWeights) -> f64 {
    let weighted_sum: f64 = scores
        .as_array()
        .iter()
        .zip(weights.as_array().iter())
        .map(|(f, w)| f * w)
        .sum();
    weighted_sum.clamp(0.0, 1.0)
}
