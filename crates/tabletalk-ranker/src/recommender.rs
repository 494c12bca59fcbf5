//! Ranking and the recommendation entry point.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tabletalk_common::{CandidateMeal, GeoPoint};
use tabletalk_db::{DbError, PreferenceRepository, PreferenceVector};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::fallback::fallback_rank;
use crate::history_provider::MealHistoryProvider;
use crate::reasons::{explain, PhraseTable};
use crate::scorer::{
    compatibility_percent, compute_composite_score, score_factors, LocationHistory, ScoreError, ScoredMeal,
};
use crate::weights::FactorWeights;

#[derive(Debug, Error)]
pub enum RankerError {
    #[error("limit must be at least 1")]
    InvalidLimit,

    #[error(transparent)]
    Store(#[from] DbError),
}

impl RankerError {
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::InvalidLimit => true,
            Self::Store(e) => e.is_client_error(),
        }
    }
}

/// Which ranking produced a result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provider {
    /// Full preference-weighted scoring.
    #[serde(rename = "smart-internal")]
    SmartInternal,
    /// Distance-only fallback.
    #[serde(rename = "basic-distance")]
    BasicDistance,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SmartInternal => "smart-internal",
            Self::BasicDistance => "basic-distance",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recommendations {
    pub items: Vec<ScoredMeal>,
    pub provider: Provider,
}

impl Recommendations {
    fn empty() -> Self {
        Self { items: vec![], provider: Provider::SmartInternal }
    }
}

/// Score, sort and truncate `candidates` for one user.
///
/// `histories[i]` belongs to `candidates[i]`; `None` (or a missing entry)
/// means the history lookup failed and novelty scores neutral.
///
/// Scores sort descending with ties broken by meal id ascending. If any
/// candidate is malformed the whole batch is ranked by distance instead;
/// without a location every result scores 0.5 in input order.
pub fn score_and_rank(
    user_location: Option<GeoPoint>,
    candidates: &[CandidateMeal],
    vector: &PreferenceVector,
    histories: &[Option<LocationHistory>],
    limit: usize,
    now: DateTime<Utc>,
    phrases: &PhraseTable,
) -> Result<Recommendations, RankerError> {
    if limit == 0 {
        return Err(RankerError::InvalidLimit);
    }
    if candidates.is_empty() {
        return Ok(Recommendations::empty());
    }
    if user_location.is_none() {
        return Ok(Recommendations {
            items: fallback_rank(candidates, None, limit, phrases),
            provider: Provider::BasicDistance,
        });
    }

    let weights = FactorWeights::default();
    let scored: Result<Vec<ScoredMeal>, ScoreError> = candidates
        .iter()
        .enumerate()
        .map(|(i, meal)| {
            let history = histories.get(i).copied().flatten();
            let (factors, distance_km) = score_factors(meal, vector, user_location, history.as_ref(), now)?;
            let score = compute_composite_score(&factors, &weights);
            let (reason_tags, reason) = explain(&factors, meal, phrases);

            let mut meal = meal.clone();
            meal.distance_km = Some(distance_km);
            Ok(ScoredMeal {
                meal,
                score,
                rank: 0,
                reason_tags,
                reason,
                compatibility: compatibility_percent(score),
                factors: Some(factors),
            })
        })
        .collect();

    let mut scored = match scored {
        Ok(scored) => scored,
        Err(e) => {
            warn!(error = %e, candidates = candidates.len(), "Scoring failed, using distance-only ranking");
            return Ok(Recommendations {
                items: fallback_rank(candidates, user_location, limit, phrases),
                provider: Provider::BasicDistance,
            });
        }
    };

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.meal.id.cmp(&b.meal.id))
    });
    scored.truncate(limit);
    for (i, item) in scored.iter_mut().enumerate() {
        item.rank = i + 1;
    }

    Ok(Recommendations { items: scored, provider: Provider::SmartInternal })
}

/// Fetches preferences and meal history, then ranks.
pub struct Recommender {
    preferences: Arc<dyn PreferenceRepository>,
    history: Arc<dyn MealHistoryProvider>,
    phrases: PhraseTable,
}

impl Recommender {
    pub fn new(preferences: Arc<dyn PreferenceRepository>, history: Arc<dyn MealHistoryProvider>) -> Self {
        Self { preferences, history, phrases: PhraseTable::default() }
    }

    /// Personalised recommendations for `user_id`.
    ///
    /// Creates default preferences on first use. A failing preference store
    /// is an error; a failing history lookup only neutralises novelty for
    /// that candidate.
    pub async fn recommend(
        &self,
        user_id: &str,
        user_location: Option<GeoPoint>,
        candidates: &[CandidateMeal],
        limit: usize,
        now: DateTime<Utc>,
    ) -> Result<Recommendations, RankerError> {
        if limit == 0 {
            return Err(RankerError::InvalidLimit);
        }
        if candidates.is_empty() {
            debug!(user_id, "No candidates to rank");
            return Ok(Recommendations::empty());
        }

        let prefs = self.preferences.get_or_create(user_id).await?;

        let histories = if user_location.is_some() {
            join_all(candidates.iter().map(|meal| self.lookup_history(user_id, meal))).await
        } else {
            vec![]
        };

        let result = score_and_rank(
            user_location,
            candidates,
            &prefs.vector,
            &histories,
            limit,
            now,
            &self.phrases,
        )?;

        info!(
            user_id,
            candidates = candidates.len(),
            recommended = result.items.len(),
            provider = %result.provider,
            "Generated recommendations"
        );
        Ok(result)
    }

    async fn lookup_history(&self, user_id: &str, meal: &CandidateMeal) -> Option<LocationHistory> {
        match self.history.location_history(user_id, meal).await {
            Ok(history) => Some(history),
            Err(e) => {
                warn!(user_id, meal_id = %meal.id, error = %e, "History lookup failed, novelty set to neutral");
                None
            }
        }
    }
}
