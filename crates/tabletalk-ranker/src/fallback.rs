//! Distance-only ranking, used when personalised scoring cannot run.

use std::cmp::Ordering;

use tabletalk_common::geo::{haversine_km, is_valid};
use tabletalk_common::{CandidateMeal, GeoPoint};

use crate::reasons::PhraseTable;
use crate::scorer::{compatibility_percent, ScoredMeal};

/// Score given to every candidate when the user's location is unknown.
pub const NO_LOCATION_SCORE: f64 = 0.5;
/// Score for candidates whose distance cannot be determined.
pub const UNKNOWN_DISTANCE_SCORE: f64 = 0.4;

/// ≤1km→1.0, ≤3km→0.9, ≤5km→0.8, ≤10km→0.6, else 0.4.
pub fn distance_band_score(distance_km: f64) -> f64 {
    if distance_km <= 1.0 {
        1.0
    } else if distance_km <= 3.0 {
        0.9
    } else if distance_km <= 5.0 {
        0.8
    } else if distance_km <= 10.0 {
        0.6
    } else {
        0.4
    }
}

/// Best-effort distance. Malformed values count as unknown.
fn known_distance(meal: &CandidateMeal, user: GeoPoint) -> Option<f64> {
    match meal.distance_km {
        Some(d) if d.is_finite() && d >= 0.0 => Some(d),
        _ => meal
            .coordinates
            .filter(|p| is_valid(*p))
            .map(|p| haversine_km(user, p)),
    }
}

/// Rank `candidates` by distance alone.
///
/// Without a usable location the candidates keep their input order and all
/// score [`NO_LOCATION_SCORE`]. Otherwise they sort nearest first (unknown
/// distances last, ties by id) and score by distance band.
pub fn fallback_rank(
    candidates: &[CandidateMeal],
    user_location: Option<GeoPoint>,
    limit: usize,
    phrases: &PhraseTable,
) -> Vec<ScoredMeal> {
    let Some(user) = user_location.filter(|p| is_valid(*p)) else {
        return candidates
            .iter()
            .take(limit)
            .enumerate()
            .map(|(i, meal)| ScoredMeal {
                meal: meal.clone(),
                score: NO_LOCATION_SCORE,
                rank: i + 1,
                reason_tags: vec![],
                reason: phrases.no_location().to_string(),
                compatibility: compatibility_percent(NO_LOCATION_SCORE),
                factors: None,
            })
            .collect();
    };

    let mut with_distance: Vec<(&CandidateMeal, Option<f64>)> = candidates
        .iter()
        .map(|meal| (meal, known_distance(meal, user)))
        .collect();

    with_distance.sort_by(|(a, da), (b, db)| {
        let by_distance = match (da, db) {
            (Some(x), Some(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_distance.then_with(|| a.id.cmp(&b.id))
    });

    with_distance
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, (meal, distance_km))| {
            let score = distance_km.map_or(UNKNOWN_DISTANCE_SCORE, distance_band_score);
            let mut meal = meal.clone();
            meal.distance_km = distance_km;
            ScoredMeal {
                meal,
                score,
                rank: i + 1,
                reason_tags: vec![],
                reason: phrases.by_distance(distance_km).to_string(),
                compatibility: compatibility_percent(score),
                factors: None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tabletalk_test_utils::{meals_in_a_line, north_of, MealBuilder, MILAN};

    fn ids(ranked: &[ScoredMeal]) -> Vec<&str> {
        ranked.iter().map(|s| s.meal.id.as_str()).collect()
    }

    #[test]
    fn test_band_scores() {
        assert_eq!(distance_band_score(0.0), 1.0);
        assert_eq!(distance_band_score(3.0), 0.9);
        assert_eq!(distance_band_score(4.9), 0.8);
        assert_eq!(distance_band_score(10.0), 0.6);
        assert_eq!(distance_band_score(10.1), 0.4);
    }

    #[test]
    fn test_no_location_keeps_input_order() {
        let mut meals = meals_in_a_line(3);
        meals.reverse();
        let ranked = fallback_rank(&meals, None, 2, &PhraseTable::english());

        assert_eq!(ids(&ranked), vec!["m2", "m1"]);
        assert!(ranked.iter().all(|s| s.score == NO_LOCATION_SCORE));
        assert_eq!(ranked[1].rank, 2);
        assert_eq!(ranked[0].reason, "Available in your area");
        assert_eq!(ranked[0].compatibility, 50);
    }

    #[test]
    fn test_invalid_location_counts_as_absent() {
        let meals = meals_in_a_line(2);
        let ranked = fallback_rank(&meals, Some(GeoPoint::new(0.0, 200.0)), 5, &PhraseTable::english());
        assert!(ranked.iter().all(|s| s.score == NO_LOCATION_SCORE));
    }

    #[test]
    fn test_sorts_by_distance_with_unknowns_last() {
        let meals = vec![
            MealBuilder::new("far").at(north_of(MILAN, 12.0)).build(),
            MealBuilder::new("lost").without_coordinates().build(),
            MealBuilder::new("near").at(north_of(MILAN, 0.5)).build(),
            MealBuilder::new("bad").at(GeoPoint::new(f64::NAN, 0.0)).build(),
            MealBuilder::new("mid").distance(4.0).build(),
        ];
        let ranked = fallback_rank(&meals, Some(MILAN), 10, &PhraseTable::english());

        assert_eq!(ids(&ranked), vec!["near", "mid", "far", "bad", "lost"]);
        let scores: Vec<f64> = ranked.iter().map(|s| s.score).collect();
        assert_eq!(scores, vec![1.0, 0.8, 0.4, 0.4, 0.4]);
        assert_eq!(ranked[0].reason, "Very close to you");
        assert_eq!(ranked[1].reason, "In your area");
        assert_eq!(ranked[2].reason, "Available nearby");
        assert_eq!(ranked[3].meal.distance_km, None);
    }

    #[test]
    fn test_truncates_to_limit() {
        let meals = meals_in_a_line(5);
        let ranked = fallback_rank(&meals, Some(MILAN), 3, &PhraseTable::english());
        assert_eq!(ids(&ranked), vec!["m0", "m1", "m2"]);
        assert_eq!(ranked.iter().map(|s| s.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
    }
}
