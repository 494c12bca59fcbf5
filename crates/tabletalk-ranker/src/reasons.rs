//! Human-readable rationale for a recommendation.
//!
//! Phrases are presentation data: a [`PhraseTable`] can be swapped out (for
//! another language, say) without touching the scoring. Selection among
//! synonyms is seeded by the meal id, so the same meal always gets the same
//! wording.

use std::collections::HashMap;

use tabletalk_common::CandidateMeal;

use crate::scorer::{Factor, FactorScores};

/// Separator between rationale fragments.
pub const REASON_SEPARATOR: &str = " • ";

/// Canned phrases per factor, plus the fixed fallback wording.
#[derive(Debug, Clone)]
pub struct PhraseTable {
    options: HashMap<Factor, Vec<String>>,
    generic: String,
    no_location: String,
    very_close: String,
    in_area: String,
    nearby: String,
}

impl PhraseTable {
    pub fn english() -> Self {
        Self {
            options: HashMap::new(),
            generic: "Recommended for you".to_string(),
            no_location: "Available in your area".to_string(),
            very_close: "Very close to you".to_string(),
            in_area: "In your area".to_string(),
            nearby: "Available nearby".to_string(),
        }
        .with(Factor::Cuisine, &["A cuisine you love", "Flavours you prefer", "Your kind of cooking"])
        .with(Factor::Time, &["Ideal time for you", "Perfect timing", "Just the right moment"])
        .with(Factor::Price, &["Good price", "Great value for money", "Within your budget"])
        .with(Factor::Social, &["Your kind of group size", "The right social vibe", "Great company"])
        .with(Factor::Distance, &["Right around the corner", "Convenient area", "Easy to reach"])
        .with(Factor::Novelty, &["A new place to discover", "An original experience", "An interesting location"])
    }

    /// Replace the synonyms for one factor.
    pub fn with(mut self, factor: Factor, phrases: &[&str]) -> Self {
        self.options
            .insert(factor, phrases.iter().map(|p| p.to_string()).collect());
        self
    }

    /// One of the synonyms for `factor`, chosen by `meal_id`.
    pub fn phrase_for(&self, factor: Factor, meal_id: &str) -> &str {
        match self.options.get(&factor) {
            Some(options) if !options.is_empty() => {
                let seed = meal_id
                    .bytes()
                    .fold(factor.index() as u64, |acc, b| acc.wrapping_add(u64::from(b)));
                &options[(seed % options.len() as u64) as usize]
            }
            _ => &self.generic,
        }
    }

    pub fn spots_left(&self, spots: i64) -> String {
        if spots == 1 {
            "Only 1 spot left".to_string()
        } else {
            format!("Only {spots} spots left")
        }
    }

    pub fn no_location(&self) -> &str {
        &self.no_location
    }

    /// Reason used by the distance-only ranking. Unknown distance reads as
    /// the farthest band.
    pub fn by_distance(&self, distance_km: Option<f64>) -> &str {
        match distance_km {
            Some(d) if d <= 3.0 => &self.very_close,
            Some(d) if d <= 10.0 => &self.in_area,
            _ => &self.nearby,
        }
    }
}

impl Default for PhraseTable {
    fn default() -> Self {
        Self::english()
    }
}

/// Top two factors and the sentence describing them.
///
/// An urgency fragment leads when one or two seats remain; the sentence
/// always has at most two fragments.
pub fn explain(scores: &FactorScores, meal: &CandidateMeal, phrases: &PhraseTable) -> (Vec<Factor>, String) {
    let top: Vec<Factor> = scores.ranked().into_iter().take(2).collect();

    let mut fragments: Vec<String> = Vec::with_capacity(3);
    let spots = meal.available_spots();
    if spots > 0 && spots <= 2 {
        fragments.push(phrases.spots_left(spots));
    }
    fragments.extend(top.iter().map(|f| phrases.phrase_for(*f, &meal.id).to_string()));
    fragments.truncate(2);

    (top, fragments.join(REASON_SEPARATOR))
}
