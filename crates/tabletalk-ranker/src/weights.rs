//! Factor weights for the composite compatibility score.

use serde::{Deserialize, Serialize};

/// The six-component weight vector.
/// Weights sum to 1.0 and are fixed; they are not runtime-tunable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorWeights {
    /// Cuisine affinity (plus the home-cuisine bonus)
    pub cuisine: f64,
    /// Time-of-day slot affinity plus timing bonus
    pub time: f64,
    /// Price band affinity
    pub price: f64,
    /// Group size affinity plus urgency bonus
    pub social: f64,
    /// Distance relative to the user's max distance
    pub distance: f64,
    /// Novelty of the location and its popularity
    pub novelty: f64,
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self {
            cuisine:  0.25,
            time:     0.20,
            price:    0.15,
            social:   0.20,
            distance: 0.10,
            novelty:  0.10,
        }
    }
}

impl FactorWeights {
    /// Validate that all weights sum to ~1.0
    pub fn validate(&self) -> bool {
        (self.as_array().iter().sum::<f64>() - 1.0).abs() < 1e-6
    }

    /// Same order as [`crate::scorer::Factor::ALL`].
    pub fn as_array(&self) -> [f64; 6] {
        [self.cuisine, self.time, self.price, self.social, self.distance, self.novelty]
    }
}
