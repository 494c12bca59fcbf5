//! tabletalk-ranker: Preference-weighted meal recommendation engine.
//! Scores nearby meals against a user's learned affinities and explains the result.

pub mod scorer;
pub mod normalise;
pub mod weights;
pub mod reasons;
pub mod fallback;
pub mod history_provider;
pub mod recommender;
pub mod insights;

pub use history_provider::{MealHistoryProvider, MealRepositoryAdapter, MockMealHistoryProvider};
pub use insights::PreferenceInsights;
pub use reasons::PhraseTable;
pub use recommender::{score_and_rank, Provider, RankerError, Recommendations, Recommender};
pub use scorer::{Factor, FactorScores, LocationHistory, ScoreError, ScoredMeal};
pub use weights::FactorWeights;
