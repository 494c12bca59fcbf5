//! Trait for meal-history access.
//!
//! Provides an abstraction over the meal store, allowing the novelty factor
//! to ask how often a user has eaten at a place without being coupled to the
//! storage crate's repository.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tabletalk_common::{CandidateMeal, MealStatus};
use tabletalk_db::{DbError, MealRepository};

use crate::scorer::LocationHistory;

/// Statuses that make a location count as popular.
pub const POPULAR_STATUSES: [MealStatus; 2] = [MealStatus::Completed, MealStatus::Ongoing];

/// Visit and popularity counts for the location of a candidate meal.
///
/// A meal with no location name has no history: zero visits and zero
/// popular meals.
#[async_trait]
pub trait MealHistoryProvider: Send + Sync {
    async fn location_history(&self, user_id: &str, meal: &CandidateMeal) -> Result<LocationHistory, DbError>;
}

// ── Mock Implementation for Testing ────────────────────────────────────────

/// Mock provider with hardcoded counts for unit tests.
#[derive(Default)]
pub struct MockMealHistoryProvider {
    data: HashMap<String, LocationHistory>,
    failing: HashSet<String>,
}

impl MockMealHistoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the counts for a location.
    pub fn with(mut self, location: &str, visits: u64, popular_meals: u64) -> Self {
        self.data
            .insert(location.to_string(), LocationHistory { visits, popular_meals });
        self
    }

    /// Make lookups for a location fail.
    pub fn failing_for(mut self, location: &str) -> Self {
        self.failing.insert(location.to_string());
        self
    }
}

#[async_trait]
impl MealHistoryProvider for MockMealHistoryProvider {
    async fn location_history(&self, _user_id: &str, meal: &CandidateMeal) -> Result<LocationHistory, DbError> {
        let Some(location) = meal.location_name.as_deref() else {
            return Ok(LocationHistory::default());
        };
        if self.failing.contains(location) {
            return Err(DbError::Storage(format!("history unavailable for {location}")));
        }
        Ok(self.data.get(location).copied().unwrap_or_default())
    }
}

// ── Adapter for MealRepository ──────────────────────────────────────────────

/// Adapter that answers history questions from a [`MealRepository`].
pub struct MealRepositoryAdapter {
    repo: Arc<dyn MealRepository>,
}

impl MealRepositoryAdapter {
    pub fn new(repo: Arc<dyn MealRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl MealHistoryProvider for MealRepositoryAdapter {
    async fn location_history(&self, user_id: &str, meal: &CandidateMeal) -> Result<LocationHistory, DbError> {
        let Some(location) = meal.location_name.as_deref() else {
            return Ok(LocationHistory::default());
        };
        let (visits, popular_meals) = futures::try_join!(
            self.repo.count_visits(user_id, location, &meal.id),
            self.repo.count_at_location(location, &POPULAR_STATUSES),
        )?;
        Ok(LocationHistory { visits, popular_meals })
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tabletalk_db::InMemoryMealRepository;
    use tabletalk_test_utils::MealBuilder;

    #[tokio::test]
    async fn test_mock_provider() {
        let provider = MockMealHistoryProvider::new()
            .with("Trattoria", 2, 3)
            .failing_for("Broken");

        let at = |place: &str| MealBuilder::new("m1").location(place).build();
        assert_eq!(
            provider.location_history("u1", &at("Trattoria")).await.unwrap(),
            LocationHistory { visits: 2, popular_meals: 3 }
        );
        assert_eq!(
            provider.location_history("u1", &at("Elsewhere")).await.unwrap(),
            LocationHistory::default()
        );
        assert!(provider.location_history("u1", &at("Broken")).await.is_err());
    }

    #[tokio::test]
    async fn test_adapter_counts_from_repository() {
        let repo = InMemoryMealRepository::from_records(vec![
            MealBuilder::new("past").location("Trattoria").status(MealStatus::Completed).record("u1"),
            MealBuilder::new("other").location("Trattoria").status(MealStatus::Ongoing).record("h2"),
            MealBuilder::new("joined")
                .location("Trattoria")
                .status(MealStatus::Cancelled)
                .record("h3")
                .with_participant("u1"),
            MealBuilder::new("current").location("Trattoria").record("u1"),
        ]);
        let adapter = MealRepositoryAdapter::new(Arc::new(repo));

        let candidate = MealBuilder::new("current").location("Trattoria").build();
        let history = adapter.location_history("u1", &candidate).await.unwrap();
        assert_eq!(history, LocationHistory { visits: 2, popular_meals: 2 });

        let nameless = MealBuilder::new("x").build();
        assert_eq!(adapter.location_history("u1", &nameless).await.unwrap(), LocationHistory::default());
    }
}
