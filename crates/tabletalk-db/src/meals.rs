//! Meal repository.
//!
//! The meal store is owned elsewhere in the product; the recommender only
//! needs three reads from it: a radius search, a user's visit history at a
//! location, and how busy a location has been.

use async_trait::async_trait;
use std::path::Path;
use tabletalk_common::geo::{haversine_km, is_valid, validate_coordinates, validate_radius};
use tabletalk_common::{CandidateMeal, GeoPoint, MealStatus, MealType};
use tokio::sync::RwLock;
use tracing::info;

use crate::error::Result;
use crate::schema::MealRecord;

/// Radius search parameters.
#[derive(Debug, Clone)]
pub struct NearbyQuery {
    pub center: GeoPoint,
    pub radius_km: f64,
    pub meal_type: Option<MealType>,
    /// Empty means any status.
    pub statuses: Vec<MealStatus>,
}

impl NearbyQuery {
    pub fn new(center: GeoPoint, radius_km: f64) -> Self {
        Self { center, radius_km, meal_type: None, statuses: vec![] }
    }

    /// Physical meals that are upcoming or ongoing: what can still be joined.
    pub fn joinable(center: GeoPoint, radius_km: f64) -> Self {
        Self {
            center,
            radius_km,
            meal_type: Some(MealType::Physical),
            statuses: vec![MealStatus::Upcoming, MealStatus::Ongoing],
        }
    }
}

#[async_trait]
pub trait MealRepository: Send + Sync {
    /// Meals within `radius_km` of the centre, nearest first, each with
    /// `distance_km` filled in.
    async fn find_nearby(&self, query: &NearbyQuery) -> Result<Vec<CandidateMeal>>;

    /// Meals at `location_name` the user hosted or joined, not counting `exclude_meal_id`.
    async fn count_visits(&self, user_id: &str, location_name: &str, exclude_meal_id: &str) -> Result<u64>;

    /// Meals at `location_name` with one of `statuses`.
    async fn count_at_location(&self, location_name: &str, statuses: &[MealStatus]) -> Result<u64>;
}

// ── In-memory implementation ────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryMealRepository {
    records: RwLock<Vec<MealRecord>>,
}

impl InMemoryMealRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<MealRecord>) -> Self {
        Self { records: RwLock::new(records) }
    }

    /// Load seed meals from a JSON array of `MealRecord`s.
    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        let records: Vec<MealRecord> = serde_json::from_str(&content)?;
        info!(path = %path.as_ref().display(), meals = records.len(), "Loaded meal seed file");
        Ok(Self::from_records(records))
    }
}

#[async_trait]
impl MealRepository for InMemoryMealRepository {
    async fn find_nearby(&self, query: &NearbyQuery) -> Result<Vec<CandidateMeal>> {
        let center = validate_coordinates(query.center)?;
        let radius = validate_radius(query.radius_km)?;

        let records = self.records.read().await;
        let mut found: Vec<CandidateMeal> = records
            .iter()
            .filter(|r| query.meal_type.map_or(true, |t| r.meal.meal_type == t))
            .filter(|r| query.statuses.is_empty() || query.statuses.contains(&r.meal.status))
            .filter_map(|r| {
                let point = r.meal.coordinates.filter(|p| is_valid(*p))?;
                let distance = haversine_km(center, point);
                (distance <= radius).then(|| {
                    let mut meal = r.to_candidate();
                    meal.distance_km = Some(distance);
                    meal
                })
            })
            .collect();

        found.sort_by(|a, b| {
            a.distance_km
                .partial_cmp(&b.distance_km)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(found)
    }

    async fn count_visits(&self, user_id: &str, location_name: &str, exclude_meal_id: &str) -> Result<u64> {
        let records = self.records.read().await;
        let count = records
            .iter()
            .filter(|r| r.meal.id != exclude_meal_id)
            .filter(|r| r.meal.location_name.as_deref() == Some(location_name))
            .filter(|r| r.involves(user_id))
            .count();
        Ok(count as u64)
    }

    async fn count_at_location(&self, location_name: &str, statuses: &[MealStatus]) -> Result<u64> {
        let records = self.records.read().await;
        let count = records
            .iter()
            .filter(|r| r.meal.location_name.as_deref() == Some(location_name))
            .filter(|r| statuses.contains(&r.meal.status))
            .count();
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn record(id: &str, lat: f64, lng: f64, status: MealStatus, place: &str, host: &str) -> MealRecord {
        let meal = CandidateMeal {
            id: id.to_string(),
            title: None,
            cuisine_type: Some("italian".to_string()),
            scheduled_at: DateTime::parse_from_rfc3339("2026-10-18T20:00:00+02:00").unwrap(),
            estimated_cost: Some(30.0),
            participant_count: 0,
            max_participants: Some(6),
            coordinates: Some(GeoPoint::new(lat, lng)),
            location_name: Some(place.to_string()),
            meal_type: MealType::Physical,
            status,
            distance_km: None,
        };
        MealRecord::new(meal, host)
    }

    fn store() -> InMemoryMealRepository {
        InMemoryMealRepository::from_records(vec![
            record("far", 45.60, 9.19, MealStatus::Upcoming, "Osteria", "h1"),
            record("near", 45.4645, 9.19, MealStatus::Upcoming, "Trattoria", "h1").with_participant("u1"),
            record("done", 45.465, 9.19, MealStatus::Completed, "Trattoria", "u1"),
            record("live", 45.466, 9.19, MealStatus::Ongoing, "Trattoria", "h2"),
        ])
    }

    #[tokio::test]
    async fn test_find_nearby_filters_and_sorts() {
        let repo = store();
        let q = NearbyQuery::joinable(GeoPoint::new(45.4642, 9.19), 5.0);
        let meals = repo.find_nearby(&q).await.unwrap();
        let ids: Vec<_> = meals.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["near", "live"]);
        assert!(meals[0].distance_km.unwrap() < meals[1].distance_km.unwrap());
        assert_eq!(meals[0].participant_count, 1);
    }

    #[tokio::test]
    async fn test_find_nearby_validates_input() {
        let repo = store();
        let bad_center = NearbyQuery::new(GeoPoint::new(120.0, 0.0), 5.0);
        assert!(repo.find_nearby(&bad_center).await.is_err());
        let bad_radius = NearbyQuery::new(GeoPoint::new(45.0, 9.0), 0.0);
        assert!(repo.find_nearby(&bad_radius).await.is_err());
    }

    #[tokio::test]
    async fn test_visit_and_popularity_counts() {
        let repo = store();
        assert_eq!(repo.count_visits("u1", "Trattoria", "live").await.unwrap(), 2);
        assert_eq!(repo.count_visits("u1", "Trattoria", "near").await.unwrap(), 1);
        assert_eq!(repo.count_visits("u1", "Osteria", "x").await.unwrap(), 0);
        let popular = [MealStatus::Completed, MealStatus::Ongoing];
        assert_eq!(repo.count_at_location("Trattoria", &popular).await.unwrap(), 2);
    }
}
