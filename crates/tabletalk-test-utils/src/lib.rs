//! Shared fixtures for TableTalk tests: a fixed clock and meal builders.

use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use tabletalk_common::{CandidateMeal, GeoPoint, MealStatus, MealType};
use tabletalk_db::MealRecord;

pub use pretty_assertions;

/// Centre of Milan, used as the default user and meal location.
pub const MILAN: GeoPoint = GeoPoint { latitude: 45.4642, longitude: 9.19 };

/// 2026-10-18 10:00 UTC. Every fixture schedules relative to this instant.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 10, 0, 0).unwrap()
}

/// `hours` after [`fixed_now`], in UTC.
pub fn hours_from_now(hours: i64) -> DateTime<FixedOffset> {
    (fixed_now() + Duration::hours(hours)).fixed_offset()
}

/// A point roughly `km` north of `origin`.
pub fn north_of(origin: GeoPoint, km: f64) -> GeoPoint {
    GeoPoint::new(origin.latitude + km / 111.195, origin.longitude)
}

/// Builder for [`CandidateMeal`] fixtures.
///
/// Defaults: italian, 30 EUR, 2 of 8 seats taken, 20:00 UTC today, at
/// [`MILAN`], upcoming physical meal, no location name.
#[derive(Debug, Clone)]
pub struct MealBuilder {
    meal: CandidateMeal,
}

impl MealBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            meal: CandidateMeal {
                id: id.to_string(),
                title: Some(format!("Meal {id}")),
                cuisine_type: Some("italian".to_string()),
                scheduled_at: hours_from_now(10),
                estimated_cost: Some(30.0),
                participant_count: 2,
                max_participants: Some(8),
                coordinates: Some(MILAN),
                location_name: None,
                meal_type: MealType::Physical,
                status: MealStatus::Upcoming,
                distance_km: None,
            },
        }
    }

    pub fn cuisine(mut self, cuisine: &str) -> Self {
        self.meal.cuisine_type = Some(cuisine.to_string());
        self
    }

    pub fn cost(mut self, cost: f64) -> Self {
        self.meal.estimated_cost = Some(cost);
        self
    }

    pub fn participants(mut self, count: u32, max: u32) -> Self {
        self.meal.participant_count = count;
        self.meal.max_participants = Some(max);
        self
    }

    pub fn scheduled_at(mut self, at: DateTime<FixedOffset>) -> Self {
        self.meal.scheduled_at = at;
        self
    }

    pub fn at(mut self, point: GeoPoint) -> Self {
        self.meal.coordinates = Some(point);
        self
    }

    pub fn without_coordinates(mut self) -> Self {
        self.meal.coordinates = None;
        self
    }

    pub fn location(mut self, name: &str) -> Self {
        self.meal.location_name = Some(name.to_string());
        self
    }

    pub fn distance(mut self, km: f64) -> Self {
        self.meal.distance_km = Some(km);
        self
    }

    pub fn status(mut self, status: MealStatus) -> Self {
        self.meal.status = status;
        self
    }

    pub fn meal_type(mut self, meal_type: MealType) -> Self {
        self.meal.meal_type = meal_type;
        self
    }

    pub fn build(self) -> CandidateMeal {
        self.meal
    }

    /// Wrap the meal as a stored record hosted by `host_id`.
    pub fn record(self, host_id: &str) -> MealRecord {
        MealRecord::new(self.meal, host_id)
    }
}

/// Meals `m0..mN` spaced 1 km apart going north from [`MILAN`].
pub fn meals_in_a_line(n: usize) -> Vec<CandidateMeal> {
    (0..n)
        .map(|i| {
            MealBuilder::new(&format!("m{i}"))
                .at(north_of(MILAN, i as f64))
                .build()
        })
        .collect()
}

/// JSON body for `POST /api/ai/recommendations` centred on `point`.
pub fn location_body(point: GeoPoint) -> serde_json::Value {
    serde_json::json!({
        "userLocation": { "latitude": point.latitude, "longitude": point.longitude }
    })
}
