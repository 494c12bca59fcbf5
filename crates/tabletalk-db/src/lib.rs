//! TableTalk storage layer
//!
//! This crate owns the per-user preference documents and the read side of the
//! meal store that recommendations are computed from.
//!
//! # Features
//!
//! - In-memory repositories for single-process deployments and tests
//! - Optional PostgreSQL preference storage (`postgres` feature)
//! - Online learning of affinities from tracked interactions
//!
//! # Example
//!
//! ```rust,no_run
//! use tabletalk_db::{InMemoryPreferenceRepository, PreferenceRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let prefs = InMemoryPreferenceRepository::new();
//!     let doc = prefs.get_or_create("user-42").await?;
//!     println!("max distance: {} km", doc.vector.max_distance());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod learning;
pub mod meals;
pub mod preferences;
pub mod schema;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use error::{DbError, Result};
pub use learning::{apply_interaction, learn_from_meal, LEARNING_RATE};
pub use meals::{InMemoryMealRepository, MealRepository, NearbyQuery};
pub use preferences::{InMemoryPreferenceRepository, PreferenceRepository};
pub use schema::{
    Accessibility, ActivityCounters, AdvancedPreferences, LocationPreferences, MealRecord,
    PreferencePatch, PreferenceVector, UserPreferences,
    DEFAULT_MAX_DISTANCE_KM, PREFERENCES_VERSION, TABLE_USER_PREFERENCES,
};

#[cfg(feature = "postgres")]
pub use postgres::PgPreferenceRepository;
