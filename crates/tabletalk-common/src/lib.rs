//! tabletalk-common: Shared types, errors, and helpers used across all TableTalk crates.

pub mod error;
pub mod entities;
pub mod buckets;
pub mod geo;

// Re-export commonly used types
pub use entities::{CandidateMeal, GeoPoint, InteractionType, MealStatus, MealType};
pub use buckets::{AgeGroup, GroupSize, PriceBand, TimeSlot};
pub use error::{Result, TableTalkError};
