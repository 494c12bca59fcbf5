//! Online preference learning from tracked interactions.
//!
//! Every interaction bumps the activity counters. When learning is enabled and
//! the meal's attributes are known, the three matching affinities (cuisine,
//! time slot, price band) move towards +1 by a fixed step. Nothing ever moves
//! an affinity down; repeated interactions saturate at 1.0.

use chrono::{DateTime, Timelike, Utc};
use tabletalk_common::entities::{MealAttributes, DEFAULT_ESTIMATED_COST};
use tabletalk_common::{InteractionType, PriceBand, TimeSlot};

use crate::schema::{PreferenceVector, UserPreferences};

/// Step applied to each matching affinity per interaction.
pub const LEARNING_RATE: f64 = 0.1;

/// Apply one interaction to a stored preference document.
pub fn apply_interaction(
    prefs: &mut UserPreferences,
    kind: InteractionType,
    meal: Option<&MealAttributes>,
    now: DateTime<Utc>,
) {
    let activity = &mut prefs.vector.activity;
    activity.total_meals += 1;
    match kind {
        InteractionType::Created => activity.total_hosted += 1,
        InteractionType::Joined => activity.total_joined += 1,
        _ => {}
    }
    activity.last_activity_at = Some(now);

    if let Some(meal) = meal {
        learn_from_meal(&mut prefs.vector, meal);
    }
    prefs.updated_at = now;
}

/// Nudge the cuisine, time-slot and price-band affinities of `meal`.
/// A no-op when learning is disabled. Cuisines outside the vector's
/// vocabulary are ignored.
pub fn learn_from_meal(vector: &mut PreferenceVector, meal: &MealAttributes) {
    if !vector.learning_enabled {
        return;
    }

    if let Some(tag) = meal.cuisine_type.as_deref() {
        let tag = tag.trim().to_lowercase();
        if let Some(value) = vector.cuisine_affinity.get_mut(&tag) {
            nudge(value);
        }
    }

    let slot = meal.scheduled_at.and_then(|at| TimeSlot::from_hour(at.hour()));
    if let Some(value) = slot.and_then(|s| vector.time_affinity.get_mut(&s)) {
        nudge(value);
    }

    let band = PriceBand::from_cost(meal.estimated_cost.unwrap_or(DEFAULT_ESTIMATED_COST));
    if let Some(value) = vector.price_affinity.get_mut(&band) {
        nudge(value);
    }
}

fn nudge(value: &mut f64) {
    *value = (*value + LEARNING_RATE).clamp(-1.0, 1.0);
}
