//! Summaries of what the recommender has learned about a user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tabletalk_common::{GroupSize, PriceBand, TimeSlot};
use tabletalk_db::{ActivityCounters, UserPreferences};

/// How many cuisines the summary lists.
pub const TOP_CUISINES: usize = 3;

/// An affinity rendered as a whole-number percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranked<K> {
    pub key: K,
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceInsights {
    pub has_preferences: bool,
    pub top_cuisines: Vec<Ranked<String>>,
    pub preferred_time_slots: Vec<Ranked<TimeSlot>>,
    pub price_preference: Option<Ranked<PriceBand>>,
    pub social_preference: Option<Ranked<GroupSize>>,
    pub activity_stats: Option<ActivityCounters>,
    pub last_updated: Option<DateTime<Utc>>,
    pub learning_enabled: Option<bool>,
}

impl PreferenceInsights {
    /// Summary for a user with nothing stored.
    pub fn none() -> Self {
        Self {
            has_preferences: false,
            top_cuisines: vec![],
            preferred_time_slots: vec![],
            price_preference: None,
            social_preference: None,
            activity_stats: None,
            last_updated: None,
            learning_enabled: None,
        }
    }

    pub fn from_preferences(prefs: &UserPreferences) -> Self {
        let v = &prefs.vector;
        let mut top_cuisines = ranked(v.cuisine_affinity.iter().map(|(k, a)| (k.clone(), *a)));
        top_cuisines.truncate(TOP_CUISINES);

        Self {
            has_preferences: true,
            top_cuisines,
            preferred_time_slots: ranked(v.time_affinity.iter().map(|(k, a)| (*k, *a))),
            price_preference: ranked(v.price_affinity.iter().map(|(k, a)| (*k, *a))).into_iter().next(),
            social_preference: ranked(v.group_size_affinity.iter().map(|(k, a)| (*k, *a))).into_iter().next(),
            activity_stats: Some(v.activity.clone()),
            last_updated: Some(prefs.updated_at),
            learning_enabled: Some(v.learning_enabled),
        }
    }
}

/// Sort by affinity descending. Ties keep the map's key order.
fn ranked<K>(entries: impl Iterator<Item = (K, f64)>) -> Vec<Ranked<K>> {
    let mut entries: Vec<(K, f64)> = entries.collect();
    entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    entries
        .into_iter()
        .map(|(key, affinity)| Ranked { key, score: (affinity * 100.0).round() as i64 })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_insights() {
        let prefs = UserPreferences::new("u1", Utc::now());
        let insights = PreferenceInsights::from_preferences(&prefs);

        assert!(insights.has_preferences);
        let cuisines: Vec<(&str, i64)> = insights
            .top_cuisines
            .iter()
            .map(|r| (r.key.as_str(), r.score))
            .collect();
        assert_eq!(cuisines, vec![("italian", 60), ("mediterranean", 40), ("spanish", 30)]);

        let slots: Vec<TimeSlot> = insights.preferred_time_slots.iter().map(|r| r.key).collect();
        assert_eq!(slots, vec![TimeSlot::Dinner, TimeSlot::Lunch, TimeSlot::Aperitif, TimeSlot::Breakfast]);
        assert_eq!(insights.price_preference, Some(Ranked { key: PriceBand::Moderate, score: 60 }));
        assert_eq!(insights.social_preference, Some(Ranked { key: GroupSize::Intimate, score: 60 }));
        assert_eq!(insights.learning_enabled, Some(true));
    }

    #[test]
    fn test_no_preferences() {
        let insights = PreferenceInsights::none();
        let json = serde_json::to_value(&insights).unwrap();
        assert_eq!(json["hasPreferences"], false);
        assert!(insights.top_cuisines.is_empty());
    }
}
