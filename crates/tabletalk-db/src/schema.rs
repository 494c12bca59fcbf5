//! Schema definitions for stored records.
//!
//! `UserPreferences` is the one document per user the preference store owns.
//! `MealRecord` is the meal store's view of a meal, including who hosted and
//! joined it (needed for visit history).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tabletalk_common::{AgeGroup, CandidateMeal, GroupSize, PriceBand, TimeSlot};

use crate::error::{DbError, Result};

pub const TABLE_USER_PREFERENCES: &str = "user_preferences";

/// Schema version stamped on every stored preference document.
pub const PREFERENCES_VERSION: &str = "1.0";

pub const DEFAULT_MAX_DISTANCE_KM: f64 = 15.0;
pub const MIN_MAX_DISTANCE_KM: f64 = 1.0;
pub const MAX_MAX_DISTANCE_KM: f64 = 100.0;

/// Most entries any free-form list (areas, allergies, ...) may hold.
pub const MAX_LIST_ENTRIES: usize = 20;
/// Longest single list entry, in characters.
pub const MAX_LIST_ENTRY_LEN: usize = 64;

// =============================================================================
// Defaults
// =============================================================================

/// Known cuisines and their starting affinity. Learning never adds cuisines
/// outside this vocabulary.
pub const DEFAULT_CUISINE_AFFINITY: [(&str, f64); 12] = [
    ("italian", 0.6),
    ("japanese", 0.1),
    ("mexican", 0.0),
    ("indian", 0.1),
    ("chinese", 0.1),
    ("mediterranean", 0.4),
    ("american", 0.0),
    ("vegetarian", 0.2),
    ("vegan", 0.1),
    ("thai", 0.0),
    ("french", 0.2),
    ("spanish", 0.3),
];

pub const DEFAULT_TIME_AFFINITY: [(TimeSlot, f64); 4] = [
    (TimeSlot::Breakfast, 0.1),
    (TimeSlot::Lunch, 0.4),
    (TimeSlot::Aperitif, 0.3),
    (TimeSlot::Dinner, 0.6),
];

pub const DEFAULT_PRICE_AFFINITY: [(PriceBand, f64); 3] = [
    (PriceBand::Budget, 0.4),
    (PriceBand::Moderate, 0.6),
    (PriceBand::Upscale, 0.2),
];

pub const DEFAULT_GROUP_SIZE_AFFINITY: [(GroupSize, f64); 3] = [
    (GroupSize::Intimate, 0.6),
    (GroupSize::Medium, 0.4),
    (GroupSize::Large, 0.1),
];

pub const DEFAULT_AGE_GROUP_AFFINITY: [(AgeGroup, f64); 3] = [
    (AgeGroup::Young, 0.3),
    (AgeGroup::Adult, 0.6),
    (AgeGroup::Mature, 0.4),
];

// =============================================================================
// Preference Vector
// =============================================================================

/// Rolling activity counters. Updated on every tracked interaction,
/// regardless of whether learning is enabled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityCounters {
    pub total_meals: u64,
    pub total_hosted: u64,
    pub total_joined: u64,
    pub last_activity_at: Option<DateTime<Utc>>,
}

/// Named areas the user likes or wants to stay away from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationPreferences {
    #[serde(default)]
    pub preferred_areas: Vec<String>,
    #[serde(default)]
    pub avoid_areas: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accessibility {
    #[serde(default)]
    pub wheelchair: bool,
    #[serde(default)]
    pub hearing: bool,
    #[serde(default)]
    pub visual: bool,
}

/// Stored as given; none of it feeds the scorer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedPreferences {
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub language_preferences: Vec<String>,
    #[serde(default)]
    pub accessibility: Accessibility,
}

/// Per-user affinities, every scalar in [-1, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceVector {
    pub cuisine_affinity: BTreeMap<String, f64>,
    pub time_affinity: BTreeMap<TimeSlot, f64>,
    pub price_affinity: BTreeMap<PriceBand, f64>,
    pub group_size_affinity: BTreeMap<GroupSize, f64>,
    pub age_group_affinity: BTreeMap<AgeGroup, f64>,
    pub max_distance_km: f64,
    pub activity: ActivityCounters,
    pub learning_enabled: bool,
    #[serde(default)]
    pub location_preferences: LocationPreferences,
    #[serde(default)]
    pub advanced_preferences: AdvancedPreferences,
}

impl Default for PreferenceVector {
    fn default() -> Self {
        Self {
            cuisine_affinity: DEFAULT_CUISINE_AFFINITY
                .iter()
                .map(|(c, v)| (c.to_string(), *v))
                .collect(),
            time_affinity: DEFAULT_TIME_AFFINITY.into_iter().collect(),
            price_affinity: DEFAULT_PRICE_AFFINITY.into_iter().collect(),
            group_size_affinity: DEFAULT_GROUP_SIZE_AFFINITY.into_iter().collect(),
            age_group_affinity: DEFAULT_AGE_GROUP_AFFINITY.into_iter().collect(),
            max_distance_km: DEFAULT_MAX_DISTANCE_KM,
            activity: ActivityCounters::default(),
            learning_enabled: true,
            location_preferences: LocationPreferences::default(),
            advanced_preferences: AdvancedPreferences::default(),
        }
    }
}

impl PreferenceVector {
    /// Affinity for a cuisine tag; unknown cuisines are neutral (0).
    pub fn cuisine(&self, tag: &str) -> f64 {
        self.cuisine_affinity.get(tag).copied().unwrap_or(0.0)
    }

    pub fn time(&self, slot: TimeSlot) -> f64 {
        self.time_affinity.get(&slot).copied().unwrap_or(0.0)
    }

    pub fn price(&self, band: PriceBand) -> f64 {
        self.price_affinity.get(&band).copied().unwrap_or(0.0)
    }

    pub fn group_size(&self, size: GroupSize) -> f64 {
        self.group_size_affinity.get(&size).copied().unwrap_or(0.0)
    }

    pub fn age_group(&self, group: AgeGroup) -> f64 {
        self.age_group_affinity.get(&group).copied().unwrap_or(0.0)
    }

    /// Search distance, always within [1, 100] km.
    pub fn max_distance(&self) -> f64 {
        if self.max_distance_km.is_finite() {
            self.max_distance_km.clamp(MIN_MAX_DISTANCE_KM, MAX_MAX_DISTANCE_KM)
        } else {
            DEFAULT_MAX_DISTANCE_KM
        }
    }

    /// Every affinity scalar, in no particular order.
    pub fn affinities(&self) -> impl Iterator<Item = f64> + '_ {
        self.cuisine_affinity
            .values()
            .chain(self.time_affinity.values())
            .chain(self.price_affinity.values())
            .chain(self.group_size_affinity.values())
            .chain(self.age_group_affinity.values())
            .copied()
    }

    /// Apply a partial update. The patch is validated in full first;
    /// on error nothing is changed.
    pub fn apply_patch(&mut self, patch: &PreferencePatch) -> Result<()> {
        patch.validate(self)?;

        if let Some(cuisines) = &patch.cuisine_affinity {
            for (tag, value) in cuisines {
                self.cuisine_affinity.insert(tag.trim().to_lowercase(), *value);
            }
        }
        merge(&mut self.time_affinity, patch.time_affinity.as_ref());
        merge(&mut self.price_affinity, patch.price_affinity.as_ref());
        merge(&mut self.group_size_affinity, patch.group_size_affinity.as_ref());
        merge(&mut self.age_group_affinity, patch.age_group_affinity.as_ref());

        if let Some(km) = patch.max_distance_km {
            self.max_distance_km = km;
        }
        if let Some(enabled) = patch.learning_enabled {
            self.learning_enabled = enabled;
        }
        // A supplied section replaces the stored one.
        if let Some(location) = &patch.location_preferences {
            self.location_preferences = LocationPreferences {
                preferred_areas: clean_list(&location.preferred_areas),
                avoid_areas: clean_list(&location.avoid_areas),
            };
        }
        if let Some(advanced) = &patch.advanced_preferences {
            self.advanced_preferences = AdvancedPreferences {
                dietary_restrictions: clean_list(&advanced.dietary_restrictions),
                allergies: clean_list(&advanced.allergies),
                language_preferences: clean_list(&advanced.language_preferences),
                accessibility: advanced.accessibility,
            };
        }
        Ok(())
    }
}

fn merge<K: Ord + Copy>(target: &mut BTreeMap<K, f64>, update: Option<&BTreeMap<K, f64>>) {
    if let Some(update) = update {
        for (k, v) in update {
            target.insert(*k, *v);
        }
    }
}

fn check_affinity(field: &str, key: &str, value: f64) -> Result<()> {
    if value.is_finite() && (-1.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(DbError::Validation(format!(
            "{field}.{key} must be within [-1, 1], got {value}"
        )))
    }
}

fn clean_list(entries: &[String]) -> Vec<String> {
    entries.iter().map(|e| e.trim().to_string()).collect()
}

fn check_list(field: &str, entries: &[String]) -> Result<()> {
    if entries.len() > MAX_LIST_ENTRIES {
        return Err(DbError::Validation(format!(
            "{field} accepts at most {MAX_LIST_ENTRIES} entries, got {}",
            entries.len()
        )));
    }
    for entry in entries {
        let entry = entry.trim();
        if entry.is_empty() || entry.chars().count() > MAX_LIST_ENTRY_LEN {
            return Err(DbError::Validation(format!(
                "{field} entries must be 1 to {MAX_LIST_ENTRY_LEN} characters, got {entry:?}"
            )));
        }
    }
    Ok(())
}

// =============================================================================
// Preference Patch
// =============================================================================

/// Client-supplied partial update of a preference vector.
/// Fields not listed are ignored, so clients may echo back a full document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencePatch {
    #[serde(default)]
    pub cuisine_affinity: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    pub time_affinity: Option<BTreeMap<TimeSlot, f64>>,
    #[serde(default)]
    pub price_affinity: Option<BTreeMap<PriceBand, f64>>,
    #[serde(default)]
    pub group_size_affinity: Option<BTreeMap<GroupSize, f64>>,
    #[serde(default)]
    pub age_group_affinity: Option<BTreeMap<AgeGroup, f64>>,
    #[serde(default)]
    pub max_distance_km: Option<f64>,
    #[serde(default)]
    pub learning_enabled: Option<bool>,
    #[serde(default)]
    pub location_preferences: Option<LocationPreferences>,
    #[serde(default)]
    pub advanced_preferences: Option<AdvancedPreferences>,
}

impl PreferencePatch {
    fn validate(&self, current: &PreferenceVector) -> Result<()> {
        if let Some(cuisines) = &self.cuisine_affinity {
            for (tag, value) in cuisines {
                let key = tag.trim().to_lowercase();
                if !current.cuisine_affinity.contains_key(&key) {
                    return Err(DbError::Validation(format!("unknown cuisine: {tag:?}")));
                }
                check_affinity("cuisineAffinity", &key, *value)?;
            }
        }
        for (k, v) in self.time_affinity.iter().flatten() {
            check_affinity("timeAffinity", k.as_str(), *v)?;
        }
        for (k, v) in self.price_affinity.iter().flatten() {
            check_affinity("priceAffinity", k.as_str(), *v)?;
        }
        for (k, v) in self.group_size_affinity.iter().flatten() {
            check_affinity("groupSizeAffinity", k.as_str(), *v)?;
        }
        for (k, v) in self.age_group_affinity.iter().flatten() {
            check_affinity("ageGroupAffinity", k.as_str(), *v)?;
        }
        if let Some(km) = self.max_distance_km {
            if !km.is_finite() || !(MIN_MAX_DISTANCE_KM..=MAX_MAX_DISTANCE_KM).contains(&km) {
                return Err(DbError::Validation(format!(
                    "maxDistanceKm must be within [{MIN_MAX_DISTANCE_KM}, {MAX_MAX_DISTANCE_KM}], got {km}"
                )));
            }
        }
        if let Some(location) = &self.location_preferences {
            check_list("locationPreferences.preferredAreas", &location.preferred_areas)?;
            check_list("locationPreferences.avoidAreas", &location.avoid_areas)?;
        }
        if let Some(advanced) = &self.advanced_preferences {
            check_list("advancedPreferences.dietaryRestrictions", &advanced.dietary_restrictions)?;
            check_list("advancedPreferences.allergies", &advanced.allergies)?;
            check_list("advancedPreferences.languagePreferences", &advanced.language_preferences)?;
        }
        Ok(())
    }
}

// =============================================================================
// User Preferences Document
// =============================================================================

/// Stored preference document, one per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    pub user_id: String,
    #[serde(flatten)]
    pub vector: PreferenceVector,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: String,
}

impl UserPreferences {
    /// Fresh document holding the default vector.
    pub fn new(user_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            vector: PreferenceVector::default(),
            created_at: now,
            updated_at: now,
            version: PREFERENCES_VERSION.to_string(),
        }
    }
}

// =============================================================================
// Meal Record
// =============================================================================

/// Meal as held by the meal store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealRecord {
    #[serde(flatten)]
    pub meal: CandidateMeal,
    pub host_id: String,
    #[serde(default)]
    pub participant_ids: Vec<String>,
}

impl MealRecord {
    pub fn new(meal: CandidateMeal, host_id: impl Into<String>) -> Self {
        Self { meal, host_id: host_id.into(), participant_ids: vec![] }
    }

    pub fn with_participant(mut self, user_id: impl Into<String>) -> Self {
        self.participant_ids.push(user_id.into());
        self
    }

    /// True if the user hosted or joined this meal.
    pub fn involves(&self, user_id: &str) -> bool {
        self.host_id == user_id || self.participant_ids.iter().any(|p| p == user_id)
    }

    /// Candidate view; the participant count follows the stored roster when there is one.
    pub fn to_candidate(&self) -> CandidateMeal {
        let mut meal = self.meal.clone();
        if !self.participant_ids.is_empty() {
            meal.participant_count = self.participant_ids.len() as u32;
        }
        meal
    }
}
