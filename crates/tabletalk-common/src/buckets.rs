//! Discrete buckets used by both the scorer and the preference learner.
//! Keeping the boundaries in one place keeps the two in agreement.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Time-of-day slot derived from a meal's local start hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSlot {
    Breakfast,
    Lunch,
    Aperitif,
    Dinner,
}

impl TimeSlot {
    /// Breakfast 7–10, lunch 12–15, aperitif 17–19, dinner 19–23 (inclusive).
    /// Any other hour has no slot.
    pub fn from_hour(hour: u32) -> Option<Self> {
        match hour {
            7..=9 => Some(Self::Breakfast),
            12..=14 => Some(Self::Lunch),
            17..=18 => Some(Self::Aperitif),
            19..=23 => Some(Self::Dinner),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Aperitif => "aperitif",
            Self::Dinner => "dinner",
        }
    }
}

/// Price band from the estimated cost per person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceBand {
    Budget,
    Moderate,
    Upscale,
}

impl PriceBand {
    /// budget ≤ 20, moderate ≤ 40, upscale above.
    pub fn from_cost(cost: f64) -> Self {
        if cost <= 20.0 {
            Self::Budget
        } else if cost <= 40.0 {
            Self::Moderate
        } else {
            Self::Upscale
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Budget => "budget",
            Self::Moderate => "moderate",
            Self::Upscale => "upscale",
        }
    }
}

/// Table size band from the participant cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupSize {
    /// 2–4 people
    Intimate,
    /// 5–8 people
    Medium,
    /// 9 or more
    Large,
}

impl GroupSize {
    pub fn from_max_participants(max: u32) -> Self {
        match max {
            0..=4 => Self::Intimate,
            5..=8 => Self::Medium,
            _ => Self::Large,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Intimate => "intimate",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeGroup {
    /// 18–25
    Young,
    /// 26–40
    Adult,
    /// over 40
    Mature,
}

impl AgeGroup {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Young => "young",
            Self::Adult => "adult",
            Self::Mature => "mature",
        }
    }
}

macro_rules! impl_display {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

impl_display!(TimeSlot, PriceBand, GroupSize, AgeGroup);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_slot_boundaries() {
        assert_eq!(TimeSlot::from_hour(6), None);
        assert_eq!(TimeSlot::from_hour(7), Some(TimeSlot::Breakfast));
        assert_eq!(TimeSlot::from_hour(10), None);
        assert_eq!(TimeSlot::from_hour(12), Some(TimeSlot::Lunch));
        assert_eq!(TimeSlot::from_hour(15), None);
        assert_eq!(TimeSlot::from_hour(17), Some(TimeSlot::Aperitif));
        assert_eq!(TimeSlot::from_hour(19), Some(TimeSlot::Dinner));
        assert_eq!(TimeSlot::from_hour(23), Some(TimeSlot::Dinner));
        assert_eq!(TimeSlot::from_hour(0), None);
    }

    #[test]
    fn test_price_band_boundaries() {
        assert_eq!(PriceBand::from_cost(20.0), PriceBand::Budget);
        assert_eq!(PriceBand::from_cost(20.5), PriceBand::Moderate);
        assert_eq!(PriceBand::from_cost(40.0), PriceBand::Moderate);
        assert_eq!(PriceBand::from_cost(41.0), PriceBand::Upscale);
    }

    #[test]
    fn test_group_size_boundaries() {
        assert_eq!(GroupSize::from_max_participants(4), GroupSize::Intimate);
        assert_eq!(GroupSize::from_max_participants(5), GroupSize::Medium);
        assert_eq!(GroupSize::from_max_participants(8), GroupSize::Medium);
        assert_eq!(GroupSize::from_max_participants(9), GroupSize::Large);
    }

    #[test]
    fn test_bucket_keys_serialise_as_map_keys() {
        let mut m = std::collections::BTreeMap::new();
        m.insert(TimeSlot::Aperitif, 0.3);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, r#"{"aperitif":0.3}"#);
        let back: std::collections::BTreeMap<TimeSlot, f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }
}
