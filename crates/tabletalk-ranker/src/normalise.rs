//! Score normalisation functions.

/// Map an affinity in [-1, 1] onto [0, 1].
pub fn normalise_affinity(affinity: f64) -> f64 {
    ((affinity + 1.0) / 2.0).clamp(0.0, 1.0)
}

/// Add a bonus to a base score, capping at 1.0.
pub fn with_bonus(base: f64, bonus: f64) -> f64 {
    (base + bonus).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affinity_normalisation() {
        assert!((normalise_affinity(-1.0) - 0.0).abs() < 1e-9);
        assert!((normalise_affinity(0.0) - 0.5).abs() < 1e-9);
        assert!((normalise_affinity(0.6) - 0.8).abs() < 1e-9);
        assert!((normalise_affinity(1.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_range_affinity_is_clamped() {
        assert_eq!(normalise_affinity(3.0), 1.0);
        assert_eq!(normalise_affinity(-3.0), 0.0);
    }

    #[test]
    fn test_bonus_caps_at_one() {
        assert!((with_bonus(0.5, 0.1) - 0.6).abs() < 1e-9);
        assert_eq!(with_bonus(0.95, 0.1), 1.0);
    }
}
