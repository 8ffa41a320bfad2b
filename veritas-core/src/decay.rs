//! Recency weighting for dated signals
//!
//! Exponential decay with half-life `H_days`:
//!   factor(age) = e^(-age / (H_days / ln 2)) = 0.5^(age / H_days)
//!
//! Future-dated observations are not decayed. Signals without a timestamp
//! are never decayed, even when decay is enabled for the call.

use chrono::{DateTime, Utc};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Age of an observation in fractional days (negative if future-dated)
pub fn age_in_days(observed_at: DateTime<Utc>, evaluated_at: DateTime<Utc>) -> f64 {
    (evaluated_at - observed_at).num_milliseconds() as f64 / MILLIS_PER_DAY
}

/// Decay factor in [0, 1] for an observation `age_days` old
pub fn decay_factor(age_days: f64, half_life_days: f64) -> f64 {
    if !age_days.is_finite() || age_days <= 0.0 {
        return 1.0;
    }
    if !half_life_days.is_finite() || half_life_days <= 0.0 {
        return 1.0;
    }

    let scale = half_life_days / std::f64::consts::LN_2;
    (-age_days / scale).exp().clamp(0.0, 1.0)
}

/// Decayed weight for a signal, or None when decay does not apply
pub fn decayed_weight(
    weight: f64,
    observed_at: Option<DateTime<Utc>>,
    half_life_days: Option<f64>,
    evaluated_at: DateTime<Utc>,
) -> Option<f64> {
    let half_life = half_life_days?;
    let observed_at = observed_at?;
    let age = age_in_days(observed_at, evaluated_at);
    Some(weight * decay_factor(age, half_life))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_one_half_life() {
        assert!((decay_factor(30.0, 30.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_two_half_lives() {
        assert!((decay_factor(60.0, 30.0) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_future_dated_not_decayed() {
        assert_eq!(decay_factor(-5.0, 30.0), 1.0);
        assert_eq!(decay_factor(0.0, 30.0), 1.0);
    }

    #[test]
    fn test_age_in_days() {
        let now = Utc::now();
        let then = now - Duration::hours(36);
        assert!((age_in_days(then, now) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_undated_or_disabled_returns_none() {
        let now = Utc::now();
        assert_eq!(decayed_weight(0.4, None, Some(30.0), now), None);
        assert_eq!(decayed_weight(0.4, Some(now), None, now), None);
    }

    #[test]
    fn test_more_recent_weighs_more() {
        let now = Utc::now();
        let recent = decayed_weight(0.5, Some(now - Duration::days(10)), Some(90.0), now).unwrap();
        let old = decayed_weight(0.5, Some(now - Duration::days(200)), Some(90.0), now).unwrap();
        assert!(recent > old);
        assert!(recent < 0.5);
    }
}
