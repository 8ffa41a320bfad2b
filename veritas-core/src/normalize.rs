//! Weight normalization and availability classification
//!
//! Degenerate input is sanitized, never rejected: negative or non-finite
//! weights count as zero, and an all-zero weight set is left as-is.

use crate::Signal;

/// Sanitize a raw weight to a finite, non-negative number
pub fn sanitize_weight(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 {
        weight
    } else {
        0.0
    }
}

/// Rescale weights so they sum to 1
///
/// When the sanitized total is zero the signals keep their sanitized
/// weights (all zero), which drives coverage to zero downstream.
///
/// Weights are scaled by their maximum before summing so that large finite
/// weights cannot overflow the total.
pub fn normalize_weights(signals: &[Signal]) -> Vec<Signal> {
    let max = signals
        .iter()
        .map(|s| sanitize_weight(s.weight))
        .fold(0.0, f64::max);
    let total: f64 = if max > 0.0 {
        signals.iter().map(|s| sanitize_weight(s.weight) / max).sum()
    } else {
        0.0
    };

    signals
        .iter()
        .map(|signal| {
            let weight = sanitize_weight(signal.weight);
            Signal {
                weight: if total > 0.0 { (weight / max) / total } else { weight },
                ..signal.clone()
            }
        })
        .collect()
}

/// A signal with a finite value, clamped to [0, 1]
#[derive(Debug, Clone, PartialEq)]
pub struct AvailableSignal<'a> {
    pub signal: &'a Signal,
    pub value: f64,
}

/// Signals split by availability, preserving input order
#[derive(Debug, Default)]
pub struct Classified<'a> {
    pub available: Vec<AvailableSignal<'a>>,
    pub missing: Vec<&'a Signal>,
    /// Sum of the (normalized) weights of missing signals
    pub missing_weight: f64,
}

/// Split signals into available and missing
pub fn classify(signals: &[Signal]) -> Classified<'_> {
    let mut classified = Classified::default();

    for signal in signals {
        match signal.observed_value() {
            Some(value) => classified.available.push(AvailableSignal {
                signal,
                value: value.clamp(0.0, 1.0),
            }),
            None => {
                classified.missing_weight += signal.weight;
                classified.missing.push(signal);
            }
        }
    }

    classified
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_sums_to_one() {
        let signals = vec![
            Signal::builder("a").weight(3.0).value(0.1).build(),
            Signal::builder("b").weight(1.0).build(),
        ];

        let normalized = normalize_weights(&signals);
        assert!((normalized[0].weight - 0.75).abs() < 1e-12);
        assert!((normalized[1].weight - 0.25).abs() < 1e-12);
        let total: f64 = normalized.iter().map(|s| s.weight).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_all_zero_weights_retained() {
        let signals = vec![Signal::new("a", 0.0), Signal::new("b", 0.0)];
        let normalized = normalize_weights(&signals);
        assert!(normalized.iter().all(|s| s.weight == 0.0));
    }

    #[test]
    fn test_negative_and_nan_weights_ignored() {
        let signals = vec![
            Signal::new("a", -2.0),
            Signal::new("b", f64::NAN),
            Signal::new("c", 2.0),
        ];
        let normalized = normalize_weights(&signals);
        assert_eq!(normalized[0].weight, 0.0);
        assert_eq!(normalized[1].weight, 0.0);
        assert_eq!(normalized[2].weight, 1.0);
    }

    #[test]
    fn test_huge_weights_do_not_overflow() {
        let signals = vec![
            Signal::new("a", 1e308),
            Signal::new("b", 1e308),
            Signal::new("c", f64::MAX),
        ];
        let normalized = normalize_weights(&signals);

        assert!(normalized.iter().all(|s| s.weight.is_finite() && s.weight > 0.0));
        let total: f64 = normalized.iter().map(|s| s.weight).sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert!((normalized[0].weight - normalized[1].weight).abs() < 1e-15);
    }

    #[test]
    fn test_classify_preserves_order_and_clamps() {
        let signals = vec![
            Signal::builder("a").weight(0.2).value(1.5).build(),
            Signal::builder("b").weight(0.3).build(),
            Signal::builder("c").weight(0.1).value(-0.3).build(),
            Signal::builder("d").weight(0.4).value(f64::NAN).build(),
        ];

        let classified = classify(&signals);
        let available: Vec<_> = classified
            .available
            .iter()
            .map(|a| (a.signal.key.as_str(), a.value))
            .collect();
        assert_eq!(available, vec![("a", 1.0), ("c", 0.0)]);

        let missing: Vec<_> = classified.missing.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(missing, vec!["b", "d"]);
        assert!((classified.missing_weight - 0.7).abs() < 1e-12);
    }
}
