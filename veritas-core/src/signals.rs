//! Weighted observations feeding a trust score
//!
//! A signal is an immutable input record:
//! - A key naming the source (recalls, complaints, ...)
//! - A non-negative weight from the entity's weight profile
//! - An optional value, already normalized to [0, 1] by the caller
//! - An optional observation timestamp used for time decay

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single weighted, possibly-missing observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    /// Signal key, unique within one aggregation call
    pub key: String,

    /// Raw weight (sanitized to >= 0 during normalization)
    pub weight: f64,

    /// Observed value in [0, 1]; out-of-range values are clamped, NaN is missing
    #[serde(default)]
    pub value: Option<f64>,

    /// When the observation was made
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Signal {
    /// Create a signal with no observed value
    pub fn new(key: impl Into<String>, weight: f64) -> Self {
        Self {
            key: key.into(),
            weight,
            value: None,
            timestamp: None,
        }
    }

    /// Create a new signal builder
    pub fn builder(key: impl Into<String>) -> SignalBuilder {
        SignalBuilder::new(key)
    }

    /// Finite observed value, if any
    pub fn observed_value(&self) -> Option<f64> {
        self.value.filter(|v| v.is_finite())
    }

    /// Whether this signal carries usable data
    pub fn is_available(&self) -> bool {
        self.observed_value().is_some()
    }
}

/// Builder for signals
pub struct SignalBuilder {
    key: String,
    weight: f64,
    value: Option<f64>,
    timestamp: Option<DateTime<Utc>>,
}

impl SignalBuilder {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            weight: 1.0,
            value: None,
            timestamp: None,
        }
    }

    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn maybe_value(mut self, value: Option<f64>) -> Self {
        self.value = value;
        self
    }

    pub fn observed_at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn maybe_observed_at(mut self, timestamp: Option<DateTime<Utc>>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn build(self) -> Signal {
        Signal {
            key: self.key,
            weight: self.weight,
            value: self.value,
            timestamp: self.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_builder() {
        let now = Utc::now();
        let signal = Signal::builder("recalls")
            .weight(0.3)
            .value(0.9)
            .observed_at(now)
            .build();

        assert_eq!(signal.key, "recalls");
        assert_eq!(signal.weight, 0.3);
        assert_eq!(signal.value, Some(0.9));
        assert_eq!(signal.timestamp, Some(now));
    }

    #[test]
    fn test_nan_is_unavailable() {
        let signal = Signal::builder("sentiment").value(f64::NAN).build();
        assert!(!signal.is_available());

        let signal = Signal::builder("sentiment").value(f64::INFINITY).build();
        assert!(!signal.is_available());

        assert!(!Signal::new("warranty", 0.2).is_available());
    }

    #[test]
    fn test_deserialize_without_optional_fields() {
        let signal: Signal = serde_json::from_str(r#"{"key":"legal","weight":0.25}"#).unwrap();
        assert_eq!(signal.value, None);
        assert_eq!(signal.timestamp, None);
    }
}
