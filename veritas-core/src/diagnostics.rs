//! Aggregation results and the records derived from them
//!
//! - [`AggregationResult`]: the full, auditable outcome of one call
//! - [`TelemetryRecord`]: the flat per-call record sent to a telemetry sink
//! - [`ScoreView`]: what external consumers see, diagnostics optional

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{AggregatorOptions, Grade, Signal};

/// A signal that contributed data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsedSignal {
    pub key: String,
    /// Normalized weight before decay
    pub weight: f64,
    /// Value clamped to [0, 1]
    pub value: f64,
    /// Weight after time decay, when decay applied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decayed_weight: Option<f64>,
}

impl UsedSignal {
    /// Weight that actually entered the shrinkage sums
    pub fn effective_weight(&self) -> f64 {
        self.decayed_weight.unwrap_or(self.weight)
    }
}

/// A signal with no usable value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingSignal {
    pub key: String,
    /// Normalized weight, counted toward the missing weight
    pub weight: f64,
}

/// Intermediate values of the shrinkage computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    pub numerator: f64,
    pub denom: f64,
    pub alpha: f64,
    pub prior: f64,
    pub strategy: String,
    pub missing_weight: f64,
}

/// Full outcome of one aggregation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationResult {
    pub score: f64,
    pub confidence: f64,
    pub coverage: f64,
    pub used_signals: Vec<UsedSignal>,
    pub missing_signals: Vec<MissingSignal>,
    pub breakdown: Breakdown,
    pub low_confidence: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl AggregationResult {
    pub fn grade(&self) -> Grade {
        Grade::from_score(self.score)
    }

    /// Externally-surfaced view; the breakdown is attached only on request
    pub fn to_view(&self, include_diagnostics: bool) -> ScoreView {
        ScoreView {
            score: self.score,
            confidence: self.confidence,
            grade: self.grade(),
            diagnostics: include_diagnostics.then(|| self.clone()),
        }
    }
}

/// Score as exposed to API consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreView {
    pub score: f64,
    pub confidence: f64,
    pub grade: Grade,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<AggregationResult>,
}

/// One structured record per aggregation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryRecord {
    pub score: f64,
    pub confidence: f64,
    pub coverage: f64,
    pub low_confidence: bool,
    pub vertical: Option<String>,
    pub used_count: usize,
    pub missing_count: usize,
    pub strategy: String,
    pub alpha: f64,
    pub timestamp: DateTime<Utc>,
    /// Digest of the inputs, equal for identical signals and options
    pub fingerprint: String,
}

impl TelemetryRecord {
    pub fn from_result(result: &AggregationResult, fingerprint: String) -> Self {
        Self {
            score: result.score,
            confidence: result.confidence,
            coverage: result.coverage,
            low_confidence: result.low_confidence,
            vertical: result.vertical.clone(),
            used_count: result.used_signals.len(),
            missing_count: result.missing_signals.len(),
            strategy: result.breakdown.strategy.clone(),
            alpha: result.breakdown.alpha,
            timestamp: result.timestamp,
            fingerprint,
        }
    }
}

/// Short SHA-256 digest of the signals and sanitized options
pub fn input_fingerprint(signals: &[Signal], options: &AggregatorOptions) -> String {
    let mut hasher = Sha256::new();
    let signals_json = serde_json::to_string(signals).unwrap_or_default();
    let options_json = serde_json::to_string(&options.sanitized()).unwrap_or_default();
    hasher.update(signals_json.as_bytes());
    hasher.update(options_json.as_bytes());
    format!("{:x}", hasher.finalize())[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> AggregationResult {
        AggregationResult {
            score: 0.7,
            confidence: 0.5,
            coverage: 0.5,
            used_signals: vec![UsedSignal {
                key: "recalls".to_string(),
                weight: 0.5,
                value: 0.9,
                decayed_weight: None,
            }],
            missing_signals: vec![MissingSignal {
                key: "complaints".to_string(),
                weight: 0.5,
            }],
            breakdown: Breakdown {
                numerator: 0.45,
                denom: 0.5,
                alpha: 0.5,
                prior: 0.5,
                strategy: "missingSum".to_string(),
                missing_weight: 0.5,
            },
            low_confidence: false,
            vertical: Some("automotive".to_string()),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_view_suppresses_diagnostics() {
        let result = sample_result();

        let view = result.to_view(false);
        assert_eq!(view.score, 0.7);
        assert_eq!(view.grade, Grade::B);
        assert!(view.diagnostics.is_none());

        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("diagnostics").is_none());
        assert!(json.get("usedSignals").is_none());

        let view = result.to_view(true);
        assert_eq!(view.diagnostics.as_ref(), Some(&result));
    }

    #[test]
    fn test_result_json_shape() {
        let json = serde_json::to_value(sample_result()).unwrap();
        assert!(json.get("usedSignals").is_some());
        assert!(json.get("missingSignals").is_some());
        assert!(json.get("lowConfidence").is_some());
        assert_eq!(json["breakdown"]["strategy"], "missingSum");
        assert!(json["usedSignals"][0].get("decayedWeight").is_none());
    }

    #[test]
    fn test_telemetry_counts() {
        let result = sample_result();
        let record = TelemetryRecord::from_result(&result, "abc".to_string());
        assert_eq!(record.used_count, 1);
        assert_eq!(record.missing_count, 1);
        assert_eq!(record.alpha, 0.5);
        assert_eq!(record.vertical.as_deref(), Some("automotive"));
    }

    #[test]
    fn test_fingerprint_stable() {
        let signals = vec![Signal::builder("a").weight(0.5).value(0.2).build()];
        let options = AggregatorOptions::default();
        let a = input_fingerprint(&signals, &options);
        let b = input_fingerprint(&signals, &options);
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);

        let other = input_fingerprint(&signals, &options.clone().with_prior(0.8));
        assert_ne!(a, other);
    }
}
