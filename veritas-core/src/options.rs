//! Aggregator options
//!
//! Options deserialize from TOML or JSON with defaults for every field, and
//! are sanitized before use so that no option value can make aggregation fail.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{DEFAULT_ALPHA_FIXED, DEFAULT_MIN_COVERAGE_WARN, DEFAULT_PRIOR};

/// How the prior's pseudo-weight is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum AlphaStrategy {
    /// alpha = total normalized weight of missing signals
    #[default]
    MissingSum,
    /// alpha = a configured constant
    Fixed,
}

impl AlphaStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlphaStrategy::MissingSum => "missingSum",
            AlphaStrategy::Fixed => "fixed",
        }
    }
}

impl fmt::Display for AlphaStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlphaStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['_', '-'], "").as_str() {
            "missingsum" => Ok(AlphaStrategy::MissingSum),
            "fixed" => Ok(AlphaStrategy::Fixed),
            other => Err(format!(
                "unknown alpha strategy '{}' (expected missingSum or fixed)",
                other
            )),
        }
    }
}

/// Options for a single aggregation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AggregatorOptions {
    /// Shrinkage target when data is absent
    pub prior: f64,

    /// Alpha selection strategy
    pub alpha_strategy: AlphaStrategy,

    /// Constant alpha, only used with the fixed strategy
    pub alpha_fixed: f64,

    /// Coverage below this flags the result as low-confidence
    pub min_coverage_warn: f64,

    /// Half-life in days for time decay; None disables decay
    pub time_decay_days: Option<f64>,

    /// Entity category, echoed for logging only
    pub vertical: Option<String>,
}

impl Default for AggregatorOptions {
    fn default() -> Self {
        Self {
            prior: DEFAULT_PRIOR,
            alpha_strategy: AlphaStrategy::default(),
            alpha_fixed: DEFAULT_ALPHA_FIXED,
            min_coverage_warn: DEFAULT_MIN_COVERAGE_WARN,
            time_decay_days: None,
            vertical: None,
        }
    }
}

impl AggregatorOptions {
    pub fn with_prior(mut self, prior: f64) -> Self {
        self.prior = prior;
        self
    }

    pub fn with_fixed_alpha(mut self, alpha: f64) -> Self {
        self.alpha_strategy = AlphaStrategy::Fixed;
        self.alpha_fixed = alpha;
        self
    }

    pub fn with_strategy(mut self, strategy: AlphaStrategy) -> Self {
        self.alpha_strategy = strategy;
        self
    }

    pub fn with_min_coverage_warn(mut self, threshold: f64) -> Self {
        self.min_coverage_warn = threshold;
        self
    }

    pub fn with_time_decay_days(mut self, days: f64) -> Self {
        self.time_decay_days = Some(days);
        self
    }

    pub fn with_vertical(mut self, vertical: &str) -> Self {
        self.vertical = Some(vertical.to_string());
        self
    }

    /// Replace out-of-domain values with usable ones
    ///
    /// - Non-finite prior falls back to the default; finite priors clamp to [0, 1]
    /// - Negative or non-finite fixed alpha becomes 0
    /// - Non-finite coverage threshold falls back to the default
    /// - Non-positive or non-finite half-life disables decay
    pub fn sanitized(&self) -> Self {
        let prior = if self.prior.is_finite() {
            self.prior.clamp(0.0, 1.0)
        } else {
            DEFAULT_PRIOR
        };

        let alpha_fixed = if self.alpha_fixed.is_finite() {
            self.alpha_fixed.max(0.0)
        } else {
            0.0
        };

        let min_coverage_warn = if self.min_coverage_warn.is_finite() {
            self.min_coverage_warn
        } else {
            DEFAULT_MIN_COVERAGE_WARN
        };

        let time_decay_days = self
            .time_decay_days
            .filter(|days| days.is_finite() && *days > 0.0);

        Self {
            prior,
            alpha_strategy: self.alpha_strategy,
            alpha_fixed,
            min_coverage_warn,
            time_decay_days,
            vertical: self.vertical.clone(),
        }
    }
}
