//! Bayesian shrinkage toward a prior
//!
//! posterior = (numerator + alpha * prior) / (denom + alpha)
//!
//! where numerator and denom are the weighted sum of observed values and the
//! sum of their effective weights. With alpha = 0 this is a plain weighted
//! average; with denom = 0 it collapses to the prior.

use serde::{Deserialize, Serialize};

use crate::{MAX_SCORE, MIN_SCORE};

/// Sums accumulated over available signals
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ShrinkageSums {
    /// Σ effective_weight × clamped_value
    pub numerator: f64,
    /// Σ effective_weight
    pub denom: f64,
}

impl ShrinkageSums {
    pub fn add(&mut self, weight: f64, value: f64) {
        self.numerator += weight * value;
        self.denom += weight;
    }
}

/// Posterior, confidence and coverage for one set of sums
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shrunk {
    pub score: f64,
    pub confidence: f64,
    pub coverage: f64,
}

/// Combine observed sums with the prior, weighted by alpha
pub fn posterior(sums: ShrinkageSums, alpha: f64, prior: f64) -> f64 {
    let total = sums.denom + alpha;
    // No observed weight: the posterior is the prior exactly
    if sums.denom <= 0.0 || total <= 0.0 {
        return clamp_unit(prior);
    }
    clamp_unit((sums.numerator + alpha * prior) / total)
}

/// Share of the posterior's effective weight backed by data
pub fn confidence(sums: ShrinkageSums, alpha: f64) -> f64 {
    let total = sums.denom + alpha;
    if total > 0.0 {
        clamp_unit(sums.denom / total)
    } else {
        0.0
    }
}

/// Normalized weight actually backed by data
pub fn coverage(sums: ShrinkageSums) -> f64 {
    clamp_unit(sums.denom)
}

pub fn shrink(sums: ShrinkageSums, alpha: f64, prior: f64) -> Shrunk {
    Shrunk {
        score: posterior(sums, alpha, prior),
        confidence: confidence(sums, alpha),
        coverage: coverage(sums),
    }
}

/// Clamp to [0, 1], mapping NaN to 0
fn clamp_unit(x: f64) -> f64 {
    if x.is_nan() {
        MIN_SCORE
    } else {
        x.clamp(MIN_SCORE, MAX_SCORE)
    }
}
