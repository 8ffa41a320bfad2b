//! Alpha strategies
//!
//! Alpha is the pseudo-weight given to the prior. Strategies are stateless
//! selectors; the shrinkage math does not know which one produced alpha.

use crate::{AggregatorOptions, AlphaStrategy};

/// Chooses the prior's pseudo-weight from the missing weight
pub trait AlphaSelector: Send + Sync {
    /// Strategy name recorded in the breakdown
    fn name(&self) -> &str;

    /// Alpha for a call with `missing_weight` of normalized weight unobserved
    fn select(&self, missing_weight: f64) -> f64;
}

/// Uncertainty grows linearly with the share of absent signals
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingSumAlpha;

impl AlphaSelector for MissingSumAlpha {
    fn name(&self) -> &str {
        AlphaStrategy::MissingSum.as_str()
    }

    fn select(&self, missing_weight: f64) -> f64 {
        missing_weight
    }
}

/// Constant alpha, so even fully observed entities never reach full confidence
#[derive(Debug, Clone, Copy)]
pub struct FixedAlpha {
    pub alpha: f64,
}

impl FixedAlpha {
    pub fn new(alpha: f64) -> Self {
        Self { alpha }
    }
}

impl AlphaSelector for FixedAlpha {
    fn name(&self) -> &str {
        AlphaStrategy::Fixed.as_str()
    }

    fn select(&self, _missing_weight: f64) -> f64 {
        self.alpha
    }
}

/// Selector for the options' configured strategy
pub fn selector_for(options: &AggregatorOptions) -> Box<dyn AlphaSelector> {
    match options.alpha_strategy {
        AlphaStrategy::MissingSum => Box::new(MissingSumAlpha),
        AlphaStrategy::Fixed => Box::new(FixedAlpha::new(options.alpha_fixed)),
    }
}

/// Clamp a selector's output to a finite, non-negative alpha
pub fn sanitize_alpha(alpha: f64) -> f64 {
    if alpha.is_finite() && alpha > 0.0 {
        alpha
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sum() {
        let selector = MissingSumAlpha;
        assert_eq!(selector.select(0.0), 0.0);
        assert_eq!(selector.select(0.35), 0.35);
        assert_eq!(selector.name(), "missingSum");
    }

    #[test]
    fn test_fixed_ignores_missing_weight() {
        let selector = FixedAlpha::new(0.3);
        assert_eq!(selector.select(0.0), 0.3);
        assert_eq!(selector.select(0.9), 0.3);
        assert_eq!(selector.name(), "fixed");
    }

    #[test]
    fn test_selector_for_options() {
        let options = AggregatorOptions::default().with_fixed_alpha(0.2);
        let selector = selector_for(&options);
        assert_eq!(selector.name(), "fixed");
        assert_eq!(selector.select(0.5), 0.2);

        let selector = selector_for(&AggregatorOptions::default());
        assert_eq!(selector.select(0.5), 0.5);
    }

    #[test]
    fn test_sanitize_alpha() {
        assert_eq!(sanitize_alpha(-0.1), 0.0);
        assert_eq!(sanitize_alpha(f64::NAN), 0.0);
        assert_eq!(sanitize_alpha(0.4), 0.4);
    }
}
