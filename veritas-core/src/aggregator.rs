//! Signal aggregation
//!
//! One pure, synchronous call turns a signal list into an [`AggregationResult`]:
//! 1. Normalize weights to sum to 1
//! 2. Classify signals as available or missing
//! 3. Apply time decay to dated, available signals
//! 4. Select alpha from the missing weight
//! 5. Shrink the weighted average toward the prior
//!
//! Evaluation time is an explicit argument so that results are reproducible.

use chrono::{DateTime, Utc};

use crate::{
    alpha::{sanitize_alpha, selector_for},
    classify, decayed_weight, normalize_weights, shrink, AggregationResult, AggregatorOptions,
    AlphaSelector, Breakdown, MissingSignal, ShrinkageSums, Signal, UsedSignal,
};

/// Aggregate signals using the options' alpha strategy
pub fn aggregate(
    signals: &[Signal],
    options: &AggregatorOptions,
    evaluated_at: DateTime<Utc>,
) -> AggregationResult {
    let selector = selector_for(&options.sanitized());
    aggregate_with(signals, options, selector.as_ref(), evaluated_at)
}

/// Aggregate signals at the current wall-clock time
pub fn aggregate_now(signals: &[Signal], options: &AggregatorOptions) -> AggregationResult {
    aggregate(signals, options, Utc::now())
}

/// Aggregate signals with a caller-supplied alpha strategy
pub fn aggregate_with(
    signals: &[Signal],
    options: &AggregatorOptions,
    selector: &dyn AlphaSelector,
    evaluated_at: DateTime<Utc>,
) -> AggregationResult {
    let options = options.sanitized();
    let normalized = normalize_weights(signals);
    let classified = classify(&normalized);

    let mut sums = ShrinkageSums::default();
    let used_signals: Vec<UsedSignal> = classified
        .available
        .iter()
        .map(|available| {
            let signal = available.signal;
            let decayed = decayed_weight(
                signal.weight,
                signal.timestamp,
                options.time_decay_days,
                evaluated_at,
            );
            let used = UsedSignal {
                key: signal.key.clone(),
                weight: signal.weight,
                value: available.value,
                decayed_weight: decayed,
            };
            sums.add(used.effective_weight(), used.value);
            used
        })
        .collect();

    let missing_signals: Vec<MissingSignal> = classified
        .missing
        .iter()
        .map(|signal| MissingSignal {
            key: signal.key.clone(),
            weight: signal.weight,
        })
        .collect();

    let alpha = sanitize_alpha(selector.select(classified.missing_weight));
    let shrunk = shrink(sums, alpha, options.prior);

    AggregationResult {
        score: shrunk.score,
        confidence: shrunk.confidence,
        coverage: shrunk.coverage,
        used_signals,
        missing_signals,
        breakdown: Breakdown {
            numerator: sums.numerator,
            denom: sums.denom,
            alpha,
            prior: options.prior,
            strategy: selector.name().to_string(),
            missing_weight: classified.missing_weight,
        },
        low_confidence: shrunk.coverage < options.min_coverage_warn,
        vertical: options.vertical,
        timestamp: evaluated_at,
    }
}
