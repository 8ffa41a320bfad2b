//! Veritas Core - Signal types and shrinkage aggregation for trust scoring
//!
//! This crate provides the pure, synchronous primitives:
//! - Weighted, possibly-missing signals with optional observation timestamps
//! - Weight normalization and availability classification
//! - Exponential time decay with a configurable half-life
//! - Alpha (prior pseudo-weight) strategies
//! - Bayesian shrinkage toward a prior, with confidence and coverage
//! - Diagnostics and telemetry records
//! - Per-vertical weight profiles and letter grades
//!
//! Nothing in the aggregation path performs I/O or returns an error.

pub mod aggregator;
pub mod alpha;
pub mod decay;
pub mod diagnostics;
pub mod grade;
pub mod normalize;
pub mod options;
pub mod profiles;
pub mod shrinkage;
pub mod signals;

pub use aggregator::*;
pub use alpha::*;
pub use decay::*;
pub use diagnostics::*;
pub use grade::*;
pub use normalize::*;
pub use options::*;
pub use profiles::*;
pub use shrinkage::*;
pub use signals::*;

/// Default prior belief when data is absent
pub const DEFAULT_PRIOR: f64 = 0.5;

/// Default constant alpha for the fixed strategy
pub const DEFAULT_ALPHA_FIXED: f64 = 0.3;

/// Default coverage below which a result is flagged low-confidence
pub const DEFAULT_MIN_COVERAGE_WARN: f64 = 0.4;

/// Minimum score / confidence / coverage
pub const MIN_SCORE: f64 = 0.0;

/// Maximum score / confidence / coverage
pub const MAX_SCORE: f64 = 1.0;
