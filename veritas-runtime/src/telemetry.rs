//! Telemetry sinks
//!
//! The engine emits exactly one [`TelemetryRecord`] per aggregation call.
//! Sinks must not block; anything slow belongs behind a channel.

use parking_lot::Mutex;
use tracing::info;

use veritas_core::TelemetryRecord;

/// Destination for per-call aggregation records
pub trait TelemetrySink: Send + Sync {
    fn emit(&self, record: &TelemetryRecord);
}

/// Emits records as structured `tracing` events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn emit(&self, record: &TelemetryRecord) {
        info!(
            target: "veritas::telemetry",
            score = record.score,
            confidence = record.confidence,
            coverage = record.coverage,
            low_confidence = record.low_confidence,
            vertical = record.vertical.as_deref().unwrap_or("-"),
            used = record.used_count,
            missing = record.missing_count,
            strategy = %record.strategy,
            alpha = record.alpha,
            timestamp = %record.timestamp,
            fingerprint = %record.fingerprint,
            "aggregation complete"
        );
    }
}

/// Keeps records in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<TelemetryRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<TelemetryRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl TelemetrySink for MemorySink {
    fn emit(&self, record: &TelemetryRecord) {
        self.records.lock().push(record.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use veritas_core::{aggregate, input_fingerprint, AggregatorOptions, Signal};

    #[test]
    fn test_memory_sink_collects() {
        let signals = vec![Signal::builder("recalls").weight(1.0).value(0.4).build()];
        let options = AggregatorOptions::default();
        let result = aggregate(&signals, &options, Utc::now());
        let record = TelemetryRecord::from_result(&result, input_fingerprint(&signals, &options));

        let sink = MemorySink::new();
        assert!(sink.is_empty());
        sink.emit(&record);
        TracingSink.emit(&record);

        assert_eq!(sink.len(), 1);
        assert_eq!(sink.records()[0], record);
    }
}
