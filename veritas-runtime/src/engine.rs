//! Trust Engine
//!
//! Entry point wrapping the pure aggregation with its collaborators:
//! - Weight profile selection per vertical
//! - One telemetry record per call
//! - Best-effort, fire-and-forget diagnostics persistence
//!
//! The returned result never depends on telemetry or persistence.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use veritas_core::{
    aggregate, input_fingerprint, AggregationResult, AggregatorOptions, Observation,
    ProfileRegistry, Signal, TelemetryRecord,
};

use crate::{ConfigError, EngineSettings, ScoreStore, TelemetrySink, TracingSink};

/// A request to score one entity from its observations
#[derive(Debug, Clone, Default)]
pub struct EntityRequest {
    pub entity_id: String,
    /// Selects the weight profile; overrides the options' vertical when set
    pub vertical: Option<String>,
    /// Observations keyed by signal key
    pub observations: HashMap<String, Observation>,
    /// Per-request options; the engine defaults apply when None
    pub options: Option<AggregatorOptions>,
    /// Evaluation instant; now when None
    pub evaluated_at: Option<DateTime<Utc>>,
    /// Attach diagnostics to the entity's latest score record
    pub persist: bool,
}

impl EntityRequest {
    pub fn new(entity_id: &str) -> Self {
        Self {
            entity_id: entity_id.to_string(),
            ..Default::default()
        }
    }

    pub fn vertical(mut self, vertical: &str) -> Self {
        self.vertical = Some(vertical.to_string());
        self
    }

    pub fn observe(mut self, key: &str, observation: Observation) -> Self {
        self.observations.insert(key.to_string(), observation);
        self
    }

    pub fn options(mut self, options: AggregatorOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn at(mut self, evaluated_at: DateTime<Utc>) -> Self {
        self.evaluated_at = Some(evaluated_at);
        self
    }

    pub fn persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }
}

/// Outcome of a diagnostics persistence attempt
#[derive(Debug, Clone, PartialEq)]
pub enum PersistOutcome {
    Attached { score_id: Uuid },
    NoScoreRecord,
    Failed(String),
}

/// Handle to a spawned persistence task
#[derive(Debug)]
pub struct PersistHandle(JoinHandle<PersistOutcome>);

impl PersistHandle {
    /// Wait for the task; a panicked or cancelled task reports as failed
    pub async fn outcome(self) -> PersistOutcome {
        self.0
            .await
            .unwrap_or_else(|e| PersistOutcome::Failed(e.to_string()))
    }
}

/// Result of scoring one entity
#[derive(Debug)]
pub struct TrustComputation {
    pub entity_id: String,
    /// Name of the weight profile used
    pub profile: String,
    pub result: AggregationResult,
    /// Present when persistence was requested and could be started
    pub persistence: Option<PersistHandle>,
}

/// Aggregation entry point with injected collaborators
pub struct TrustEngine {
    profiles: Arc<ProfileRegistry>,
    defaults: AggregatorOptions,
    telemetry: Arc<dyn TelemetrySink>,
    store: Option<Arc<dyn ScoreStore>>,
}

impl TrustEngine {
    /// Engine with default options, tracing telemetry and no store
    pub fn new(profiles: ProfileRegistry) -> Self {
        Self {
            profiles: Arc::new(profiles),
            defaults: AggregatorOptions::default(),
            telemetry: Arc::new(TracingSink),
            store: None,
        }
    }

    /// Engine configured from settings
    pub fn from_settings(settings: &EngineSettings) -> Result<Self, ConfigError> {
        let profiles = settings.load_profiles()?;
        Ok(Self::new(profiles).with_defaults(settings.aggregator.clone()))
    }

    pub fn with_defaults(mut self, defaults: AggregatorOptions) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_telemetry(mut self, telemetry: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn with_store(mut self, store: Arc<dyn ScoreStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn profiles(&self) -> &ProfileRegistry {
        &self.profiles
    }

    pub fn defaults(&self) -> &AggregatorOptions {
        &self.defaults
    }

    /// Aggregate signals and emit one telemetry record
    pub fn aggregate(
        &self,
        signals: &[Signal],
        options: &AggregatorOptions,
        evaluated_at: DateTime<Utc>,
    ) -> AggregationResult {
        let result = aggregate(signals, options, evaluated_at);
        let record = TelemetryRecord::from_result(&result, input_fingerprint(signals, options));
        self.telemetry.emit(&record);
        result
    }

    /// Score an entity from observations using its vertical's weight profile
    pub fn score_entity(&self, request: EntityRequest) -> TrustComputation {
        let mut options = request.options.unwrap_or_else(|| self.defaults.clone());
        if request.vertical.is_some() {
            options.vertical = request.vertical;
        }

        let profile = self.profiles.for_vertical(options.vertical.as_deref());
        let signals = profile.signals_from(&request.observations);
        debug!(
            "Scoring '{}' with profile '{}' ({} signals, {} observed)",
            request.entity_id,
            profile.name,
            signals.len(),
            signals.iter().filter(|s| s.is_available()).count()
        );

        let evaluated_at = request.evaluated_at.unwrap_or_else(Utc::now);
        let result = self.aggregate(&signals, &options, evaluated_at);

        let persistence = if request.persist {
            self.persist(&request.entity_id, &result)
        } else {
            None
        };

        TrustComputation {
            entity_id: request.entity_id,
            profile: profile.name.clone(),
            result,
            persistence,
        }
    }

    /// Spawn best-effort attachment of diagnostics to the entity's latest score
    ///
    /// Returns None when no store is configured or no tokio runtime is running.
    pub fn persist(&self, entity_id: &str, result: &AggregationResult) -> Option<PersistHandle> {
        let Some(store) = self.store.clone() else {
            debug!("No score store configured, skipping diagnostics for '{}'", entity_id);
            return None;
        };

        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Cannot persist diagnostics for '{}': {}", entity_id, e);
                return None;
            }
        };

        let entity_id = entity_id.to_string();
        let result = result.clone();
        let task = handle.spawn(async move {
            attach_latest(store.as_ref(), &entity_id, result).await
        });

        Some(PersistHandle(task))
    }
}

async fn attach_latest(
    store: &dyn ScoreStore,
    entity_id: &str,
    diagnostics: AggregationResult,
) -> PersistOutcome {
    let record = match store.find_latest_score_for(entity_id).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            warn!("No score record for '{}', diagnostics dropped", entity_id);
            return PersistOutcome::NoScoreRecord;
        }
        Err(e) => {
            warn!("Score lookup failed for '{}': {}", entity_id, e);
            return PersistOutcome::Failed(e.to_string());
        }
    };

    match store.attach_diagnostics(record.id, diagnostics).await {
        Ok(()) => {
            debug!("Attached diagnostics to score {} for '{}'", record.id, entity_id);
            PersistOutcome::Attached { score_id: record.id }
        }
        Err(e) => {
            warn!("Failed to attach diagnostics to score {}: {}", record.id, e);
            PersistOutcome::Failed(e.to_string())
        }
    }
}
