//! Score record persistence
//!
//! Score records are owned by an external store. The engine only looks up
//! the latest record for an entity and attaches diagnostics to it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use veritas_core::{AggregationResult, Grade};

/// Errors from a score store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Score record not found: {0}")]
    NotFound(Uuid),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Write rejected: {0}")]
    Rejected(String),
}

/// A previously computed score, owned by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub id: Uuid,
    pub entity_id: String,
    pub score: f64,
    pub grade: Grade,
    pub created_at: DateTime<Utc>,
    /// Aggregation diagnostics, attached after the fact
    #[serde(default)]
    pub diagnostics: Option<AggregationResult>,
}

impl ScoreRecord {
    pub fn new(entity_id: &str, score: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            entity_id: entity_id.to_string(),
            score,
            grade: Grade::from_score(score),
            created_at: Utc::now(),
            diagnostics: None,
        }
    }
}

/// Persistence collaborator for diagnostics
#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Most recent score record for an entity
    async fn find_latest_score_for(&self, entity_id: &str)
        -> Result<Option<ScoreRecord>, StoreError>;

    /// Attach diagnostics to an existing score record
    async fn attach_diagnostics(
        &self,
        score_id: Uuid,
        diagnostics: AggregationResult,
    ) -> Result<(), StoreError>;
}

/// In-process store keyed by record id
#[derive(Debug, Default)]
pub struct InMemoryScoreStore {
    records: DashMap<Uuid, ScoreRecord>,
}

impl InMemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a score record, as the scoring workflow would
    pub fn insert(&self, record: ScoreRecord) -> Uuid {
        let id = record.id;
        self.records.insert(id, record);
        id
    }

    pub fn get(&self, id: Uuid) -> Option<ScoreRecord> {
        self.records.get(&id).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl ScoreStore for InMemoryScoreStore {
    async fn find_latest_score_for(
        &self,
        entity_id: &str,
    ) -> Result<Option<ScoreRecord>, StoreError> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.entity_id == entity_id)
            .max_by_key(|r| r.created_at)
            .map(|r| r.value().clone()))
    }

    async fn attach_diagnostics(
        &self,
        score_id: Uuid,
        diagnostics: AggregationResult,
    ) -> Result<(), StoreError> {
        let mut record = self
            .records
            .get_mut(&score_id)
            .ok_or(StoreError::NotFound(score_id))?;
        record.diagnostics = Some(diagnostics);
        Ok(())
    }
}
