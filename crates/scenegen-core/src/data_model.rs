//! Data Model: run and validation reports
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SceneError;
use crate::stage::Dimensions;

/// What happened to a stage's solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageOutcome {
    /// Model atoms were appended to the fact store.
    Merged,
    /// Terminal stage; the model was rendered instead of merged.
    Rendered,
    /// The engine found no model.
    NoModel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageRecord {
    pub index: usize,
    pub label: String,
    pub outcome: StageOutcome,
    pub seed: u64,
    pub attempts: u32,
    pub facts_added: usize,
    /// Hash of the fact store after this stage.
    pub store_hash: String,
    pub latency_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub profile: String,
    pub satisfiable: bool,
    pub facts_in: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rendered: Option<String>,
    pub latency_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub pipeline: String,
    pub engine: String,
    /// Seed the run started with; reseeded stages record their own.
    pub seed: u64,
    pub dimensions: Option<Dimensions>,
    pub started_at: DateTime<Utc>,
    pub stages: Vec<StageRecord>,
    pub facts_total: usize,
    pub store_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationReport>,
}

impl RunReport {
    pub fn total_latency_ms(&self) -> u64 {
        self.stages.iter().map(|s| s.latency_ms).sum()
    }

    pub fn to_json_pretty(&self) -> Result<String, SceneError> {
        serde_json::to_string_pretty(self).map_err(|e| SceneError::Config(format!("report serialization: {e}")))
    }
}
