//! Run Context: identity and seed of one generation run
use chrono::{DateTime, Utc};

use crate::stage::Dimensions;

#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
    pub pipeline: String,
    pub seed: u64,
    pub dimensions: Option<Dimensions>,
    pub started_at: DateTime<Utc>,
}

impl RunContext {
    pub fn new(pipeline: impl Into<String>, seed: u64, dimensions: Option<Dimensions>) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            pipeline: pipeline.into(),
            seed,
            dimensions,
            started_at: Utc::now(),
        }
    }

    /// Replaces the seed for the remaining stages of this run.
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
    }
}
