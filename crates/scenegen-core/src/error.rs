//! Unified Error Model
use thiserror::Error;

use crate::data_model::StageRecord;
use crate::engine::EngineError;
use crate::fact::FactStore;

#[derive(Error, Debug)]
pub enum SceneError {
    #[error("ENGINE/UNAVAILABLE: {0}")]
    EngineUnavailable(String),

    #[error("ENGINE/FAILED: {0}")]
    Engine(String),

    #[error("SOLVE/NO_MODEL: stage '{stage}' (#{index}) has no model")]
    NoModelFound { stage: String, index: usize },

    #[error("FACT/MALFORMED: {0}")]
    MalformedFact(String),

    #[error("PIPELINE/INVALID: {0}")]
    InvalidPipeline(String),

    #[error("CONFIG/{0}")]
    Config(String),
}

impl From<EngineError> for SceneError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Unavailable(msg) => SceneError::EngineUnavailable(msg),
            EngineError::Failed(msg) => SceneError::Engine(msg),
            EngineError::Malformed(msg) => SceneError::MalformedFact(msg),
        }
    }
}

/// A generation run that stopped early.
///
/// Keeps whatever the run had accumulated before the failing stage so callers
/// can inspect or log the partial state.
#[derive(Error, Debug)]
#[error("{error}")]
pub struct RunFailure {
    #[source]
    pub error: SceneError,
    pub facts: FactStore,
    pub stages: Vec<StageRecord>,
}

impl RunFailure {
    pub fn new(error: SceneError, facts: FactStore, stages: Vec<StageRecord>) -> Self {
        Self { error, facts, stages }
    }
}

impl From<SceneError> for RunFailure {
    fn from(error: SceneError) -> Self {
        Self::new(error, FactStore::new(), Vec::new())
    }
}
