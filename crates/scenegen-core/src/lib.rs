//! Scenegen Core: Stage Sequencer, Fact Store, and Validator
//!
//! Staged generate-and-validate pipeline over an external answer-set solver.
//! Each stage solves one section of a declarative program against the facts
//! accumulated so far; the final store is filtered and re-solved against a
//! validation model.
//!
//! ```text
//! Seed → stage 1 → stage 2 → … → stage n → Filter → Validator
//!          ↓          ↓              ↓
//!        merge      merge     merge / render
//! ```

pub mod context;
pub mod data_model;
pub mod engine;
pub mod error;
pub mod fact;
pub mod filter;
pub mod runner;
pub mod seed;
pub mod stage;
pub mod validator;

#[cfg(feature = "clingo")]
pub mod clingo_engine;

pub use context::RunContext;
pub use data_model::{RunReport, StageOutcome, StageRecord, ValidationReport};
pub use engine::{EngineError, FirstModel, Model, SolveEngine, SolveMode, SolveOutcome, SolveRequest};
pub use error::{RunFailure, SceneError};
pub use fact::{Fact, FactStore};
pub use filter::FactFilter;
pub use runner::{NoModelPolicy, RunOutput, StageSequencer};
pub use seed::{FixedSeed, FixedStart, OsSeedSource, SeedSequence, SeedSource, SEED_BOUND};
pub use stage::{DimensionBinding, Dimensions, Param, PipelineSpec, StageSpec};
pub use validator::{ValidationMode, ValidationProfile, Validator};

#[cfg(feature = "clingo")]
pub use clingo_engine::ClingoEngine;

/// Name of the auxiliary section holding the accumulated facts.
pub const FACTS_SECTION: &str = "facts";
