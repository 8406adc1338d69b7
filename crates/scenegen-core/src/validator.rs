//! Validator: re-solves a filtered scene against a validation model
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use crate::data_model::ValidationReport;
use crate::engine::{SolveEngine, SolveMode, SolveOutcome, SolveRequest};
use crate::error::SceneError;
use crate::fact::FactStore;
use crate::filter::FactFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Only satisfiability matters.
    #[default]
    Decide,
    /// Render the validation model when one is found.
    Emit,
}

/// Validation model plus the predicates it reads from a generated scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationProfile {
    pub name: String,
    pub program: PathBuf,
    #[serde(default = "ValidationProfile::default_section")]
    pub section: String,
    #[serde(default = "ValidationProfile::default_parallelism")]
    pub parallelism: u32,
    pub predicates: FactFilter,
}

impl ValidationProfile {
    fn default_section() -> String {
        "base".to_string()
    }

    const fn default_parallelism() -> u32 {
        11
    }

    pub fn new(name: impl Into<String>, program: impl Into<PathBuf>, predicates: FactFilter) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            section: Self::default_section(),
            parallelism: Self::default_parallelism(),
            predicates,
        }
    }

    pub fn with_parallelism(mut self, parallelism: u32) -> Self {
        self.parallelism = parallelism;
        self
    }
}

pub struct Validator<E> {
    engine: E,
}

impl<E: SolveEngine> Validator<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    /// Filters `facts` through the profile's predicates and solves once.
    ///
    /// No seed, randomization or parameters are passed; an unsatisfiable
    /// scene is reported, not raised.
    pub fn validate(
        &self,
        profile: &ValidationProfile,
        facts: &FactStore,
        mode: ValidationMode,
    ) -> Result<ValidationReport, SceneError> {
        if profile.parallelism == 0 {
            return Err(SceneError::InvalidPipeline(format!(
                "validation profile '{}' needs a parallelism of at least 1",
                profile.name
            )));
        }

        let filtered = profile.predicates.apply(facts.facts());
        let request = SolveRequest {
            program: &profile.program,
            section: &profile.section,
            rand_freq: None,
            parallelism: profile.parallelism,
            params: &[],
            seed: None,
            facts: filtered.facts(),
            mode: match mode {
                ValidationMode::Decide => SolveMode::Decide,
                ValidationMode::Emit => SolveMode::Collect,
            },
        };

        let start = Instant::now();
        let outcome = self.engine.solve(&request)?;
        let latency_ms = start.elapsed().as_millis() as u64;

        let (satisfiable, rendered) = match outcome {
            SolveOutcome::Model(model) => (
                true,
                (mode == ValidationMode::Emit).then(|| model.render()),
            ),
            SolveOutcome::NoModel => (false, None),
        };
        info!(
            profile = %profile.name,
            facts_in = filtered.len(),
            satisfiable,
            latency_ms,
            "validation finished"
        );

        Ok(ValidationReport {
            profile: profile.name.clone(),
            satisfiable,
            facts_in: filtered.len(),
            rendered,
            latency_ms,
        })
    }
}
