//! Stage Sequencer: runs a pipeline's stages in order over one Fact Store
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, info_span, warn};

use crate::context::RunContext;
use crate::data_model::{RunReport, StageOutcome, StageRecord};
use crate::engine::{SolveEngine, SolveMode, SolveOutcome, SolveRequest};
use crate::error::{RunFailure, SceneError};
use crate::fact::FactStore;
use crate::seed::SeedSource;
use crate::stage::{Dimensions, PipelineSpec};

/// What to do when a stage has no model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoModelPolicy {
    /// Stop the run and report the failing stage.
    #[default]
    Abort,
    /// Keep the store unchanged and move on to the next stage.
    Continue,
    /// Draw a new seed and retry the stage up to `attempts` more times.
    Reseed { attempts: u32 },
}

/// Result of a completed generation run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub facts: FactStore,
    /// Rendered model of the terminal stage, if the pipeline has one.
    pub rendered: Option<String>,
    pub report: RunReport,
}

pub struct StageSequencer<E> {
    engine: E,
    policy: NoModelPolicy,
}

impl<E: SolveEngine> StageSequencer<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            policy: NoModelPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: NoModelPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn policy(&self) -> NoModelPolicy {
        self.policy
    }

    /// Runs every stage of `pipeline` against a fresh store.
    ///
    /// One seed is drawn from `seeds` at start and shared by all stages; the
    /// source is only consulted again under [`NoModelPolicy::Reseed`].
    pub fn run(
        &self,
        pipeline: &PipelineSpec,
        dimensions: Option<Dimensions>,
        seeds: &mut dyn SeedSource,
    ) -> Result<RunOutput, RunFailure> {
        pipeline.validate()?;

        let mut ctx = RunContext::new(pipeline.name(), seeds.next_seed(), dimensions);
        let initial_seed = ctx.seed;
        let mut store = FactStore::new();
        let mut records: Vec<StageRecord> = Vec::with_capacity(pipeline.len());
        let mut rendered = None;

        info!(
            run_id = %ctx.run_id,
            pipeline = pipeline.name(),
            seed = ctx.seed,
            engine = self.engine.name(),
            "starting generation run"
        );

        for (index, stage) in pipeline.stages().iter().enumerate() {
            let span = info_span!("stage", index, label = stage.label());
            let _entered = span.enter();

            let params = match stage.bound_params(ctx.dimensions) {
                Ok(params) => params,
                Err(err) => return Err(RunFailure::new(err, store, records)),
            };

            let start = Instant::now();
            let mut attempts = 0u32;
            let outcome = loop {
                attempts += 1;
                let request = SolveRequest {
                    program: stage.program(),
                    section: stage.label(),
                    rand_freq: stage.rand_freq,
                    parallelism: stage.parallelism,
                    params: &params,
                    seed: Some(ctx.seed),
                    facts: store.facts(),
                    mode: SolveMode::Collect,
                };
                let outcome = match self.engine.solve(&request) {
                    Ok(outcome) => outcome,
                    Err(err) => return Err(RunFailure::new(err.into(), store, records)),
                };

                match (outcome, self.policy) {
                    (SolveOutcome::NoModel, NoModelPolicy::Reseed { attempts: retries })
                        if attempts <= retries =>
                    {
                        let seed = seeds.next_seed();
                        warn!(attempt = attempts, seed, "no model, retrying with a new seed");
                        ctx.reseed(seed);
                    }
                    (outcome, _) => break outcome,
                }
            };
            let latency_ms = start.elapsed().as_millis() as u64;

            let (outcome, facts_added) = match outcome {
                SolveOutcome::Model(model) if stage.terminal => {
                    info!(atoms = model.len(), latency_ms, "rendered terminal model");
                    rendered = Some(model.render());
                    (StageOutcome::Rendered, 0)
                }
                SolveOutcome::Model(model) => {
                    let added = store.merge(model.into_facts());
                    info!(added, total = store.len(), latency_ms, "merged model");
                    (StageOutcome::Merged, added)
                }
                SolveOutcome::NoModel => (StageOutcome::NoModel, 0),
            };

            records.push(StageRecord {
                index,
                label: stage.label().to_string(),
                outcome,
                seed: ctx.seed,
                attempts,
                facts_added,
                store_hash: store.content_hash(),
                latency_ms,
            });

            if outcome == StageOutcome::NoModel {
                if self.policy == NoModelPolicy::Continue {
                    warn!(latency_ms, "no model, continuing with unchanged facts");
                    continue;
                }
                warn!(attempts, "no model, aborting run");
                let err = SceneError::NoModelFound {
                    stage: stage.label().to_string(),
                    index,
                };
                return Err(RunFailure::new(err, store, records));
            }
        }

        let report = RunReport {
            run_id: ctx.run_id,
            pipeline: ctx.pipeline,
            engine: self.engine.name().to_string(),
            seed: initial_seed,
            dimensions: ctx.dimensions,
            started_at: ctx.started_at,
            facts_total: store.len(),
            store_hash: store.content_hash(),
            stages: records,
            validation: None,
        };
        info!(
            facts = report.facts_total,
            latency_ms = report.total_latency_ms(),
            "generation run finished"
        );

        Ok(RunOutput {
            facts: store,
            rendered,
            report,
        })
    }
}
