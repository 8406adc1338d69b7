//! Benchmark harness: times generation (and optionally validation) runs
//! across a progressive size sweep.
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::info;

use scenegen_core::{
    Dimensions, NoModelPolicy, OsSeedSource, PipelineSpec, SeedSequence, SeedSource, SolveEngine,
    StageSequencer, ValidationMode, ValidationProfile, Validator,
};

use crate::results::{BenchRow, ResultsLog};
use crate::sweep::ProgressiveTriples;
use crate::BenchError;

/// Sweep and repetition settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchConfig {
    pub max_dim: u32,
    pub start_dim: u32,
    pub steps: Option<usize>,
    pub repeats: u32,
    /// Trials allowed to run at the same time.
    pub jobs: usize,
    /// Derive every trial's seed from this value instead of the OS.
    pub master_seed: Option<u64>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            max_dim: 4,
            start_dim: 2,
            steps: None,
            repeats: 5,
            jobs: 1,
            master_seed: None,
        }
    }
}

/// Timings of one (dimensions, repetition) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Trial {
    pub dimensions: Dimensions,
    pub run: u32,
    pub generate_seconds: f64,
    pub validate_seconds: Option<f64>,
    pub satisfiable: Option<bool>,
}

pub struct Benchmark<E: ?Sized> {
    engine: Arc<E>,
    pipeline: Arc<PipelineSpec>,
    validation: Option<Arc<ValidationProfile>>,
    policy: NoModelPolicy,
}

impl<E> Benchmark<E>
where
    E: SolveEngine + ?Sized + 'static,
{
    pub fn new(engine: Arc<E>, pipeline: PipelineSpec) -> Self {
        Self {
            engine,
            pipeline: Arc::new(pipeline),
            validation: None,
            policy: NoModelPolicy::default(),
        }
    }

    pub fn with_validation(mut self, profile: ValidationProfile) -> Self {
        self.validation = Some(Arc::new(profile));
        self
    }

    pub fn with_policy(mut self, policy: NoModelPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Runs the sweep, appending one row per trial to `generator_log` (and
    /// to `solver_log` when validating) in sweep order.
    ///
    /// The first failing trial ends the sweep; trials already running are
    /// awaited before the error is returned.
    pub async fn run(
        &self,
        config: &BenchConfig,
        generator_log: &ResultsLog,
        solver_log: Option<&ResultsLog>,
    ) -> Result<Vec<Trial>, BenchError> {
        if config.repeats == 0 {
            return Err(BenchError::Config("repeats must be at least 1".into()));
        }
        if self.validation.is_some() && solver_log.is_none() {
            return Err(BenchError::Config("validation requested without a solver log".into()));
        }

        let triples: Vec<Dimensions> =
            ProgressiveTriples::new(config.max_dim, config.steps, config.start_dim)?.collect();

        let mut pending = VecDeque::new();
        let outcome = self
            .sweep(config, triples, &mut pending, generator_log, solver_log)
            .await;
        if outcome.is_err() {
            // A failed sweep still waits for its in-flight trials.
            for handle in pending.drain(..) {
                let _ = handle.await;
            }
        }
        outcome
    }

    async fn sweep(
        &self,
        config: &BenchConfig,
        triples: Vec<Dimensions>,
        pending: &mut VecDeque<JoinHandle<Result<Trial, BenchError>>>,
        generator_log: &ResultsLog,
        solver_log: Option<&ResultsLog>,
    ) -> Result<Vec<Trial>, BenchError> {
        let total = triples.len() * config.repeats as usize;
        let semaphore = Arc::new(Semaphore::new(config.jobs.max(1)));
        let mut trials = Vec::with_capacity(total);
        let mut index = 0usize;

        for dims in triples {
            for run in 1..=config.repeats {
                let permit = semaphore
                    .clone()
                    .acquire_owned()
                    .await
                    .map_err(|e| BenchError::Task(e.to_string()))?;

                let seeds: Box<dyn SeedSource> = match config.master_seed {
                    Some(master) => Box::new(SeedSequence::from_master(trial_seed(master, index))),
                    None => Box::new(OsSeedSource),
                };
                let engine = Arc::clone(&self.engine);
                let pipeline = Arc::clone(&self.pipeline);
                let validation = self.validation.clone();
                let policy = self.policy;
                pending.push_back(tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    run_trial(engine.as_ref(), &pipeline, validation.as_deref(), policy, dims, run, seeds)
                }));
                index += 1;

                // Log finished trials in order without waiting on later ones.
                while pending.front().is_some_and(|h| h.is_finished()) {
                    if let Some(handle) = pending.pop_front() {
                        let trial = join(handle).await?;
                        record(&trial, trials.len() + 1, total, generator_log, solver_log)?;
                        trials.push(trial);
                    }
                }
            }
        }

        while let Some(handle) = pending.pop_front() {
            let trial = join(handle).await?;
            record(&trial, trials.len() + 1, total, generator_log, solver_log)?;
            trials.push(trial);
        }

        Ok(trials)
    }
}

fn run_trial<E: SolveEngine + ?Sized>(
    engine: &E,
    pipeline: &PipelineSpec,
    validation: Option<&ValidationProfile>,
    policy: NoModelPolicy,
    dims: Dimensions,
    run: u32,
    mut seeds: Box<dyn SeedSource>,
) -> Result<Trial, BenchError> {
    let start = Instant::now();
    let output = StageSequencer::new(engine)
        .with_policy(policy)
        .run(pipeline, Some(dims), seeds.as_mut())?;
    let generate_seconds = start.elapsed().as_secs_f64();

    let (validate_seconds, satisfiable) = match validation {
        Some(profile) => {
            let start = Instant::now();
            let report = Validator::new(engine).validate(profile, &output.facts, ValidationMode::Decide)?;
            (Some(start.elapsed().as_secs_f64()), Some(report.satisfiable))
        }
        None => (None, None),
    };

    Ok(Trial {
        dimensions: dims,
        run,
        generate_seconds,
        validate_seconds,
        satisfiable,
    })
}

async fn join(handle: JoinHandle<Result<Trial, BenchError>>) -> Result<Trial, BenchError> {
    handle.await.map_err(|e| BenchError::Task(e.to_string()))?
}

fn record(
    trial: &Trial,
    current: usize,
    total: usize,
    generator_log: &ResultsLog,
    solver_log: Option<&ResultsLog>,
) -> Result<(), BenchError> {
    let dims = trial.dimensions;
    generator_log.append(&BenchRow::new(dims, trial.run, trial.generate_seconds))?;
    if let (Some(log), Some(seconds)) = (solver_log, trial.validate_seconds) {
        log.append(&BenchRow::new(dims, trial.run, seconds))?;
    }

    match trial.validate_seconds {
        Some(solve) => info!(
            "[{current}/{total}] h={} w={} d={} run={} … {:.3}s solve={:.3}s",
            dims.height, dims.width, dims.depth, trial.run, trial.generate_seconds, solve
        ),
        None => info!(
            "[{current}/{total}] h={} w={} d={} run={} … {:.3}s",
            dims.height, dims.width, dims.depth, trial.run, trial.generate_seconds
        ),
    }
    Ok(())
}

/// Per-trial seed derived from the sweep's master seed.
fn trial_seed(master: u64, index: usize) -> u64 {
    master ^ ((index as u64 + 1).wrapping_mul(0x9e37_79b1_85eb_ca87))
}
