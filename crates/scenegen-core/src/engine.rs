//! Solve Invoker: the boundary to the answer-set engine.
//!
//! An engine loads one program, adds the caller's facts as the auxiliary
//! section [`FACTS_SECTION`](crate::FACTS_SECTION), grounds that section
//! together with the requested one and reports the first model it finds.
use once_cell::unsync::OnceCell;
use std::path::Path;

use crate::fact::{render_facts, Fact};
use crate::stage::Param;

/// What the caller needs back from a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveMode {
    /// Return the atoms of the first model.
    Collect,
    /// Only decide satisfiability; the model carries no atoms.
    Decide,
}

/// Everything one engine invocation is configured with.
///
/// The fact snapshot is borrowed immutably; an engine cannot retain or alter
/// the caller's store.
#[derive(Debug, Clone)]
pub struct SolveRequest<'a> {
    pub program: &'a Path,
    pub section: &'a str,
    pub rand_freq: Option<f64>,
    pub parallelism: u32,
    pub params: &'a [Param],
    pub seed: Option<u64>,
    pub facts: &'a [Fact],
    pub mode: SolveMode,
}

impl SolveRequest<'_> {
    /// Engine options in clingo's command-line syntax.
    pub fn engine_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(4 + 2 * self.params.len());
        if let Some(rate) = self.rand_freq {
            args.push(format!("--rand-freq={rate}"));
        }
        args.push(format!("--parallel-mode={}", self.parallelism));
        if let Some(seed) = self.seed {
            args.push(format!("--seed={seed}"));
        }
        for param in self.params {
            args.push("-c".to_string());
            args.push(param.to_string());
        }
        args
    }

    /// The auxiliary fact block, one fact per line.
    pub fn facts_program(&self) -> String {
        render_facts(self.facts)
    }
}

/// Atoms of one satisfying assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model {
    facts: Vec<Fact>,
}

impl Model {
    pub fn new(facts: Vec<Fact>) -> Self {
        Self { facts }
    }

    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    pub fn into_facts(self) -> Vec<Fact> {
        self.facts
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Human-readable rendering, one fact per line.
    pub fn render(&self) -> String {
        render_facts(&self.facts)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    Model(Model),
    /// Search exhausted without a satisfying assignment.
    NoModel,
}

impl SolveOutcome {
    pub fn is_model(&self) -> bool {
        matches!(self, SolveOutcome::Model(_))
    }
}

/// Single-shot slot for the first model reported by an engine.
///
/// The first offer resolves the slot; every later offer is refused so the
/// engine knows to stop searching.
#[derive(Debug, Default)]
pub struct FirstModel {
    slot: OnceCell<Model>,
}

impl FirstModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `model` was taken, `false` if the slot was already resolved.
    pub fn offer(&self, model: Model) -> bool {
        self.slot.set(model).is_ok()
    }

    pub fn is_resolved(&self) -> bool {
        self.slot.get().is_some()
    }

    pub fn into_outcome(self) -> SolveOutcome {
        match self.slot.into_inner() {
            Some(model) => SolveOutcome::Model(model),
            None => SolveOutcome::NoModel,
        }
    }
}

#[derive(Debug, Clone)]
pub enum EngineError {
    /// The engine could not be set up: missing program, bad options, no backend.
    Unavailable(String),
    /// The engine failed while grounding or solving.
    Failed(String),
    /// The engine produced an atom that is not a valid fact.
    Malformed(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Unavailable(msg) => write!(f, "ENGINE/UNAVAILABLE: {}", msg),
            Self::Failed(msg) => write!(f, "ENGINE/FAILED: {}", msg),
            Self::Malformed(msg) => write!(f, "FACT/MALFORMED: {}", msg),
        }
    }
}

impl std::error::Error for EngineError {}

/// Synchronous adapter over an answer-set engine.
pub trait SolveEngine: Send + Sync {
    /// Short backend name used in logs and reports.
    fn name(&self) -> &str;

    /// Solves once and reports the first model, or [`SolveOutcome::NoModel`].
    fn solve(&self, request: &SolveRequest<'_>) -> Result<SolveOutcome, EngineError>;
}

impl<E: SolveEngine + ?Sized> SolveEngine for &E {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn solve(&self, request: &SolveRequest<'_>) -> Result<SolveOutcome, EngineError> {
        (**self).solve(request)
    }
}

impl<E: SolveEngine + ?Sized> SolveEngine for Box<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn solve(&self, request: &SolveRequest<'_>) -> Result<SolveOutcome, EngineError> {
        (**self).solve(request)
    }
}

impl<E: SolveEngine + ?Sized> SolveEngine for std::sync::Arc<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn solve(&self, request: &SolveRequest<'_>) -> Result<SolveOutcome, EngineError> {
        (**self).solve(request)
    }
}
