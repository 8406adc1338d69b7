//! End-to-end scenarios for the generate-and-validate pipeline.
//!
//! The engine is replaced by a stub that answers per section, so these tests
//! exercise sequencing, merging, filtering and validation without a solver.

use std::collections::HashMap;
use std::sync::Mutex;

use scenegen_core::{
    DimensionBinding, Dimensions, EngineError, Fact, FactFilter, FactStore, FixedSeed, Model,
    NoModelPolicy, OsSeedSource, Param, PipelineSpec, RunFailure, SceneError, SolveEngine, SolveMode,
    SolveOutcome, SolveRequest, StageOutcome, StageSequencer, StageSpec, ValidationMode,
    ValidationProfile, Validator,
};

/// Answers each section with fixed facts or a scripted error; sections without
/// an answer have no model.
#[derive(Default)]
struct StubEngine {
    answers: HashMap<String, Vec<String>>,
    failures: HashMap<String, EngineError>,
    calls: Mutex<Vec<Call>>,
}

#[derive(Debug, Clone)]
struct Call {
    section: String,
    args: Vec<String>,
    facts: Vec<String>,
    mode: SolveMode,
}

impl StubEngine {
    fn answer(mut self, section: &str, facts: &[&str]) -> Self {
        self.answers
            .insert(section.to_string(), facts.iter().map(|f| f.to_string()).collect());
        self
    }

    fn fail(mut self, section: &str, error: EngineError) -> Self {
        self.failures.insert(section.to_string(), error);
        self
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl SolveEngine for StubEngine {
    fn name(&self) -> &str {
        "stub"
    }

    fn solve(&self, request: &SolveRequest<'_>) -> Result<SolveOutcome, EngineError> {
        self.calls.lock().unwrap().push(Call {
            section: request.section.to_string(),
            args: request.engine_args(),
            facts: request.facts.iter().map(|f| f.to_string()).collect(),
            mode: request.mode,
        });
        if let Some(error) = self.failures.get(request.section) {
            return Err(error.clone());
        }
        match self.answers.get(request.section) {
            Some(facts) => {
                let facts = facts
                    .iter()
                    .map(|f| Fact::parse(f).map_err(|e| EngineError::Malformed(e.to_string())))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(SolveOutcome::Model(Model::new(facts)))
            }
            None => Ok(SolveOutcome::NoModel),
        }
    }
}

fn generation_pipeline() -> PipelineSpec {
    PipelineSpec::new(
        "scenario",
        vec![
            StageSpec::new("gen.lp", "gen-dims")
                .with_rand_freq(0.0)
                .binding_dimensions(DimensionBinding::default()),
            StageSpec::new("gen.lp", "gen-blocks").with_rand_freq(1.0),
            StageSpec::new("gen.lp", "gen-pipes")
                .with_rand_freq(1.0)
                .with_parallelism(11),
            StageSpec::new("gen.lp", "rotate").with_rand_freq(1.0).terminal(),
        ],
    )
    .unwrap()
}

fn strings(store: &FactStore) -> Vec<&str> {
    store.iter().map(Fact::as_str).collect()
}

// =============================================================================
// Generation
// =============================================================================

#[test]
fn test_scenario_a_terminal_stage_does_not_merge() {
    let engine = StubEngine::default()
        .answer("gen-dims", &["dims(2,2,2)."])
        .answer("gen-blocks", &["block(1,1,1)."])
        .answer("gen-pipes", &["pipe(1,2)."])
        .answer("rotate", &["rotated(1,n)."]);
    let sequencer = StageSequencer::new(&engine);
    let dims = Dimensions::new(2, 2, 2).unwrap();

    let out = sequencer
        .run(&generation_pipeline(), Some(dims), &mut OsSeedSource)
        .unwrap();

    assert_eq!(strings(&out.facts), vec!["dims(2,2,2).", "block(1,1,1).", "pipe(1,2)."]);
    assert_eq!(out.rendered.as_deref(), Some("rotated(1,n)."));

    let sections: Vec<_> = engine.calls().into_iter().map(|c| c.section).collect();
    assert_eq!(sections, vec!["gen-dims", "gen-blocks", "gen-pipes", "rotate"]);
}

#[test]
fn test_scenario_a_binds_dimensions_and_threads_one_seed() {
    let engine = StubEngine::default()
        .answer("gen-dims", &["dims(2,2,2)."])
        .answer("gen-blocks", &["block(1,1,1)."])
        .answer("gen-pipes", &["pipe(1,2)."])
        .answer("rotate", &["rotated(1,n)."]);
    let dims = Dimensions::new(2, 2, 2).unwrap();

    let out = StageSequencer::new(&engine)
        .run(&generation_pipeline(), Some(dims), &mut FixedSeed::new(4242).unwrap())
        .unwrap();

    let calls = engine.calls();
    assert_eq!(
        calls[0].args,
        vec!["--rand-freq=0", "--parallel-mode=1", "--seed=4242", "-c", "h=2", "-c", "w=2", "-c", "d=2"]
    );
    assert!(calls.iter().all(|c| c.args.contains(&"--seed=4242".to_string())));
    assert!(calls.iter().all(|c| c.mode == SolveMode::Collect));
    assert_eq!(calls[2].facts, vec!["dims(2,2,2).", "block(1,1,1)."]);
    assert_eq!(out.report.seed, 4242);
    assert_eq!(out.report.dimensions, Some(dims));
}

#[test]
fn test_scenario_b_abort_names_failing_stage() {
    let engine = StubEngine::default()
        .answer("gen-dims", &["dims(2,2,2)."])
        .answer("gen-pipes", &["pipe(1,2)."])
        .answer("rotate", &["rotated(1,n)."]);
    let dims = Dimensions::new(2, 2, 2).unwrap();

    let failure = StageSequencer::new(&engine)
        .with_policy(NoModelPolicy::Abort)
        .run(&generation_pipeline(), Some(dims), &mut OsSeedSource)
        .unwrap_err();

    assert!(failure.to_string().contains("gen-blocks"));
    assert!(matches!(
        failure.error,
        SceneError::NoModelFound { ref stage, index: 1 } if stage == "gen-blocks"
    ));
    assert_eq!(strings(&failure.facts), vec!["dims(2,2,2)."]);
    assert_eq!(failure.stages.len(), 2);
    assert_eq!(failure.stages[1].outcome, StageOutcome::NoModel);
    assert_eq!(engine.calls().len(), 2);
}

/// Runs the scenario pipeline with `gen-blocks` failing as `error`.
fn run_with_failing_blocks(error: EngineError) -> (StubEngine, RunFailure) {
    let engine = StubEngine::default()
        .answer("gen-dims", &["dims(2,2,2)."])
        .answer("gen-pipes", &["pipe(1,2)."])
        .fail("gen-blocks", error);
    let failure = StageSequencer::new(&engine)
        .with_policy(NoModelPolicy::Continue)
        .run(&generation_pipeline(), Some(Dimensions::new(2, 2, 2).unwrap()), &mut OsSeedSource)
        .unwrap_err();
    (engine, failure)
}

#[test]
fn test_engine_unavailable_surfaces_as_engine_unavailable() {
    let (engine, failure) = run_with_failing_blocks(EngineError::Unavailable("no libclingo".into()));

    assert!(matches!(failure.error, SceneError::EngineUnavailable(ref msg) if msg == "no libclingo"));
    assert!(failure.to_string().starts_with("ENGINE/UNAVAILABLE"));
    assert_eq!(strings(&failure.facts), vec!["dims(2,2,2)."]);
    assert_eq!(failure.stages.len(), 1);
    // engine errors stop the run whatever the no-model policy says
    assert_eq!(engine.calls().len(), 2);
}

#[test]
fn test_engine_failure_surfaces_as_engine_error() {
    let (_, failure) = run_with_failing_blocks(EngineError::Failed("grounding blew up".into()));

    assert!(matches!(failure.error, SceneError::Engine(ref msg) if msg == "grounding blew up"));
    assert_eq!(strings(&failure.facts), vec!["dims(2,2,2)."]);
}

#[test]
fn test_malformed_engine_atom_surfaces_as_malformed_fact() {
    let (_, failure) = run_with_failing_blocks(EngineError::Malformed("block(1,1".into()));

    assert!(matches!(failure.error, SceneError::MalformedFact(ref msg) if msg == "block(1,1"));
    assert!(failure.to_string().starts_with("FACT/MALFORMED"));
    assert_eq!(strings(&failure.facts), vec!["dims(2,2,2)."]);
    assert_eq!(failure.stages.len(), 1);
}

#[test]
fn test_zero_successful_stages_leave_store_empty() {
    let engine = StubEngine::default();
    let pipeline = PipelineSpec::new(
        "nothing",
        vec![StageSpec::new("gen.lp", "a"), StageSpec::new("gen.lp", "b")],
    )
    .unwrap();

    let out = StageSequencer::new(&engine)
        .with_policy(NoModelPolicy::Continue)
        .run(&pipeline, None, &mut OsSeedSource)
        .unwrap();

    assert!(out.facts.is_empty());
    assert_eq!(engine.calls().len(), 2);
}

#[test]
fn test_fresh_store_per_run() {
    let engine = StubEngine::default().answer("a", &["a(1)."]);
    let pipeline = PipelineSpec::new("one", vec![StageSpec::new("gen.lp", "a")]).unwrap();
    let sequencer = StageSequencer::new(&engine);

    let first = sequencer.run(&pipeline, None, &mut OsSeedSource).unwrap();
    let second = sequencer.run(&pipeline, None, &mut OsSeedSource).unwrap();

    assert_eq!(first.facts.len(), 1);
    assert_eq!(second.facts.len(), 1);
    assert!(engine.calls().iter().all(|c| c.facts.is_empty()));
    assert_ne!(first.report.run_id, second.report.run_id);
}

// =============================================================================
// Filtering and validation
// =============================================================================

#[test]
fn test_scenario_c_filter() {
    let store = FactStore::parse_lines(["block(1,1,1).", "pipe(1,2).", "color(1,red)."]).unwrap();
    let kept = FactFilter::new(["block", "pipe"]).apply(store.facts());
    assert_eq!(strings(&kept), vec!["block(1,1,1).", "pipe(1,2)."]);
}

#[test]
fn test_validator_sees_only_filtered_facts() {
    let engine = StubEngine::default().answer("base", &["ok."]);
    let store = FactStore::parse_lines([
        "width(2).",
        "block(1,1,1).",
        "cell(1,1,1).",
        "pipe_in(1,n).",
        "rotation(1,2).",
    ])
    .unwrap();
    let profile = ValidationProfile::new(
        "full",
        "solver.lp",
        FactFilter::new(["width", "height", "depth", "block", "pipe", "pipe_in", "pipe_out"]),
    );

    let report = Validator::new(&engine)
        .validate(&profile, &store, ValidationMode::Decide)
        .unwrap();

    assert!(report.satisfiable);
    assert_eq!(report.facts_in, 3);
    assert!(report.rendered.is_none());

    let call = &engine.calls()[0];
    assert_eq!(call.section, "base");
    assert_eq!(call.facts, vec!["width(2).", "block(1,1,1).", "pipe_in(1,n)."]);
    assert_eq!(call.args, vec!["--parallel-mode=11"]);
    assert_eq!(call.mode, SolveMode::Decide);
}

#[test]
fn test_validator_emit_renders_model() {
    let engine = StubEngine::default().answer("base", &["assign(1,2).", "assign(2,3)."]);
    let store = FactStore::parse_lines(["block(1,1,1)."]).unwrap();
    let profile = ValidationProfile::new("no-pipes", "solver-without-pipes.lp", FactFilter::new(["block"]));

    let report = Validator::new(&engine)
        .validate(&profile, &store, ValidationMode::Emit)
        .unwrap();

    assert_eq!(report.rendered.as_deref(), Some("assign(1,2).\nassign(2,3)."));
    assert_eq!(engine.calls()[0].mode, SolveMode::Collect);
}

#[test]
fn test_unsatisfiable_validation_is_reported_not_raised() {
    let engine = StubEngine::default();
    let store = FactStore::parse_lines(["block(1,1,1)."]).unwrap();
    let profile = ValidationProfile::new("full", "solver.lp", FactFilter::new(["block"]));

    let report = Validator::new(&engine)
        .validate(&profile, &store, ValidationMode::Emit)
        .unwrap();

    assert!(!report.satisfiable);
    assert!(report.rendered.is_none());
}

#[test]
fn test_explicit_params_precede_dimension_constants() {
    let engine = StubEngine::default().answer("base", &["scene(1)."]);
    let stage = StageSpec::new("monolithic.lp", "base")
        .with_param(Param::new("layers", 2))
        .binding_dimensions(DimensionBinding::long_names());
    let pipeline = PipelineSpec::new("monolithic", vec![stage]).unwrap();

    StageSequencer::new(&engine)
        .run(&pipeline, Some(Dimensions::new(3, 4, 5).unwrap()), &mut OsSeedSource)
        .unwrap();

    let args = &engine.calls()[0].args;
    let consts: Vec<_> = args
        .iter()
        .zip(args.iter().skip(1))
        .filter(|(flag, _)| flag.as_str() == "-c")
        .map(|(_, value)| value.as_str())
        .collect();
    assert_eq!(consts, vec!["layers=2", "height=3", "width=4", "depth=5"]);
}
