use anyhow::Context;
use tracing::{info, warn};

use scenegen_core::{
    Dimensions, FixedStart, OsSeedSource, SceneError, SeedSource, StageSequencer, ValidationMode,
    Validator, SEED_BOUND,
};

use crate::cli::GenerateArgs;
use crate::engine::build_engine;

pub fn run(args: &GenerateArgs) -> anyhow::Result<()> {
    let dims = Dimensions::new(args.height, args.width, args.depth)?;
    let (catalogue, programs) = super::catalogue_and_programs(&args.catalogue)?;

    let mut pipeline = catalogue.variant(&args.variant)?.resolve(&programs, None)?;
    if args.print_scene {
        pipeline = pipeline.rendering_last();
    }
    // Resolve the profile before solving so a typo fails fast.
    let profile = args
        .validate
        .as_deref()
        .map(|name| catalogue.profile(name).map(|p| p.resolve(&programs)))
        .transpose()?;

    let mut seeds = seed_source(args.seed)?;
    let engine = build_engine()?;

    info!(variant = %args.variant, %dims, "generating scene");
    let mut output = match StageSequencer::new(engine.as_ref())
        .with_policy(args.policy.policy())
        .run(&pipeline, Some(dims), seeds.as_mut())
    {
        Ok(output) => output,
        Err(failure) => {
            warn!(
                stages_done = failure.stages.len(),
                facts = failure.facts.len(),
                "generation stopped early"
            );
            return Err(failure.into());
        }
    };

    match &output.rendered {
        Some(scene) => println!("{scene}"),
        None => println!("{}", output.facts.to_program()),
    }

    if let Some(profile) = profile {
        let mode = if args.emit {
            ValidationMode::Emit
        } else {
            ValidationMode::Decide
        };
        let report = Validator::new(engine.as_ref()).validate(&profile, &output.facts, mode)?;
        if report.satisfiable {
            info!(profile = %report.profile, latency_ms = report.latency_ms, "SATISFIABLE");
        } else {
            warn!(profile = %report.profile, latency_ms = report.latency_ms, "UNSATISFIABLE");
        }
        if let Some(model) = &report.rendered {
            println!("{model}");
        }
        output.report.validation = Some(report);
    }

    if let Some(path) = &args.report {
        std::fs::write(path, output.report.to_json_pretty()?)
            .with_context(|| format!("writing report to {}", path.display()))?;
        info!(path = %path.display(), "run report written");
    }
    Ok(())
}

/// `--seed` pins the run's seed; reseed retries derive theirs from it.
fn seed_source(seed: Option<u64>) -> Result<Box<dyn SeedSource>, SceneError> {
    match seed {
        Some(seed) => FixedStart::new(seed)
            .map(|s| Box::new(s) as Box<dyn SeedSource>)
            .ok_or_else(|| SceneError::Config(format!("seed {seed} is outside [0, {SEED_BOUND})"))),
        None => Ok(Box::new(OsSeedSource)),
    }
}
