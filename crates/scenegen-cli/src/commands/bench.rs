use anyhow::Context;
use std::path::Path;
use tracing::info;

use scenegen_bench::{render_size_vs_time_svg, BenchConfig, Benchmark, ChartConfig, ResultsLog};
use scenegen_stages::MONOLITHIC_VARIANT;

use crate::cli::BenchArgs;
use crate::engine::build_engine;

pub async fn run(args: &BenchArgs) -> anyhow::Result<()> {
    let outsheet = args.outsheet();

    if args.plot_only {
        plot(&args.outcsv, &outsheet, "Generator runtime vs. problem size")?;
        if args.solver_csv.exists() {
            plot(&args.solver_csv, &args.solver_svg, "Solver runtime vs. problem size")?;
        }
        return Ok(());
    }

    let (catalogue, programs) = super::catalogue_and_programs(&args.catalogue)?;
    let pipeline = match &args.program {
        Some(program) => catalogue
            .variant(MONOLITHIC_VARIANT)?
            .resolve(&programs, Some(program.as_path()))?,
        None => catalogue.variant(&args.variant)?.resolve(&programs, None)?,
    };
    let profile = args
        .validate
        .as_deref()
        .map(|name| catalogue.profile(name).map(|p| p.resolve(&programs)))
        .transpose()?;

    let generator_log = ResultsLog::init(&args.outcsv)?;
    let solver_log = match profile {
        Some(_) => Some(ResultsLog::init(&args.solver_csv)?),
        None => None,
    };

    let mut benchmark = Benchmark::new(build_engine()?, pipeline).with_policy(args.policy.policy());
    if let Some(profile) = profile {
        benchmark = benchmark.with_validation(profile);
    }

    let config = BenchConfig {
        max_dim: args.max_dim,
        start_dim: args.start_dim,
        steps: args.steps,
        repeats: args.repeats,
        jobs: args.jobs,
        master_seed: args.master_seed,
    };
    let trials = benchmark.run(&config, &generator_log, solver_log.as_ref()).await?;
    info!(trials = trials.len(), csv = %args.outcsv.display(), "benchmark finished");

    plot(&args.outcsv, &outsheet, "Generator runtime vs. problem size")?;
    if solver_log.is_some() {
        plot(&args.solver_csv, &args.solver_svg, "Solver runtime vs. problem size")?;
    }
    Ok(())
}

fn plot(csv: &Path, svg: &Path, title: &str) -> anyhow::Result<()> {
    let summary = ResultsLog::open(csv)?.aggregate()?;
    let config = ChartConfig {
        title: title.to_string(),
        ..ChartConfig::default()
    };
    std::fs::write(svg, render_size_vs_time_svg(&summary, &config))
        .with_context(|| format!("writing chart to {}", svg.display()))?;
    info!(sizes = summary.len(), chart = %svg.display(), "chart written");
    Ok(())
}
