use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use scenegen_core::NoModelPolicy;
use scenegen_stages::{DEFAULT_VARIANT, MONOLITHIC_VARIANT};

#[derive(Parser, Debug)]
#[command(name = "scenegen")]
#[command(about = "Staged scene generation and validation over clingo")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate one scene and optionally validate it
    Generate(GenerateArgs),
    /// Time generation over a progressive sweep of scene sizes
    Bench(BenchArgs),
    /// List the available variants and validation profiles
    Variants(CatalogueArgs),
}

/// Where variants and their programs come from.
#[derive(Args, Debug, Clone)]
pub struct CatalogueArgs {
    /// Directory holding the .lp programs (defaults to $SCENEGEN_PROGRAMS, then `.`)
    #[arg(long)]
    pub programs: Option<PathBuf>,

    /// Extra YAML catalogue layered over the built-in one
    #[arg(long)]
    pub pipelines: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnNoModel {
    Abort,
    Continue,
    Reseed,
}

#[derive(Args, Debug, Clone)]
pub struct PolicyArgs {
    /// What to do when a stage has no model
    #[arg(long, value_enum, default_value = "abort")]
    pub on_no_model: OnNoModel,

    /// Extra attempts per stage with `--on-no-model reseed`
    #[arg(long, default_value_t = 3)]
    pub reseed_attempts: u32,
}

impl PolicyArgs {
    pub fn policy(&self) -> NoModelPolicy {
        match self.on_no_model {
            OnNoModel::Abort => NoModelPolicy::Abort,
            OnNoModel::Continue => NoModelPolicy::Continue,
            OnNoModel::Reseed => NoModelPolicy::Reseed {
                attempts: self.reseed_attempts,
            },
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[arg(long, default_value_t = 3)]
    pub height: u32,

    #[arg(long, default_value_t = 3)]
    pub width: u32,

    #[arg(long, default_value_t = 3)]
    pub depth: u32,

    #[arg(long, default_value = DEFAULT_VARIANT)]
    pub variant: String,

    #[command(flatten)]
    pub catalogue: CatalogueArgs,

    /// Fixed seed in [0, 2^31) instead of an OS-random one
    #[arg(long)]
    pub seed: Option<u64>,

    #[command(flatten)]
    pub policy: PolicyArgs,

    /// Render the last stage's model instead of merging it
    #[arg(long)]
    pub print_scene: bool,

    /// Validate the generated scene against this profile
    #[arg(long, value_name = "PROFILE")]
    pub validate: Option<String>,

    /// Print the validation model instead of only checking satisfiability
    #[arg(long, requires = "validate")]
    pub emit: bool,

    /// Write the run report as JSON
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct BenchArgs {
    /// Largest dimension in the sweep
    #[arg(long)]
    pub max_dim: u32,

    #[arg(long, default_value_t = 2)]
    pub start_dim: u32,

    /// Stop after this many sizes
    #[arg(long)]
    pub steps: Option<usize>,

    #[arg(long, default_value_t = 5)]
    pub repeats: u32,

    #[arg(long, default_value = "bench_results.csv")]
    pub outcsv: PathBuf,

    /// Chart of the generator log (defaults to the CSV path with .svg)
    #[arg(long)]
    pub outsheet: Option<PathBuf>,

    #[arg(long, default_value = "bench_results_solver.csv")]
    pub solver_csv: PathBuf,

    #[arg(long, default_value = "bench_results_solver.svg")]
    pub solver_svg: PathBuf,

    /// Also time validation against this profile
    #[arg(long, value_name = "PROFILE")]
    pub validate: Option<String>,

    #[arg(long, default_value = MONOLITHIC_VARIANT, conflicts_with = "program")]
    pub variant: String,

    /// Single generator program, run as the monolithic variant
    #[arg(long, value_name = "FILE")]
    pub program: Option<PathBuf>,

    #[command(flatten)]
    pub catalogue: CatalogueArgs,

    #[command(flatten)]
    pub policy: PolicyArgs,

    /// Trials run concurrently
    #[arg(long, default_value_t = 1)]
    pub jobs: usize,

    /// Derive every trial's seed from this value
    #[arg(long)]
    pub master_seed: Option<u64>,

    /// Only redraw the charts from existing CSV logs
    #[arg(long)]
    pub plot_only: bool,
}

impl BenchArgs {
    pub fn outsheet(&self) -> PathBuf {
        self.outsheet
            .clone()
            .unwrap_or_else(|| self.outcsv.with_extension("svg"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("scenegen").chain(args.iter().copied()))
    }

    #[test]
    fn test_generate_defaults() {
        let cli = parse(&["generate"]).unwrap();
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!((args.height, args.width, args.depth), (3, 3, 3));
        assert_eq!(args.variant, "optimized");
        assert_eq!(args.policy.policy(), NoModelPolicy::Abort);
        assert!(!args.print_scene);
        assert!(args.seed.is_none());
    }

    #[test]
    fn test_generate_reseed_policy() {
        let cli = parse(&[
            "generate",
            "--height",
            "4",
            "--on-no-model",
            "reseed",
            "--reseed-attempts",
            "7",
            "--print-scene",
            "--validate",
            "full",
            "--emit",
        ])
        .unwrap();
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.height, 4);
        assert_eq!(args.policy.policy(), NoModelPolicy::Reseed { attempts: 7 });
        assert!(args.print_scene);
        assert_eq!(args.validate.as_deref(), Some("full"));
        assert!(args.emit);
    }

    #[test]
    fn test_emit_requires_validate() {
        assert!(parse(&["generate", "--emit"]).is_err());
    }

    #[test]
    fn test_bench_defaults() {
        let cli = parse(&["bench", "--max-dim", "6"]).unwrap();
        let Commands::Bench(args) = cli.command else {
            panic!("expected bench");
        };
        assert_eq!(args.max_dim, 6);
        assert_eq!(args.start_dim, 2);
        assert_eq!(args.repeats, 5);
        assert_eq!(args.jobs, 1);
        assert_eq!(args.variant, "monolithic");
        assert_eq!(args.outsheet(), PathBuf::from("bench_results.svg"));
        assert_eq!(args.solver_csv, PathBuf::from("bench_results_solver.csv"));
    }

    #[test]
    fn test_bench_program_conflicts_with_variant() {
        assert!(parse(&["bench", "--max-dim", "4", "--variant", "optimized", "--program", "g.lp"]).is_err());
        let cli = parse(&["bench", "--max-dim", "4", "--program", "g.lp"]).unwrap();
        let Commands::Bench(args) = cli.command else {
            panic!("expected bench");
        };
        assert_eq!(args.program, Some(PathBuf::from("g.lp")));
    }

    #[test]
    fn test_bench_requires_max_dim() {
        assert!(parse(&["bench"]).is_err());
    }
}
