//! Scenegen Bench: measures how generation and validation scale with
//! problem size.
//!
//! A sweep walks box dimensions from small to large, runs each size a
//! number of times, and appends every timing to a CSV log. Logs can be
//! aggregated into per-size means and plotted as an SVG chart.

pub mod chart;
pub mod harness;
pub mod results;
pub mod sweep;

pub use chart::{render_size_vs_time_svg, ChartConfig};
pub use harness::{BenchConfig, Benchmark, Trial};
pub use results::{aggregate, BenchRow, ResultsLog, SizeSummary};
pub use sweep::ProgressiveTriples;

use scenegen_core::{RunFailure, SceneError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BenchError {
    #[error("BENCH/CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("BENCH/IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("BENCH/RUN: {0}")]
    Run(#[from] RunFailure),

    #[error("BENCH/VALIDATE: {0}")]
    Validate(#[from] SceneError),

    #[error("BENCH/CONFIG: {0}")]
    Config(String),

    #[error("BENCH/TASK: {0}")]
    Task(String),
}
