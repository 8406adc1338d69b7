//! CSV result log and per-size aggregation.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use scenegen_core::Dimensions;

use crate::BenchError;

pub const HEADER: [&str; 6] = ["height", "width", "depth", "run", "seconds", "size"];

/// One timed trial as stored in the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchRow {
    pub height: u32,
    pub width: u32,
    pub depth: u32,
    pub run: u32,
    pub seconds: f64,
    pub size: u64,
}

impl BenchRow {
    pub fn new(dims: Dimensions, run: u32, seconds: f64) -> Self {
        Self {
            height: dims.height,
            width: dims.width,
            depth: dims.depth,
            run,
            seconds,
            size: dims.size(),
        }
    }
}

/// Mean runtime of all trials sharing one set of dimensions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeSummary {
    pub height: u32,
    pub width: u32,
    pub depth: u32,
    pub size: u64,
    pub runs: usize,
    pub mean_seconds: f64,
}

/// Append-only CSV log; earlier sweeps in the same file are kept.
#[derive(Debug, Clone)]
pub struct ResultsLog {
    path: PathBuf,
}

impl ResultsLog {
    /// Opens `path`, writing the header only if the file does not exist yet.
    pub fn init(path: impl Into<PathBuf>) -> Result<Self, BenchError> {
        let path = path.into();
        if !path.exists() {
            let mut writer = csv::Writer::from_path(&path)?;
            writer.write_record(HEADER)?;
            writer.flush()?;
        }
        Ok(Self { path })
    }

    /// Opens an existing log for reading; never creates the file.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, BenchError> {
        let path = path.into();
        if !path.is_file() {
            return Err(BenchError::Config(format!("no results log at {}", path.display())));
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, row: &BenchRow) -> Result<(), BenchError> {
        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        writer.write_record([
            row.height.to_string(),
            row.width.to_string(),
            row.depth.to_string(),
            row.run.to_string(),
            format!("{:.6}", row.seconds),
            row.size.to_string(),
        ])?;
        writer.flush()?;
        Ok(())
    }

    pub fn rows(&self) -> Result<Vec<BenchRow>, BenchError> {
        let mut reader = csv::Reader::from_path(&self.path)?;
        let rows = reader.deserialize().collect::<Result<Vec<BenchRow>, _>>()?;
        Ok(rows)
    }

    pub fn aggregate(&self) -> Result<Vec<SizeSummary>, BenchError> {
        Ok(aggregate(&self.rows()?))
    }
}

/// Groups rows by dimensions and averages their runtimes, ordered by size.
pub fn aggregate(rows: &[BenchRow]) -> Vec<SizeSummary> {
    let mut groups: BTreeMap<(u64, u32, u32, u32), Vec<f64>> = BTreeMap::new();
    for row in rows {
        groups
            .entry((row.size, row.height, row.width, row.depth))
            .or_default()
            .push(row.seconds);
    }
    groups
        .into_iter()
        .map(|((size, height, width, depth), seconds)| SizeSummary {
            height,
            width,
            depth,
            size,
            runs: seconds.len(),
            mean_seconds: seconds.iter().sum::<f64>() / seconds.len() as f64,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(h: u32, w: u32, d: u32) -> Dimensions {
        Dimensions::new(h, w, d).unwrap()
    }

    #[test]
    fn test_header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench.csv");

        let log = ResultsLog::init(&path).unwrap();
        log.append(&BenchRow::new(dims(2, 2, 2), 1, 0.5)).unwrap();
        let again = ResultsLog::init(&path).unwrap();
        again.append(&BenchRow::new(dims(2, 2, 3), 1, 0.25)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "height,width,depth,run,seconds,size\n2,2,2,1,0.500000,8\n2,2,3,1,0.250000,12\n"
        );
        assert_eq!(again.rows().unwrap().len(), 2);
    }

    #[test]
    fn test_open_requires_existing_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.csv");

        let err = ResultsLog::open(&path).unwrap_err();
        assert!(matches!(err, BenchError::Config(ref msg) if msg.contains("missing.csv")));
        assert!(!path.exists());

        ResultsLog::init(&path).unwrap();
        assert!(ResultsLog::open(&path).unwrap().rows().unwrap().is_empty());
    }

    #[test]
    fn test_aggregate_means_by_size() {
        let rows = vec![
            BenchRow::new(dims(2, 2, 3), 1, 3.0),
            BenchRow::new(dims(2, 2, 2), 1, 1.0),
            BenchRow::new(dims(2, 2, 2), 2, 2.0),
            BenchRow::new(dims(2, 2, 3), 2, 5.0),
        ];

        let summary = aggregate(&rows);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].size, 8);
        assert_eq!(summary[0].runs, 2);
        assert!((summary[0].mean_seconds - 1.5).abs() < 1e-12);
        assert_eq!(summary[1].size, 12);
        assert!((summary[1].mean_seconds - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_distinct_dimensions_with_equal_size_stay_separate() {
        let rows = vec![
            BenchRow::new(dims(1, 2, 6), 1, 1.0),
            BenchRow::new(dims(2, 2, 3), 1, 2.0),
        ];
        let summary = aggregate(&rows);
        assert_eq!(summary.len(), 2);
        assert!(summary.iter().all(|s| s.size == 12));
    }
}
