//! Resolution of program references against a programs directory.
use std::path::{Path, PathBuf};

/// Environment variable naming the default programs directory.
pub const PROGRAMS_ENV: &str = "SCENEGEN_PROGRAMS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramsDir {
    root: PathBuf,
}

impl ProgramsDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Explicit directory first, then `SCENEGEN_PROGRAMS`, then `.`.
    pub fn from_env_or(explicit: Option<PathBuf>) -> Self {
        let root = explicit
            .or_else(|| std::env::var_os(PROGRAMS_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute references are returned unchanged.
    pub fn resolve(&self, program: impl AsRef<Path>) -> PathBuf {
        let program = program.as_ref();
        if program.is_absolute() {
            program.to_path_buf()
        } else {
            self.root.join(program)
        }
    }
}

impl Default for ProgramsDir {
    fn default() -> Self {
        Self::new(".")
    }
}
