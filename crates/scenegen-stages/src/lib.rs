//! Scenegen Stages: generation variants and validation profiles.
//!
//! The built-in catalogue describes the generators the scene programs ship
//! with. Users can layer their own YAML catalogue on top.
//!
//! # Pipeline Flow
//!
//! ```text
//! optimized:   block_size_gen → block_gen → pipe_gen → rotation
//! generator2:  init → block_size_gen → block_gen → pipe_gen → rotation
//! monolithic:  base
//!                                   ↓
//!                  filter(profile.predicates) → validate
//! ```

mod catalogue;
mod programs;

pub use catalogue::{
    Catalogue, CatalogueFile, ProfileDefinition, StageDefinition, VariantDefinition,
    CATALOGUE_VERSION,
};
pub use programs::{ProgramsDir, PROGRAMS_ENV};

use once_cell::sync::Lazy;
use scenegen_core::SceneError;
use std::path::Path;

/// Variant used when none is requested.
pub const DEFAULT_VARIANT: &str = "optimized";

/// Variant whose single program is supplied by the caller.
pub const MONOLITHIC_VARIANT: &str = "monolithic";

static BUILTIN_YAML: &str = include_str!("../catalogue/builtin.yaml");

static BUILTIN: Lazy<Result<Catalogue, String>> =
    Lazy::new(|| Catalogue::from_yaml(BUILTIN_YAML).map_err(|e| e.to_string()));

/// The catalogue compiled into the crate.
pub fn builtin() -> Result<Catalogue, SceneError> {
    (*BUILTIN).clone().map_err(SceneError::Config)
}

/// Built-in catalogue, overlaid with `extra` when given.
pub fn load_catalogue(extra: Option<&Path>) -> Result<Catalogue, SceneError> {
    let mut catalogue = builtin()?;
    if let Some(path) = extra {
        catalogue.merge(Catalogue::load(path)?);
    }
    Ok(catalogue)
}
