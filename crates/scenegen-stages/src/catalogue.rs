//! Catalogue loading and resolution.
//!
//! The catalogue file format:
//! - `variants`: named generation pipelines, each an ordered list of stages
//! - `profiles`: named validation models with the predicates they read
//!
//! Definitions hold program references relative to a programs directory;
//! resolving one yields the core's [`PipelineSpec`] or [`ValidationProfile`].

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use scenegen_core::{
    DimensionBinding, FactFilter, Param, PipelineSpec, SceneError, StageSpec, ValidationProfile,
};

use crate::programs::ProgramsDir;

/// Top-level catalogue file structure
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogueFile {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub variants: Vec<VariantDefinition>,
    #[serde(default)]
    pub profiles: Vec<ProfileDefinition>,
}

/// Catalogue format version this crate reads.
pub const CATALOGUE_VERSION: &str = "1";

fn default_version() -> String {
    CATALOGUE_VERSION.to_string()
}

/// A generation variant: one program, several stages
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VariantDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub program: PathBuf,
    pub stages: Vec<StageDefinition>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StageDefinition {
    pub section: String,
    /// Overrides the variant's program for this stage only.
    #[serde(default)]
    pub program: Option<PathBuf>,
    #[serde(default)]
    pub rand_freq: Option<f64>,
    #[serde(default = "default_stage_parallelism")]
    pub parallelism: u32,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default)]
    pub dimensions: Option<DimensionBinding>,
    #[serde(default)]
    pub terminal: bool,
}

fn default_stage_parallelism() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProfileDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub program: PathBuf,
    #[serde(default = "default_profile_section")]
    pub section: String,
    #[serde(default = "default_profile_parallelism")]
    pub parallelism: u32,
    pub predicates: Vec<String>,
}

fn default_profile_section() -> String {
    "base".to_string()
}

fn default_profile_parallelism() -> u32 {
    11
}

impl VariantDefinition {
    /// Builds the pipeline, resolving programs against `programs`.
    ///
    /// `program_override` replaces the variant-level program; stages with
    /// their own program keep it.
    pub fn resolve(
        &self,
        programs: &ProgramsDir,
        program_override: Option<&Path>,
    ) -> Result<PipelineSpec, SceneError> {
        let default_program = programs.resolve(program_override.unwrap_or(self.program.as_path()));
        let stages = self
            .stages
            .iter()
            .map(|stage| StageSpec {
                program: stage
                    .program
                    .as_ref()
                    .map(|p| programs.resolve(p))
                    .unwrap_or_else(|| default_program.clone()),
                section: stage.section.clone(),
                rand_freq: stage.rand_freq,
                parallelism: stage.parallelism,
                params: stage.params.clone(),
                dimensions: stage.dimensions.clone(),
                terminal: stage.terminal,
            })
            .collect();
        PipelineSpec::new(self.name.clone(), stages)
    }
}

impl ProfileDefinition {
    pub fn resolve(&self, programs: &ProgramsDir) -> ValidationProfile {
        ValidationProfile {
            name: self.name.clone(),
            program: programs.resolve(&self.program),
            section: self.section.clone(),
            parallelism: self.parallelism,
            predicates: FactFilter::new(self.predicates.iter().cloned()),
        }
    }
}

/// Variants and profiles indexed by name.
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    variants: BTreeMap<String, VariantDefinition>,
    profiles: BTreeMap<String, ProfileDefinition>,
}

impl Catalogue {
    /// Parse and check a catalogue from YAML text
    pub fn from_yaml(yaml: &str) -> Result<Self, SceneError> {
        let file: CatalogueFile = serde_yaml::from_str(yaml)
            .map_err(|e| SceneError::Config(format!("invalid catalogue: {e}")))?;
        Self::from_file(file)
    }

    /// Load a catalogue from a YAML file
    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SceneError::Config(format!("failed to read {}: {e}", path.display())))?;
        let catalogue = Self::from_yaml(&content)?;
        debug!(
            path = %path.display(),
            variants = catalogue.variants.len(),
            profiles = catalogue.profiles.len(),
            "loaded catalogue"
        );
        Ok(catalogue)
    }

    fn from_file(file: CatalogueFile) -> Result<Self, SceneError> {
        if file.version != CATALOGUE_VERSION {
            return Err(SceneError::Config(format!(
                "unsupported catalogue version '{}' (expected '{CATALOGUE_VERSION}')",
                file.version
            )));
        }
        let mut catalogue = Self::default();
        for variant in file.variants {
            // Surface bad stage lists at load time rather than at run time.
            variant.resolve(&ProgramsDir::default(), None)?;
            let name = variant.name.clone();
            if catalogue.variants.insert(name.clone(), variant).is_some() {
                return Err(SceneError::Config(format!("duplicate variant '{name}'")));
            }
        }
        for profile in file.profiles {
            if profile.parallelism == 0 {
                return Err(SceneError::Config(format!(
                    "profile '{}' needs a parallelism of at least 1",
                    profile.name
                )));
            }
            let name = profile.name.clone();
            if catalogue.profiles.insert(name.clone(), profile).is_some() {
                return Err(SceneError::Config(format!("duplicate profile '{name}'")));
            }
        }
        Ok(catalogue)
    }

    /// Adds `other`'s entries, replacing same-named ones.
    pub fn merge(&mut self, other: Catalogue) {
        self.variants.extend(other.variants);
        self.profiles.extend(other.profiles);
    }

    pub fn variant(&self, name: &str) -> Result<&VariantDefinition, SceneError> {
        self.variants.get(name).ok_or_else(|| {
            SceneError::Config(format!(
                "unknown variant '{name}' (known: {})",
                self.variant_names().join(", ")
            ))
        })
    }

    pub fn profile(&self, name: &str) -> Result<&ProfileDefinition, SceneError> {
        self.profiles.get(name).ok_or_else(|| {
            SceneError::Config(format!(
                "unknown validation profile '{name}' (known: {})",
                self.profile_names().join(", ")
            ))
        })
    }

    pub fn variants(&self) -> impl Iterator<Item = &VariantDefinition> {
        self.variants.values()
    }

    pub fn profiles(&self) -> impl Iterator<Item = &ProfileDefinition> {
        self.profiles.values()
    }

    pub fn variant_names(&self) -> Vec<&str> {
        self.variants.keys().map(String::as_str).collect()
    }

    pub fn profile_names(&self) -> Vec<&str> {
        self.profiles.keys().map(String::as_str).collect()
    }
}
