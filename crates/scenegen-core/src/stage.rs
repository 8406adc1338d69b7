//! Stage Spec: declarative description of one solver step
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::SceneError;

/// A `name=value` constant bound before grounding (`-c name=value`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Param {
    pub name: String,
    pub value: String,
}

impl Param {
    pub fn new(name: impl Into<String>, value: impl ToString) -> Self {
        Self {
            name: name.into(),
            value: value.to_string(),
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

impl FromStr for Param {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, value) = s
            .split_once('=')
            .ok_or_else(|| SceneError::InvalidPipeline(format!("parameter {s:?} is not name=value")))?;
        let (name, value) = (name.trim(), value.trim());
        if name.is_empty() || value.is_empty() {
            return Err(SceneError::InvalidPipeline(format!(
                "parameter {s:?} has an empty name or value"
            )));
        }
        Ok(Self::new(name, value))
    }
}

impl TryFrom<String> for Param {
    type Error = SceneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Param> for String {
    fn from(param: Param) -> Self {
        param.to_string()
    }
}

/// Box dimensions of one generated scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub height: u32,
    pub width: u32,
    pub depth: u32,
}

impl Dimensions {
    pub fn new(height: u32, width: u32, depth: u32) -> Result<Self, SceneError> {
        if height == 0 || width == 0 || depth == 0 {
            return Err(SceneError::InvalidPipeline(format!(
                "dimensions must be positive, got {height}x{width}x{depth}"
            )));
        }
        Ok(Self { height, width, depth })
    }

    /// `height × width × depth`
    pub fn size(&self) -> u64 {
        u64::from(self.height) * u64::from(self.width) * u64::from(self.depth)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.height, self.width, self.depth)
    }
}

/// Constant names a stage uses for the box dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionBinding {
    #[serde(default = "DimensionBinding::default_height")]
    pub height: String,
    #[serde(default = "DimensionBinding::default_width")]
    pub width: String,
    #[serde(default = "DimensionBinding::default_depth")]
    pub depth: String,
}

impl DimensionBinding {
    fn default_height() -> String {
        "h".to_string()
    }

    fn default_width() -> String {
        "w".to_string()
    }

    fn default_depth() -> String {
        "d".to_string()
    }

    /// `height`, `width`, `depth` spelled out, as single-program models use.
    pub fn long_names() -> Self {
        Self {
            height: "height".to_string(),
            width: "width".to_string(),
            depth: "depth".to_string(),
        }
    }

    pub fn bind(&self, dims: Dimensions) -> [Param; 3] {
        [
            Param::new(&self.height, dims.height),
            Param::new(&self.width, dims.width),
            Param::new(&self.depth, dims.depth),
        ]
    }
}

impl Default for DimensionBinding {
    fn default() -> Self {
        Self {
            height: Self::default_height(),
            width: Self::default_width(),
            depth: Self::default_depth(),
        }
    }
}

/// One step of a pipeline, bound to a section of a declarative program.
#[derive(Debug, Clone, PartialEq)]
pub struct StageSpec {
    pub program: PathBuf,
    pub section: String,
    /// `None` leaves the engine's default decision heuristic untouched.
    pub rand_freq: Option<f64>,
    pub parallelism: u32,
    pub params: Vec<Param>,
    pub dimensions: Option<DimensionBinding>,
    pub terminal: bool,
}

impl StageSpec {
    pub fn new(program: impl Into<PathBuf>, section: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            section: section.into(),
            rand_freq: None,
            parallelism: 1,
            params: Vec::new(),
            dimensions: None,
            terminal: false,
        }
    }

    pub fn with_rand_freq(mut self, rand_freq: f64) -> Self {
        self.rand_freq = Some(rand_freq);
        self
    }

    pub fn with_parallelism(mut self, parallelism: u32) -> Self {
        self.parallelism = parallelism;
        self
    }

    pub fn with_param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn binding_dimensions(mut self, binding: DimensionBinding) -> Self {
        self.dimensions = Some(binding);
        self
    }

    pub fn terminal(mut self) -> Self {
        self.terminal = true;
        self
    }

    pub fn label(&self) -> &str {
        &self.section
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn validate(&self) -> Result<(), SceneError> {
        if self.section.trim().is_empty() {
            return Err(SceneError::InvalidPipeline("stage has an empty section label".into()));
        }
        if self.program.as_os_str().is_empty() {
            return Err(SceneError::InvalidPipeline(format!(
                "stage '{}' has no program reference",
                self.section
            )));
        }
        if self.parallelism == 0 {
            return Err(SceneError::InvalidPipeline(format!(
                "stage '{}' needs a parallelism of at least 1",
                self.section
            )));
        }
        if let Some(rate) = self.rand_freq {
            if !(0.0..=1.0).contains(&rate) {
                return Err(SceneError::InvalidPipeline(format!(
                    "stage '{}' has randomization rate {rate} outside [0, 1]",
                    self.section
                )));
            }
        }
        Ok(())
    }

    /// Explicit parameters followed by the dimension constants, if bound.
    pub fn bound_params(&self, dims: Option<Dimensions>) -> Result<Vec<Param>, SceneError> {
        let mut params = self.params.clone();
        if let Some(binding) = &self.dimensions {
            let dims = dims.ok_or_else(|| {
                SceneError::InvalidPipeline(format!(
                    "stage '{}' binds dimensions but the run has none",
                    self.section
                ))
            })?;
            params.extend(binding.bind(dims));
        }
        Ok(params)
    }
}

/// Named, ordered, non-empty list of stages.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSpec {
    name: String,
    stages: Vec<StageSpec>,
}

impl PipelineSpec {
    pub fn new(name: impl Into<String>, stages: Vec<StageSpec>) -> Result<Self, SceneError> {
        let spec = Self {
            name: name.into(),
            stages,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stages(&self) -> &[StageSpec] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Marks the last stage terminal so its model is rendered, not merged.
    pub fn rendering_last(mut self) -> Self {
        if let Some(last) = self.stages.last_mut() {
            last.terminal = true;
        }
        self
    }

    pub fn validate(&self) -> Result<(), SceneError> {
        if self.stages.is_empty() {
            return Err(SceneError::InvalidPipeline(format!(
                "pipeline '{}' has no stages",
                self.name
            )));
        }
        let last = self.stages.len() - 1;
        for (idx, stage) in self.stages.iter().enumerate() {
            stage.validate()?;
            if stage.terminal && idx != last {
                return Err(SceneError::InvalidPipeline(format!(
                    "stage '{}' (#{idx}) is terminal but not last in '{}'",
                    stage.section, self.name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_parse_and_display() {
        let param: Param = "h = 3".parse().unwrap();
        assert_eq!(param, Param::new("h", 3));
        assert_eq!(param.to_string(), "h=3");
        assert!("h".parse::<Param>().is_err());
        assert!("=3".parse::<Param>().is_err());
    }

    #[test]
    fn test_dimension_binding() {
        let dims = Dimensions::new(2, 3, 4).unwrap();
        let stage = StageSpec::new("gen.lp", "init")
            .with_param(Param::new("k", 1))
            .binding_dimensions(DimensionBinding::default());

        let params = stage.bound_params(Some(dims)).unwrap();
        let rendered: Vec<_> = params.iter().map(Param::to_string).collect();
        assert_eq!(rendered, vec!["k=1", "h=2", "w=3", "d=4"]);
        assert!(stage.bound_params(None).is_err());
        assert_eq!(dims.size(), 24);
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(Dimensions::new(0, 2, 2).is_err());
    }

    #[test]
    fn test_pipeline_rejects_empty_and_misplaced_terminal() {
        assert!(PipelineSpec::new("empty", vec![]).is_err());

        let stages = vec![
            StageSpec::new("gen.lp", "a").terminal(),
            StageSpec::new("gen.lp", "b"),
        ];
        let err = PipelineSpec::new("bad", stages).unwrap_err();
        assert!(err.to_string().contains("terminal"));
    }

    #[test]
    fn test_stage_validation() {
        assert!(StageSpec::new("gen.lp", "a").with_rand_freq(1.5).validate().is_err());
        assert!(StageSpec::new("gen.lp", "a").with_parallelism(0).validate().is_err());
        assert!(StageSpec::new("", "a").validate().is_err());
        assert!(StageSpec::new("gen.lp", " ").validate().is_err());
        assert!(StageSpec::new("gen.lp", "a").with_rand_freq(0.5).validate().is_ok());
    }

    #[test]
    fn test_rendering_last_marks_only_last_stage() {
        let pipeline = PipelineSpec::new(
            "p",
            vec![StageSpec::new("gen.lp", "a"), StageSpec::new("gen.lp", "b")],
        )
        .unwrap()
        .rendering_last();
        assert!(!pipeline.stages()[0].terminal);
        assert!(pipeline.stages()[1].terminal);
        assert!(pipeline.validate().is_ok());
    }
}
