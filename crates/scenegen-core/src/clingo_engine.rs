//! Native clingo backend (enabled with the `clingo` feature).
use clingo::{control, Part, ShowType, SolveMode as ClingoSolveMode};
use tracing::debug;

use crate::engine::{EngineError, FirstModel, Model, SolveEngine, SolveMode, SolveOutcome, SolveRequest};
use crate::fact::Fact;
use crate::FACTS_SECTION;

/// Runs each request on a fresh `clingo::Control`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClingoEngine;

impl ClingoEngine {
    pub fn new() -> Self {
        Self
    }
}

impl SolveEngine for ClingoEngine {
    fn name(&self) -> &str {
        "clingo"
    }

    fn solve(&self, request: &SolveRequest<'_>) -> Result<SolveOutcome, EngineError> {
        let args = request.engine_args();
        debug!(?args, section = request.section, "configuring clingo");

        let mut ctl = control(args).map_err(|e| EngineError::Unavailable(e.to_string()))?;

        let program = request.program.to_str().ok_or_else(|| {
            EngineError::Unavailable(format!("program path {:?} is not UTF-8", request.program))
        })?;
        ctl.load(program)
            .map_err(|e| EngineError::Unavailable(format!("{program}: {e}")))?;
        ctl.add(FACTS_SECTION, &[], &request.facts_program())
            .map_err(|e| EngineError::Failed(e.to_string()))?;

        let parts = vec![
            Part::new(FACTS_SECTION, vec![]).map_err(|e| EngineError::Failed(e.to_string()))?,
            Part::new(request.section, vec![]).map_err(|e| EngineError::Failed(e.to_string()))?,
        ];
        ctl.ground(&parts)
            .map_err(|e| EngineError::Failed(format!("grounding '{}': {e}", request.section)))?;

        let first = FirstModel::new();
        let mut handle = ctl
            .solve(ClingoSolveMode::YIELD, &[])
            .map_err(|e| EngineError::Failed(e.to_string()))?;
        while !first.is_resolved() {
            handle.resume().map_err(|e| EngineError::Failed(e.to_string()))?;
            let model = match handle.model() {
                Ok(Some(model)) => model,
                Ok(None) => break,
                Err(e) => return Err(EngineError::Failed(e.to_string())),
            };
            let taken = match request.mode {
                SolveMode::Decide => Model::default(),
                SolveMode::Collect => {
                    let symbols = model
                        .symbols(ShowType::ATOMS)
                        .map_err(|e| EngineError::Failed(e.to_string()))?;
                    let facts = symbols
                        .iter()
                        .map(|symbol| {
                            Fact::from_atom(&symbol.to_string())
                                .map_err(|e| EngineError::Malformed(e.to_string()))
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    Model::new(facts)
                }
            };
            first.offer(taken);
        }
        handle.close().map_err(|e| EngineError::Failed(e.to_string()))?;

        Ok(first.into_outcome())
    }
}
