use std::sync::Arc;

use scenegen_core::SolveEngine;

/// The solver backend this binary was built with.
#[cfg(feature = "clingo")]
pub fn build_engine() -> anyhow::Result<Arc<dyn SolveEngine>> {
    Ok(Arc::new(scenegen_core::ClingoEngine::new()))
}

#[cfg(not(feature = "clingo"))]
pub fn build_engine() -> anyhow::Result<Arc<dyn SolveEngine>> {
    Err(scenegen_core::SceneError::EngineUnavailable(
        "scenegen was built without the `clingo` feature; rebuild with `--features clingo`".into(),
    )
    .into())
}
