pub mod bench;
pub mod generate;
pub mod variants;

use scenegen_core::SceneError;
use scenegen_stages::{load_catalogue, Catalogue, ProgramsDir};

use crate::cli::CatalogueArgs;

pub(crate) fn catalogue_and_programs(args: &CatalogueArgs) -> Result<(Catalogue, ProgramsDir), SceneError> {
    let catalogue = load_catalogue(args.pipelines.as_deref())?;
    let programs = ProgramsDir::from_env_or(args.programs.clone());
    Ok((catalogue, programs))
}
