use crate::cli::CatalogueArgs;

pub fn run(args: &CatalogueArgs) -> anyhow::Result<()> {
    let (catalogue, programs) = super::catalogue_and_programs(args)?;

    println!("programs: {}", programs.root().display());
    println!("variants:");
    for variant in catalogue.variants() {
        let sections: Vec<&str> = variant.stages.iter().map(|s| s.section.as_str()).collect();
        println!(
            "  {:<12} {} [{}]  {}",
            variant.name,
            variant.program.display(),
            sections.join(" → "),
            variant.description
        );
    }
    println!("profiles:");
    for profile in catalogue.profiles() {
        println!(
            "  {:<12} {} [{}]  {}",
            profile.name,
            profile.program.display(),
            profile.predicates.join(", "),
            profile.description
        );
    }
    Ok(())
}
