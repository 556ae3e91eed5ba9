use atlas_loader::Loader;
use colored::Colorize;

use super::SourceArgs;

pub async fn run(args: &SourceArgs, strict: bool) -> Result<(), String> {
    let mut loader = args.countries_loader()?;
    let loaded = loader.load(false).await.map_err(|e| e.to_string())?;

    super::print_warnings(&loaded.warnings);

    let warnings = loaded.warnings.len();
    if strict && warnings > 0 {
        return Err(format!("{} reported", super::count(warnings, "warning", "warnings")));
    }

    if warnings == 0 {
        println!("  {}", "All checks passed.".green());
    }
    println!(
        "  {}, {}, {}",
        super::count(loaded.result.len(), "country", "countries"),
        super::count(loaded.dependencies.len(), "dependency", "dependencies"),
        super::count(warnings, "warning", "warnings"),
    );

    Ok(())
}
