use atlas_core::{Rgb, format_color};
use atlas_loader::Loader;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use super::SourceArgs;

pub async fn run(args: &SourceArgs, json: bool) -> Result<(), String> {
    let mut loader = args.countries_loader()?;
    let loaded = loader.load(false).await.map_err(|e| e.to_string())?;

    if json {
        let out = serde_json::to_string_pretty(loaded.as_ref())
            .map_err(|e| format!("JSON serialization error: {e}"))?;
        println!("{out}");
        return Ok(());
    }

    super::print_warnings(&loaded.warnings);

    if loaded.result.is_empty() {
        println!("  No countries found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Tag", "Color", ""]);

    for country in &loaded.result {
        let Rgb { r, g, b } = Rgb::from_packed(country.color);
        let swatch = "    ".on_truecolor(r, g, b).to_string();
        table.add_row(vec![country.tag.clone(), format_color(country.color), swatch]);
    }

    println!("{table}");
    println!();
    println!("  {}", super::count(loaded.result.len(), "country", "countries"));

    Ok(())
}

