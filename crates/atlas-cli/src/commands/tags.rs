use atlas_loader::{CountryTags, CountryTagsLoader, Loader};
use comfy_table::{ContentArrangement, Table};

use super::SourceArgs;

pub async fn run(args: &SourceArgs) -> Result<(), String> {
    let config = args.config()?;
    let mut loader =
        CountryTagsLoader::new(args.source(), config.country_tags_folder.clone(), CountryTags);
    let loaded = loader.load(false).await.map_err(|e| e.to_string())?;

    super::print_warnings(&loaded.warnings);

    if loaded.result.is_empty() {
        println!("  No country tags found in {}.", config.country_tags_folder);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Tag", "File"]);
    for tag in &loaded.result {
        table.add_row(vec![tag.tag.clone(), config.country_file(&tag.file)]);
    }

    println!("{table}");
    println!();
    println!("  {}", super::count(loaded.result.len(), "tag", "tags"));

    Ok(())
}
