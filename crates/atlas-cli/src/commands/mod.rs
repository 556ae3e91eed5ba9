pub mod check;
pub mod countries;
pub mod lint;
pub mod tags;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use atlas_core::Warning;
use atlas_loader::{CountriesLoader, LoaderConfig, ModDirectory};
use clap::Args;
use colored::Colorize;

/// Where to read content from.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Mod directory; its files shadow the game's
    #[arg(short, long, default_value = ".")]
    mod_dir: PathBuf,

    /// Game install directory
    #[arg(short, long)]
    game_dir: Option<PathBuf>,

    /// Loader config file (default: atlas.toml in the mod directory, if present)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl SourceArgs {
    pub fn source(&self) -> Arc<ModDirectory> {
        let mut source = ModDirectory::new().with_mod_root(&self.mod_dir);
        if let Some(game) = &self.game_dir {
            source = source.with_game_root(game);
        }
        Arc::new(source)
    }

    pub fn config(&self) -> Result<LoaderConfig, String> {
        let path = match &self.config {
            Some(path) => path.clone(),
            None => {
                let default = self.mod_dir.join("atlas.toml");
                if !default.is_file() {
                    return Ok(LoaderConfig::default());
                }
                default
            }
        };

        let text = std::fs::read_to_string(&path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        LoaderConfig::from_toml_str(&text).map_err(|e| format!("{}: {e}", path.display()))
    }

    pub fn countries_loader(&self) -> Result<CountriesLoader, String> {
        Ok(CountriesLoader::new(self.source(), self.config()?))
    }
}

/// Print warnings to stderr.
fn print_warnings(warnings: &[Warning]) {
    for warning in warnings {
        eprintln!("  {} {}", "warning:".yellow().bold(), warning.text);
        for file in &warning.related_files {
            eprintln!("    {} {}", "-->".dimmed(), file);
        }
    }
}

fn count(n: usize, one: &str, many: &str) -> String {
    format!("{n} {}", if n == 1 { one } else { many })
}
