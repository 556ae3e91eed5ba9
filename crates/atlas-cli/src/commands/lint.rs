use std::path::Path;

use atlas_loader::countries::{colors_file_schema, country_file_schema, country_tags_schema};
use atlas_script::{Schema, render_diagnostics};

/// Which kind of content file is being linted.
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
pub enum FileKind {
    /// A file under the country tags folder
    Tags,
    /// A country definition file
    Country,
    /// The color overrides file
    Colors,
}

impl FileKind {
    fn schema(self) -> Schema {
        match self {
            Self::Tags => country_tags_schema(),
            Self::Country => country_file_schema(),
            Self::Colors => colors_file_schema(),
        }
    }
}

pub fn run(file: &Path, kind: Option<FileKind>) -> Result<(), String> {
    let source = std::fs::read_to_string(file)
        .map_err(|e| format!("cannot read {}: {e}", file.display()))?;
    let filename = file.display().to_string();

    let nodes = match atlas_script::parse_source(&source) {
        Ok(nodes) => nodes,
        Err(e) => {
            let diagnostics = e.diagnostics();
            eprint!("{}", render_diagnostics(&source, &filename, diagnostics));
            return Err(format!(
                "{} in {filename}",
                super::count(diagnostics.len(), "syntax error", "syntax errors"),
            ));
        }
    };

    let mut summary = format!(
        "  {filename}: {}, no syntax errors",
        super::count(nodes.len(), "statement", "statements")
    );
    if let Some(kind) = kind {
        let (_, warnings) = atlas_script::map_nodes_with_diagnostics(&nodes, &kind.schema())
            .map_err(|e| format!("{filename}: {e}"))?;
        if !warnings.is_empty() {
            eprint!("{}", render_diagnostics(&source, &filename, &warnings));
            summary.push_str(&format!(
                ", {}",
                super::count(warnings.len(), "ignored value", "ignored values")
            ));
        }
    }
    println!("{summary}");
    Ok(())
}
