use atlas_script::{Schema, Structured};

use crate::error::{LoadError, LoaderResult};
use crate::source::ContentSource;

/// Read `file` from `source` and map it onto `schema`.
pub async fn read_structured(
    source: &dyn ContentSource,
    file: &str,
    schema: &Schema,
) -> LoaderResult<Structured> {
    let text = source
        .read_to_string(file)
        .await
        .map_err(|source| LoadError::Read {
            file: file.to_string(),
            source,
        })?;

    let script_error = |source| LoadError::Script {
        file: file.to_string(),
        source,
    };
    let nodes = atlas_script::parse_source(&text).map_err(script_error)?;
    let (mapped, skipped) =
        atlas_script::map_nodes_with_diagnostics(&nodes, schema).map_err(script_error)?;
    for diagnostic in &skipped {
        tracing::debug!(file, span = ?diagnostic.span, "{}", diagnostic.message);
    }
    Ok(mapped)
}
