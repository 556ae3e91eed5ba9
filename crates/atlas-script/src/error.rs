use crate::diagnostics::Diagnostic;

/// Result type for script parsing and mapping.
pub type ScriptResult<T> = Result<T, ScriptError>;

/// Errors from reading a script file into structured data.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ScriptError {
    /// Lexing or parsing failed.
    #[error("{}", summarize(.diagnostics))]
    Syntax {
        /// Every problem found, in source order.
        diagnostics: Vec<Diagnostic>,
    },

    /// The file parsed but its root does not fit the requested schema.
    #[error("file root cannot be read as {expected}")]
    Schema {
        /// Name of the requested shape.
        expected: String,
    },
}

impl ScriptError {
    /// Diagnostics to render against the source, if this is a syntax error.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Self::Syntax { diagnostics } => diagnostics,
            Self::Schema { .. } => &[],
        }
    }
}

fn summarize(diagnostics: &[Diagnostic]) -> String {
    match diagnostics {
        [] => "syntax error".to_string(),
        [only] => only.message.clone(),
        [first, rest @ ..] => format!("{} (and {} more)", first.message, rest.len()),
    }
}
