//! Reader for Paradox-style mod script files.
//!
//! `key = value` statements, braced blocks, and qualified blocks such as
//! `rgb { 200 0 0 }` are lexed with logos, parsed with chumsky, and then
//! mapped onto a caller-supplied [`Schema`].

/// Syntax tree produced by the parser.
pub mod ast;
/// Error reports with source spans, rendered with ariadne.
pub mod diagnostics;
/// Error types for parsing and mapping.
pub mod error;
/// Tokenizer built on logos.
pub mod lexer;
/// Statement parser built on chumsky.
pub mod parser;
pub mod schema;

pub use ast::{Node, Operator, Spanned, Value};
pub use diagnostics::{Diagnostic, Severity, render_diagnostics};
pub use error::{ScriptError, ScriptResult};
pub use schema::{
    MapEntry, Schema, Structured, color_attachment, map_nodes, map_nodes_with_diagnostics,
};

/// Lex and parse a source string into its top-level statements.
///
/// Lex and parse errors are both collected; if there are any, the file is
/// rejected as a whole.
pub fn parse_source(source: &str) -> ScriptResult<Vec<Node>> {
    let (tokens, lex_errors) = lexer::lex(source);

    let mut diagnostics: Vec<Diagnostic> = lex_errors
        .into_iter()
        .map(|e| Diagnostic::error(e.span, e.message))
        .collect();

    match parser::parse(&tokens) {
        Ok(nodes) if diagnostics.is_empty() => Ok(nodes),
        Ok(_) => Err(ScriptError::Syntax { diagnostics }),
        Err(parse_errors) => {
            diagnostics.extend(
                parse_errors
                    .into_iter()
                    .map(|e| Diagnostic::error(e.span, e.message)),
            );
            diagnostics.sort_by_key(|d| d.span.start);
            Err(ScriptError::Syntax { diagnostics })
        }
    }
}

/// Parse a source string and map it onto `schema`.
pub fn parse_structured(source: &str, schema: &Schema) -> ScriptResult<Structured> {
    let nodes = parse_source(source)?;
    map_nodes(&nodes, schema)
}
