use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::ast::*;
use crate::lexer::Token;

type Span = SimpleSpan;

/// Parse error with source span.
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Byte range of the offending input.
    pub span: std::ops::Range<usize>,
    /// Human-readable description.
    pub message: String,
}

fn spanned<T>(node: T, span: Span) -> Spanned<T> {
    Spanned {
        node,
        span: span.into_range(),
    }
}

/// Build the script-file parser.
///
/// A file is a list of statements; a block is the same list in braces, so
/// the whole grammar hangs off one recursive `statements` parser.
fn script_parser<'a, I>() -> impl Parser<'a, I, Vec<Node>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = Span>,
{
    let atom = select! { Token::Atom(a) => a }.labelled("word");
    let string = select! { Token::Str(s) => s }.labelled("string");
    let op = select! { Token::Op(op) => op }.labelled("operator");

    let statements = recursive(|statements| {
        let block = statements.delimited_by(just(Token::LBrace), just(Token::RBrace));

        let value = choice((
            block.clone().map(Value::Block),
            atom.clone()
                .then(block.or_not())
                .map(|(tag, body)| match body {
                    Some(body) => Value::Tagged { tag, body },
                    None => Value::Atom(tag),
                }),
            string.clone().map(Value::Str),
        ))
        .map_with(|v, e| spanned(v, e.span()))
        .labelled("value");

        let key = choice((atom.clone(), string.clone()))
            .map_with(|k, e| spanned(k, e.span()))
            .labelled("key");

        let keyed = key
            .then(op.clone())
            .then(value.clone())
            .map(|((key, op), value)| Node {
                key: Some(key),
                op: Some(op),
                value,
            });

        let bare = value.map(|value| Node {
            key: None,
            op: None,
            value,
        });

        choice((keyed, bare)).repeated().collect::<Vec<Node>>()
    });

    statements.then_ignore(end())
}

/// Parse a token stream into the file's top-level statements.
pub fn parse(tokens: &[(Token, std::ops::Range<usize>)]) -> Result<Vec<Node>, Vec<ParseError>> {
    let token_iter = tokens
        .iter()
        .map(|(tok, span)| (tok.clone(), Span::from(span.clone())));

    let len = tokens.last().map_or(0, |(_, s)| s.end);
    let eoi: Span = (len..len).into();
    let stream = Stream::from_iter(token_iter).map(eoi, |(t, s): (_, _)| (t, s));

    let (output, errors) = script_parser().parse(stream).into_output_errors();

    match output {
        Some(nodes) if errors.is_empty() => Ok(nodes),
        _ => Err(errors
            .into_iter()
            .map(|e| {
                let span = e.span();
                ParseError {
                    span: span.into_range(),
                    message: e.to_string(),
                }
            })
            .collect()),
    }
}
