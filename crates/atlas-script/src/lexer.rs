use logos::Logos;
use std::fmt;

use crate::ast::Operator;

/// Token type for mod script files.
///
/// Numbers, dates, identifiers, and keywords such as `rgb` are all
/// `Token::Atom`; the schema mapper decides how to read them.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Left brace `{`.
    LBrace,
    /// Right brace `}`.
    RBrace,
    /// Assignment or comparison operator.
    Op(Operator),
    /// Double-quoted string literal, unescaped.
    Str(String),
    /// Bare word: identifier, number, date, path.
    Atom(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::Op(op) => write!(f, "{op}"),
            Token::Str(s) => write!(f, "\"{s}\""),
            Token::Atom(a) => write!(f, "{a}"),
        }
    }
}

/// Internal logos token. Converted to owned `Token` after lexing.
#[derive(Logos, Debug)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"#[^\n]*")]
#[logos(skip r"\x{FEFF}")]
enum RawToken {
    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("=")]
    Eq,

    #[token("<")]
    Lt,

    #[token(">")]
    Gt,

    #[token("<=")]
    Le,

    #[token(">=")]
    Ge,

    #[token("!=")]
    Ne,

    #[regex(r#""([^"\\]|\\.)*""#)]
    Str,

    #[regex(r##"[^\s{}=<>!"#\x{FEFF}]+"##)]
    Atom,
}

/// A lexer error with source location.
#[derive(Debug, Clone)]
pub struct LexError {
    /// Byte range of the erroneous input in the source.
    pub span: std::ops::Range<usize>,
    /// Human-readable description of the lexer error.
    pub message: String,
}

/// Lex source code into a sequence of `(Token, Span)` pairs.
///
/// Lexing continues past errors so the parser can still report on the rest
/// of the file.
pub fn lex(source: &str) -> (Vec<(Token, std::ops::Range<usize>)>, Vec<LexError>) {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut lexer = RawToken::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(raw) => {
                let token = match raw {
                    RawToken::LBrace => Token::LBrace,
                    RawToken::RBrace => Token::RBrace,
                    RawToken::Eq => Token::Op(Operator::Eq),
                    RawToken::Lt => Token::Op(Operator::Lt),
                    RawToken::Gt => Token::Op(Operator::Gt),
                    RawToken::Le => Token::Op(Operator::Le),
                    RawToken::Ge => Token::Op(Operator::Ge),
                    RawToken::Ne => Token::Op(Operator::Ne),
                    RawToken::Str => {
                        let slice = lexer.slice();
                        Token::Str(unescape(&slice[1..slice.len() - 1]))
                    }
                    RawToken::Atom => Token::Atom(lexer.slice().to_string()),
                };
                tokens.push((token, span));
            }
            Err(()) => {
                let message = if source[span.clone()].starts_with('"') {
                    "unterminated string literal".to_string()
                } else {
                    format!("unexpected character: {:?}", &source[span.clone()])
                };
                errors.push(LexError { span, message });
            }
        }
    }

    (tokens, errors)
}

/// Process escape sequences in a string literal.
///
/// Supports `\\`, `\n`, `\t`, `\"`. Unknown sequences are kept as-is.
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('\\') => out.push('\\'),
                Some('"') => out.push('"'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}
