use std::fmt;

/// Source span as a byte range.
pub type Span = std::ops::Range<usize>;

/// An AST node with source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    /// The wrapped AST node.
    pub node: T,
    /// The byte range of this node in the source text.
    pub span: Span,
}

/// Operator between a key and its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `=`
    Eq,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `>=`
    Ge,
    /// `!=`
    Ne,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Eq => "=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Ne => "!=",
        };
        write!(f, "{s}")
    }
}

/// One statement: `key = value`, or a bare value inside a list block.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// The key, absent for bare list items such as the `200` in `{ 200 0 0 }`.
    pub key: Option<Spanned<String>>,
    /// The operator, present exactly when `key` is.
    pub op: Option<Operator>,
    /// The value.
    pub value: Spanned<Value>,
}

impl Node {
    /// The key text, if any.
    pub fn key_str(&self) -> Option<&str> {
        self.key.as_ref().map(|k| k.node.as_str())
    }
}

/// A value in a script file.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A bare word, number, or date.
    Atom(String),
    /// A quoted string.
    Str(String),
    /// A braced block of statements.
    Block(Vec<Node>),
    /// A block qualified by an atom, e.g. `rgb { 200 0 0 }`.
    Tagged {
        /// The qualifier, e.g. `rgb` or `hsv`.
        tag: String,
        /// The block contents.
        body: Vec<Node>,
    },
}

impl Value {
    /// The text of an atom or string value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Atom(s) | Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The statements of a plain or tagged block.
    pub fn as_block(&self) -> Option<&[Node]> {
        match self {
            Self::Block(body) | Self::Tagged { body, .. } => Some(body),
            _ => None,
        }
    }
}
