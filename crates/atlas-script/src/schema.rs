//! Declarative mapping from parsed script statements to structured values.
//!
//! A [`Schema`] describes the shape a file is expected to have; [`map_nodes`]
//! walks the AST and keeps whatever fits. Mismatched values are dropped, so
//! a half-broken file still yields its good parts;
//! [`map_nodes_with_diagnostics`] reports each one as a warning.

use std::collections::{BTreeMap, HashMap};

use atlas_core::ColorAttachment;

use crate::ast::{Node, Span, Value};
use crate::diagnostics::Diagnostic;
use crate::error::{ScriptError, ScriptResult};

/// The expected shape of a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    /// An atom or quoted string.
    String,
    /// An atom that parses as a number.
    Number,
    /// A block of bare items, e.g. `{ 200 0 0 }`.
    Enum,
    /// A value with an optional atom qualifier, e.g. `rgb { 200 0 0 }`.
    Attachment(Box<Schema>),
    /// Arbitrary keys, every value of the inner shape.
    Map(Box<Schema>),
    /// Named fields, each with its own shape. Keys match case-insensitively.
    Object(Vec<(&'static str, Schema)>),
}

/// A value shaped by a [`Schema`].
#[derive(Debug, Clone, PartialEq)]
pub enum Structured {
    /// From [`Schema::String`].
    String(String),
    /// From [`Schema::Number`].
    Number(f64),
    /// From [`Schema::Enum`]: the bare items in file order.
    Enum(Vec<String>),
    /// From [`Schema::Attachment`].
    Attachment {
        /// The qualifier atom, if one was written.
        attachment: Option<String>,
        /// The qualified value.
        value: Box<Structured>,
    },
    /// From [`Schema::Map`]: entries in order of first appearance.
    Map(Vec<MapEntry>),
    /// From [`Schema::Object`]: fields that were present and well-formed,
    /// keyed by their schema name.
    Object(BTreeMap<String, Structured>),
}

/// One entry of a [`Structured::Map`].
#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry {
    /// The key as written.
    pub key: String,
    /// The mapped value.
    pub value: Structured,
}

impl Structured {
    /// The text of a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The entries of a map value.
    pub fn as_map(&self) -> Option<&[MapEntry]> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// A field of an object value.
    pub fn field(&self, name: &str) -> Option<&Structured> {
        match self {
            Self::Object(fields) => fields.get(name),
            _ => None,
        }
    }

    /// The value stored under `key` in a map value.
    pub fn get(&self, key: &str) -> Option<&Structured> {
        self.as_map()?
            .iter()
            .find(|e| e.key == key)
            .map(|e| &e.value)
    }
}

/// Map a file's top-level statements onto `schema`.
///
/// The file root is treated as a block. Fails only if the root cannot take
/// the requested shape at all (a file is never a single string or number).
pub fn map_nodes(nodes: &[Node], schema: &Schema) -> ScriptResult<Structured> {
    map_nodes_with_diagnostics(nodes, schema).map(|(value, _)| value)
}

/// Like [`map_nodes`], also returning a warning for every value that was
/// skipped because it did not fit, in source order.
pub fn map_nodes_with_diagnostics(
    nodes: &[Node],
    schema: &Schema,
) -> ScriptResult<(Structured, Vec<Diagnostic>)> {
    let mut mapper = Mapper::default();
    let value = mapper
        .block(None, nodes, schema)
        .ok_or_else(|| ScriptError::Schema {
            expected: describe(schema).to_string(),
        })?;
    let mut diagnostics = mapper.diagnostics;
    diagnostics.sort_by_key(|d| d.span.start);
    Ok((value, diagnostics))
}

#[derive(Default)]
struct Mapper {
    diagnostics: Vec<Diagnostic>,
}

impl Mapper {
    fn skip(&mut self, span: Span, message: impl Into<String>, label: impl Into<String>) {
        self.diagnostics
            .push(Diagnostic::warning(span, message).with_label(label));
    }

    fn value(&mut self, value: &Value, schema: &Schema) -> Option<Structured> {
        match value {
            Value::Atom(text) => match schema {
                Schema::String => Some(Structured::String(text.clone())),
                Schema::Number => text.parse().ok().map(Structured::Number),
                Schema::Enum => Some(Structured::Enum(vec![text.clone()])),
                Schema::Attachment(inner) => Some(Structured::Attachment {
                    attachment: None,
                    value: Box::new(self.value(value, inner)?),
                }),
                Schema::Map(_) | Schema::Object(_) => None,
            },
            Value::Str(text) => match schema {
                Schema::String => Some(Structured::String(text.clone())),
                _ => None,
            },
            Value::Block(body) => self.block(None, body, schema),
            Value::Tagged { tag, body } => self.block(Some(tag), body, schema),
        }
    }

    fn block(&mut self, tag: Option<&String>, body: &[Node], schema: &Schema) -> Option<Structured> {
        match schema {
            Schema::String | Schema::Number => None,
            Schema::Enum => {
                let mut items = Vec::new();
                for node in body {
                    match (&node.key, node.value.node.as_text()) {
                        (None, Some(text)) => items.push(text.to_string()),
                        (Some(key), _) => self.skip(
                            key.span.start..node.value.span.end,
                            format!("`{}` is ignored inside a list", key.node),
                            "expected a bare item",
                        ),
                        (None, None) => self.skip(
                            node.value.span.clone(),
                            "nested block is ignored inside a list",
                            "expected a bare item",
                        ),
                    }
                }
                Some(Structured::Enum(items))
            }
            Schema::Attachment(inner) => Some(Structured::Attachment {
                attachment: tag.cloned(),
                value: Box::new(self.block(None, body, inner)?),
            }),
            Schema::Map(inner) => {
                let mut entries: Vec<MapEntry> = Vec::new();
                let mut index: HashMap<&str, usize> = HashMap::new();
                for node in body {
                    let Some(key) = &node.key else {
                        self.skip(
                            node.value.span.clone(),
                            "value without a key is ignored",
                            "expected `key = value`",
                        );
                        continue;
                    };
                    let Some(value) = self.value(&node.value.node, inner) else {
                        self.skip(
                            node.value.span.clone(),
                            format!("value of `{}` is ignored", key.node),
                            format!("expected {}", describe(inner)),
                        );
                        continue;
                    };
                    match index.get(key.node.as_str()) {
                        Some(&i) => {
                            self.skip(
                                key.span.clone(),
                                format!("`{}` is set more than once", key.node),
                                "this value replaces the earlier one",
                            );
                            entries[i].value = value;
                        }
                        None => {
                            index.insert(key.node.as_str(), entries.len());
                            entries.push(MapEntry {
                                key: key.node.clone(),
                                value,
                            });
                        }
                    }
                }
                Some(Structured::Map(entries))
            }
            Schema::Object(fields) => {
                let mut out = BTreeMap::new();
                for node in body {
                    let Some(key) = &node.key else {
                        continue;
                    };
                    let Some((name, field_schema)) = fields
                        .iter()
                        .find(|(name, _)| key.node.eq_ignore_ascii_case(name))
                    else {
                        continue;
                    };
                    match self.value(&node.value.node, field_schema) {
                        Some(value) => {
                            out.insert((*name).to_string(), value);
                        }
                        None => self.skip(
                            node.value.span.clone(),
                            format!("value of `{}` is ignored", key.node),
                            format!("expected {}", describe(field_schema)),
                        ),
                    }
                }
                Some(Structured::Object(out))
            }
        }
    }
}

fn describe(schema: &Schema) -> &'static str {
    match schema {
        Schema::String => "string",
        Schema::Number => "number",
        Schema::Enum => "enum",
        Schema::Attachment(_) => "attachment",
        Schema::Map(_) => "map",
        Schema::Object(_) => "object",
    }
}

/// Read an attachment-of-enum as a color. Channels that do not parse as
/// numbers become `NaN`.
pub fn color_attachment(value: &Structured) -> Option<ColorAttachment> {
    let Structured::Attachment { attachment, value } = value else {
        return None;
    };
    let Structured::Enum(items) = value.as_ref() else {
        return None;
    };
    Some(ColorAttachment {
        space: attachment.clone(),
        channels: items
            .iter()
            .map(|s| s.parse::<f64>().unwrap_or(f64::NAN))
            .collect(),
    })
}
