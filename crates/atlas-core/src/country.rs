use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color::format_color;
use crate::error::{AtlasError, AtlasResult};

/// Maps a country tag to the file that defines it, relative to the
/// country-file root (e.g. `countries/England.txt`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    /// The country identifier, e.g. `ENG`.
    pub tag: String,
    /// The definition file path.
    pub file: String,
}

impl Tag {
    /// Build a tag entry, rejecting empty or whitespace-bearing tags and empty paths.
    pub fn new(tag: impl Into<String>, file: impl Into<String>) -> AtlasResult<Self> {
        let tag = tag.into();
        let file = file.into();
        if tag.is_empty() || tag.chars().any(char::is_whitespace) {
            return Err(AtlasError::InvalidTag(tag));
        }
        if file.trim().is_empty() {
            return Err(AtlasError::MissingDefinition(tag));
        }
        Ok(Self { tag, file })
    }
}

/// A country as shown on the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    /// The country identifier.
    pub tag: String,
    /// Packed `0xRRGGBB` map color.
    pub color: u32,
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tag, format_color(self.color))
    }
}
