use std::fmt;

use serde::{Deserialize, Serialize};

/// A diagnostic attached to a load. Warnings are informational: a load that
/// produces them still succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warning {
    /// Human-readable description.
    pub text: String,
    /// Map objects the warning is about.
    pub source: Vec<WarningSource>,
    /// Files the reader should look at.
    pub related_files: Vec<String>,
}

impl Warning {
    /// A warning with no sources and no related files.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: Vec::new(),
            related_files: Vec::new(),
        }
    }

    /// Attach a source object.
    pub fn with_source(mut self, source: WarningSource) -> Self {
        self.source.push(source);
        self
    }

    /// Attach a related file.
    pub fn with_related_file(mut self, file: impl Into<String>) -> Self {
        self.related_files.push(file.into());
        self
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// The map object a warning refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WarningSource {
    /// A province, identified by id when known and always by bitmap color.
    Province {
        /// Province id, absent for colors with no definition row.
        id: Option<u32>,
        /// Packed province color in the province bitmap.
        color: u32,
    },
    /// A state.
    State {
        /// State id.
        id: u32,
    },
    /// A strategic region.
    #[serde(rename = "strategicregion")]
    StrategicRegion {
        /// Strategic region id.
        id: u32,
    },
    /// A supply area.
    #[serde(rename = "supplyarea")]
    SupplyArea {
        /// Supply area id.
        id: u32,
    },
    /// A country, identified by tag.
    Country {
        /// Country tag.
        tag: String,
    },
}
