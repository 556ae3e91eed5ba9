use serde::{Deserialize, Serialize};

use crate::warning::Warning;

/// The value every loader produces: a result plus everything it was derived from.
///
/// `dependencies` lists every file read to produce `result`, directly or
/// through a sub-loader. Entries may repeat; order follows the order in which
/// constituent results were merged. A folder-level merge may stand in for its
/// files with a single `"<folder>/*"` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadResult<T> {
    /// The loaded value.
    pub result: T,
    /// Files (or folder wildcards) this result depends on.
    pub dependencies: Vec<String>,
    /// Diagnostics collected while loading. They never abort a load.
    pub warnings: Vec<Warning>,
}

impl<T> LoadResult<T> {
    /// A result with no dependencies and no warnings.
    pub fn new(result: T) -> Self {
        Self {
            result,
            dependencies: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Append a dependency.
    pub fn with_dependency(mut self, dependency: impl Into<String>) -> Self {
        self.dependencies.push(dependency.into());
        self
    }

    /// Append a warning.
    pub fn with_warning(mut self, warning: Warning) -> Self {
        self.warnings.push(warning);
        self
    }

    /// Transform the result, keeping dependencies and warnings.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> LoadResult<U> {
        LoadResult {
            result: f(self.result),
            dependencies: self.dependencies,
            warnings: self.warnings,
        }
    }
}

/// Concatenate the dependencies of several results, in argument order.
pub fn merge_dependencies<'a, I, T>(results: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a LoadResult<T>>,
    T: 'a,
{
    results
        .into_iter()
        .flat_map(|r| r.dependencies.iter().cloned())
        .collect()
}

/// Concatenate the warnings of several results, in argument order.
pub fn merge_warnings<'a, I, T>(results: I) -> Vec<Warning>
where
    I: IntoIterator<Item = &'a LoadResult<T>>,
    T: 'a,
{
    results
        .into_iter()
        .flat_map(|r| r.warnings.iter().cloned())
        .collect()
}
