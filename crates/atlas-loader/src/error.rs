use atlas_script::ScriptError;

/// Result type for loader operations.
pub type LoaderResult<T> = Result<T, LoadError>;

/// Errors that escape a loader.
///
/// Leaf loaders of the country chain catch their own read and parse
/// failures, so in practice only listing and configuration errors reach
/// callers of the country loaders.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// A folder could not be listed in any content root.
    #[error("cannot list folder {folder}: {source}")]
    ListFolder {
        /// The folder, relative to the content roots.
        folder: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A file could not be read.
    #[error("cannot read {file}: {source}")]
    Read {
        /// The file, relative to the content roots.
        file: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A file was read but is not valid script, or does not fit its schema.
    #[error("{file}: {source}")]
    Script {
        /// The file, relative to the content roots.
        file: String,
        /// What went wrong.
        source: ScriptError,
    },

    /// A loader configuration file is malformed.
    #[error("invalid loader configuration: {0}")]
    Config(#[from] toml::de::Error),
}
