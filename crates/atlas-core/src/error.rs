/// Alias for `Result<T, AtlasError>`.
pub type AtlasResult<T> = Result<T, AtlasError>;

/// Errors raised while validating data-model values.
#[derive(Debug, thiserror::Error)]
pub enum AtlasError {
    /// A country tag is empty or contains whitespace.
    #[error("invalid country tag: \"{0}\"")]
    InvalidTag(String),

    /// A tag maps to an empty definition file path.
    #[error("country tag \"{0}\" has no definition file")]
    MissingDefinition(String),
}
