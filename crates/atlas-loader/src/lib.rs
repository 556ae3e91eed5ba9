//! Incremental, dependency-tracked loading of mod content.
//!
//! A [`Loader`] memoizes an asynchronous computation and recomputes it only
//! when its inputs changed. [`FileLoader`] watches one file, [`FolderLoader`]
//! fans out over a folder of files, and [`CountriesLoader`] composes both
//! into the country list. Content comes from a [`ContentSource`]: a
//! [`ModDirectory`] on disk or a [`MemorySource`].

/// File layout of the country chain.
pub mod config;
pub mod countries;
/// Errors that escape a load.
pub mod error;
/// Single-file loaders.
pub mod file;
/// Folder loaders with per-file caching.
pub mod folder;
/// The `Loader` trait and its shared wrapper.
pub mod loader;
pub mod memory;
/// Load stage callbacks.
pub mod progress;
/// Bridge from content sources to the script reader.
pub mod script;
pub mod source;

pub use config::LoaderConfig;
pub use countries::{
    ColorOverrides, ColorsLoader, CountriesLoader, CountryLoader, CountryTags, CountryTagsLoader,
    apply_color_overrides, colors_file_schema, country_file_schema, country_tags_schema,
};
pub use error::{LoadError, LoaderResult};
pub use file::{FileLoader, FileParse, Loaded};
pub use folder::{FileResult, FolderLoader, FolderMerge, folder_dependency};
pub use loader::{LoadCache, Loader, SharedLoader};
pub use memory::MemorySource;
pub use progress::{Progress, ProgressReporter};
pub use script::read_structured;
pub use source::{ContentSource, ModDirectory, Origin, StalenessToken};

/// Join a relative path onto a folder with `/`.
pub(crate) fn join_path(folder: &str, file: &str) -> String {
    let folder = folder.trim_end_matches('/');
    if folder.is_empty() {
        file.to_string()
    } else {
        format!("{folder}/{file}")
    }
}
