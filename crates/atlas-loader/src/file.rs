use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use atlas_core::{LoadResult, Warning};

use crate::error::LoaderResult;
use crate::loader::{LoadCache, Loader};
use crate::progress::{Progress, ProgressReporter};
use crate::source::{ContentSource, StalenessToken};

/// What a [`FileParse`] step hands back.
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded<T> {
    /// A bare value. It is wrapped with the file as its only dependency.
    Raw(T),
    /// A value with its own dependencies. The file is appended to them.
    Full(LoadResult<T>),
}

/// The file-specific half of a [`FileLoader`].
#[async_trait]
pub trait FileParse: Send + Sync {
    /// The value parsed from one file.
    type Output: Send + Sync + 'static;

    /// Read and interpret `file`. Warnings pushed onto `warnings` end up in
    /// the loader's result.
    async fn load_from_file(
        &self,
        source: &dyn ContentSource,
        file: &str,
        warnings: &mut Vec<Warning>,
        force: bool,
    ) -> LoaderResult<Loaded<Self::Output>>;
}

/// A loader bound to one file. Stale when the file's token changes.
pub struct FileLoader<P: FileParse> {
    source: Arc<dyn ContentSource>,
    file: String,
    parser: P,
    token: StalenessToken,
    progress: ProgressReporter,
    cache: LoadCache<P::Output>,
}

impl<P: FileParse> FileLoader<P> {
    /// Bind `parser` to `file`.
    pub fn new(source: Arc<dyn ContentSource>, file: impl Into<String>, parser: P) -> Self {
        Self {
            source,
            file: file.into(),
            parser,
            token: StalenessToken::NeverLoaded,
            progress: ProgressReporter::default(),
            cache: LoadCache::default(),
        }
    }

    /// Report each read to `progress`.
    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    /// The bound file.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// The file-specific parser.
    pub fn parser(&self) -> &P {
        &self.parser
    }
}

impl<P: FileParse> fmt::Debug for FileLoader<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileLoader")
            .field("file", &self.file)
            .field("token", &self.token)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<P: FileParse> Loader for FileLoader<P> {
    type Output = P::Output;

    async fn should_reload(&self) -> LoaderResult<bool> {
        Ok(self.source.token_of(&self.file).await != self.token)
    }

    async fn load_impl(&mut self, force: bool) -> LoaderResult<LoadResult<P::Output>> {
        // Taken before the read: an edit landing mid-read is caught next time.
        let token = self.source.token_of(&self.file).await;
        tracing::debug!(file = %self.file, force, "loading file");
        self.progress.report(Progress::ReadingFile(self.file.clone()));

        let mut warnings = Vec::new();
        let loaded = self
            .parser
            .load_from_file(self.source.as_ref(), &self.file, &mut warnings, force)
            .await?;
        self.token = token;

        Ok(match loaded {
            Loaded::Raw(result) => LoadResult {
                result,
                dependencies: vec![self.file.clone()],
                warnings,
            },
            Loaded::Full(mut result) => {
                result.dependencies.push(self.file.clone());
                result.warnings.extend(warnings);
                result
            }
        })
    }

    fn cache(&self) -> &LoadCache<P::Output> {
        &self.cache
    }

    fn cache_mut(&mut self) -> &mut LoadCache<P::Output> {
        &mut self.cache
    }
}
