use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use atlas_core::LoadResult;
use futures::future::join_all;

use crate::error::{LoadError, LoaderResult};
use crate::file::{FileLoader, FileParse};
use crate::loader::{LoadCache, Loader};
use crate::progress::{Progress, ProgressReporter};
use crate::source::ContentSource;

/// One file's result inside a folder merge.
#[derive(Debug)]
pub struct FileResult<T> {
    /// Path of the file, relative to the content roots.
    pub file: String,
    /// What its loader produced.
    pub result: Arc<LoadResult<T>>,
}

/// The folder-specific half of a [`FolderLoader`].
pub trait FolderMerge: Send + Sync {
    /// Parser used for every file in the folder.
    type File: FileParse;
    /// The merged value.
    type Output: Send + Sync + 'static;

    /// Parser for a newly seen file.
    fn file_parser(&self, file: &str) -> Self::File;

    /// Reduce per-file results, given in listing order, to one result.
    fn merge_files(
        &self,
        folder: &str,
        files: &[FileResult<<Self::File as FileParse>::Output>],
        force: bool,
    ) -> LoaderResult<LoadResult<Self::Output>>;
}

/// Dependency entry standing for every file in `folder`.
pub fn folder_dependency(folder: &str) -> String {
    format!("{}/*", folder.trim_end_matches('/'))
}

/// A loader bound to a folder, with one [`FileLoader`] per file.
///
/// Sub-loaders are keyed by file name and kept across loads, so only the
/// files that changed are read again.
pub struct FolderLoader<M: FolderMerge> {
    source: Arc<dyn ContentSource>,
    folder: String,
    merge: M,
    file_count: usize,
    sub_loaders: BTreeMap<String, FileLoader<M::File>>,
    progress: ProgressReporter,
    cache: LoadCache<M::Output>,
}

impl<M: FolderMerge> FolderLoader<M> {
    /// Bind `merge` to `folder`.
    pub fn new(source: Arc<dyn ContentSource>, folder: impl Into<String>, merge: M) -> Self {
        Self {
            source,
            folder: folder.into(),
            merge,
            file_count: 0,
            sub_loaders: BTreeMap::new(),
            progress: ProgressReporter::default(),
            cache: LoadCache::default(),
        }
    }

    /// Report this folder's stages, and those of its file loaders, to
    /// `progress`.
    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.sub_loaders = std::mem::take(&mut self.sub_loaders)
            .into_iter()
            .map(|(name, loader)| (name, loader.with_progress(progress.clone())))
            .collect();
        self.progress = progress;
        self
    }

    /// The bound folder.
    pub fn folder(&self) -> &str {
        &self.folder
    }

    /// Names of the files that currently have a sub-loader.
    pub fn tracked_files(&self) -> impl Iterator<Item = &str> {
        self.sub_loaders.keys().map(String::as_str)
    }

    async fn list(&self) -> LoaderResult<Vec<String>> {
        self.source
            .list(&self.folder)
            .await
            .map_err(|source| LoadError::ListFolder {
                folder: self.folder.clone(),
                source,
            })
    }
}

impl<M: FolderMerge> fmt::Debug for FolderLoader<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FolderLoader")
            .field("folder", &self.folder)
            .field("files", &self.sub_loaders.keys().collect::<Vec<_>>())
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<M: FolderMerge> Loader for FolderLoader<M> {
    type Output = M::Output;

    async fn should_reload(&self) -> LoaderResult<bool> {
        let files = self.list().await?;
        if files.len() != self.file_count || files.iter().any(|f| !self.sub_loaders.contains_key(f)) {
            return Ok(true);
        }

        let checks = join_all(self.sub_loaders.values().map(|l| l.should_reload())).await;
        for stale in checks {
            if stale? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn load_impl(&mut self, force: bool) -> LoaderResult<LoadResult<M::Output>> {
        let files = self.list().await?;

        let mut previous = std::mem::take(&mut self.sub_loaders);
        let mut current: Vec<(String, FileLoader<M::File>)> = Vec::with_capacity(files.len());
        for name in files {
            let loader = match previous.remove(&name) {
                Some(loader) => loader,
                None => FileLoader::new(
                    Arc::clone(&self.source),
                    crate::join_path(&self.folder, &name),
                    self.merge.file_parser(&name),
                )
                .with_progress(self.progress.clone()),
            };
            current.push((name, loader));
        }
        tracing::debug!(
            folder = %self.folder,
            files = current.len(),
            dropped = previous.len(),
            "loading folder"
        );
        drop(previous);
        self.progress.report(Progress::LoadingFolder {
            folder: self.folder.clone(),
            files: current.len(),
        });

        let results = join_all(current.iter_mut().map(|(_, l)| l.load(force))).await;
        let paths: Vec<String> = current.iter().map(|(_, l)| l.file().to_string()).collect();

        // Keep the sub-loaders even if one of them failed.
        self.file_count = current.len();
        self.sub_loaders = current.into_iter().collect();

        let merged = paths
            .into_iter()
            .zip(results)
            .map(|(file, result)| Ok(FileResult { file, result: result? }))
            .collect::<LoaderResult<Vec<_>>>()?;

        self.merge.merge_files(&self.folder, &merged, force)
    }

    fn cache(&self) -> &LoadCache<M::Output> {
        &self.cache
    }

    fn cache_mut(&mut self) -> &mut LoadCache<M::Output> {
        &mut self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::Loaded;
    use crate::memory::MemorySource;
    use atlas_core::{Warning, merge_warnings};

    struct Text;

    #[async_trait]
    impl FileParse for Text {
        type Output = String;

        async fn load_from_file(
            &self,
            source: &dyn ContentSource,
            file: &str,
            warnings: &mut Vec<Warning>,
            _force: bool,
        ) -> LoaderResult<Loaded<String>> {
            let text = source
                .read_to_string(file)
                .await
                .map_err(|source| LoadError::Read {
                    file: file.to_string(),
                    source,
                })?;
            if text.is_empty() {
                warnings.push(Warning::new(format!("{file} is empty")));
            }
            Ok(Loaded::Raw(text))
        }
    }

    /// Joins file contents with `+`.
    struct Concat;

    impl FolderMerge for Concat {
        type File = Text;
        type Output = String;

        fn file_parser(&self, _file: &str) -> Text {
            Text
        }

        fn merge_files(
            &self,
            folder: &str,
            files: &[FileResult<String>],
            _force: bool,
        ) -> LoaderResult<LoadResult<String>> {
            let joined = files
                .iter()
                .map(|f| f.result.result.as_str())
                .collect::<Vec<_>>()
                .join("+");
            Ok(LoadResult {
                result: joined,
                dependencies: vec![folder_dependency(folder)],
                warnings: merge_warnings(files.iter().map(|f| f.result.as_ref())),
            })
        }
    }

    fn tree() -> Arc<MemorySource> {
        Arc::new(
            MemorySource::new()
                .with_file("dir/b.txt", "b")
                .with_file("dir/a.txt", "a")
                .with_file("dir/c.txt", "c"),
        )
    }

    #[tokio::test]
    async fn merges_in_listing_order() {
        let mut loader = FolderLoader::new(tree(), "dir", Concat);
        let result = loader.load(false).await.unwrap();
        assert_eq!(result.result, "a+b+c");
        assert_eq!(result.dependencies, vec!["dir/*"]);
    }

    #[tokio::test]
    async fn unchanged_folder_is_not_stale() {
        let source = tree();
        let mut loader = FolderLoader::new(source.clone(), "dir", Concat);
        let first = loader.load(false).await.unwrap();
        assert!(!loader.should_reload().await.unwrap());
        assert!(Arc::ptr_eq(&first, &loader.load(false).await.unwrap()));
        assert_eq!(source.total_reads(), 3);
    }

    #[tokio::test]
    async fn edit_rereads_only_that_file() {
        let source = tree();
        let mut loader = FolderLoader::new(source.clone(), "dir", Concat);
        loader.load(false).await.unwrap();

        source.write("dir/b.txt", "B");
        assert!(loader.should_reload().await.unwrap());
        assert_eq!(loader.load(false).await.unwrap().result, "a+B+c");
        assert_eq!(source.reads("dir/a.txt"), 1);
        assert_eq!(source.reads("dir/b.txt"), 2);
        assert_eq!(source.reads("dir/c.txt"), 1);
    }

    #[tokio::test]
    async fn removed_file_drops_its_loader() {
        let source = tree();
        let mut loader = FolderLoader::new(source.clone(), "dir", Concat);
        loader.load(false).await.unwrap();

        source.remove("dir/b.txt");
        assert!(loader.should_reload().await.unwrap());
        assert_eq!(loader.load(false).await.unwrap().result, "a+c");
        assert_eq!(loader.tracked_files().collect::<Vec<_>>(), vec!["a.txt", "c.txt"]);
    }

    #[tokio::test]
    async fn added_file_gets_one_new_loader() {
        let source = tree();
        let mut loader = FolderLoader::new(source.clone(), "dir", Concat);
        loader.load(false).await.unwrap();

        source.write("dir/0.txt", "z");
        assert!(loader.should_reload().await.unwrap());
        assert_eq!(loader.load(false).await.unwrap().result, "z+a+b+c");
        assert_eq!(loader.tracked_files().count(), 4);
        assert_eq!(source.reads("dir/0.txt"), 1);
        assert_eq!(source.reads("dir/a.txt"), 1);
    }

    #[tokio::test]
    async fn renamed_file_with_same_count_is_stale() {
        let source = tree();
        let mut loader = FolderLoader::new(source.clone(), "dir", Concat);
        loader.load(false).await.unwrap();

        source.remove("dir/c.txt");
        source.write("dir/d.txt", "d");
        assert!(loader.should_reload().await.unwrap());
        assert_eq!(loader.load(false).await.unwrap().result, "a+b+d");
    }

    #[tokio::test]
    async fn force_reaches_sub_loaders() {
        let source = tree();
        let mut loader = FolderLoader::new(source.clone(), "dir", Concat);
        loader.load(false).await.unwrap();
        loader.load(true).await.unwrap();
        assert_eq!(source.total_reads(), 6);
    }

    #[tokio::test]
    async fn warnings_follow_file_order() {
        let source = Arc::new(
            MemorySource::new()
                .with_file("dir/b.txt", "")
                .with_file("dir/a.txt", ""),
        );
        let mut loader = FolderLoader::new(source, "dir", Concat);
        let result = loader.load(false).await.unwrap();
        let texts: Vec<_> = result.warnings.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["dir/a.txt is empty", "dir/b.txt is empty"]);
    }

    #[tokio::test]
    async fn missing_folder_propagates_and_keeps_cache() {
        let source = tree();
        let mut loader = FolderLoader::new(source.clone(), "dir", Concat);
        let good = loader.load(false).await.unwrap();

        for file in ["dir/a.txt", "dir/b.txt", "dir/c.txt"] {
            source.remove(file);
        }
        assert!(matches!(
            loader.load(false).await,
            Err(LoadError::ListFolder { .. })
        ));
        assert!(Arc::ptr_eq(&loader.cached().unwrap(), &good));
    }

    #[tokio::test]
    async fn abandoned_load_is_redone() {
        let source = Arc::new(
            MemorySource::new()
                .with_latency(std::time::Duration::from_millis(40))
                .with_file("dir/a.txt", "a")
                .with_file("dir/b.txt", "b"),
        );
        let mut loader = FolderLoader::new(source.clone(), "dir", Concat);
        let good = loader.load(false).await.unwrap();

        source.write("dir/b.txt", "B");
        let abandoned =
            tokio::time::timeout(std::time::Duration::from_millis(5), loader.load(false)).await;
        assert!(abandoned.is_err());
        assert!(Arc::ptr_eq(&loader.cached().unwrap(), &good));

        assert!(loader.should_reload().await.unwrap());
        assert_eq!(loader.load(false).await.unwrap().result, "a+B");
    }

    #[test]
    fn folder_dependency_is_wildcard() {
        assert_eq!(folder_dependency("common/country_tags"), "common/country_tags/*");
        assert_eq!(folder_dependency("common/country_tags/"), "common/country_tags/*");
    }
}
