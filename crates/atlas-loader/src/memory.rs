//! An in-memory [`ContentSource`], for unsaved editor buffers and tests.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use crate::source::{ContentSource, StalenessToken};

#[derive(Debug, Default)]
struct Tree {
    files: BTreeMap<String, MemoryFile>,
    folders: BTreeSet<String>,
    next_revision: u64,
    reads: HashMap<String, usize>,
}

#[derive(Debug)]
struct MemoryFile {
    content: String,
    revision: u64,
}

/// A file tree held in memory.
///
/// Every write bumps a source-wide revision counter, so a file's token
/// changes whenever it is written, removed, or re-created. Reads are counted
/// per file.
#[derive(Debug, Default)]
pub struct MemorySource {
    tree: RwLock<Tree>,
    latency: Option<Duration>,
}

impl MemorySource {
    /// An empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file while building the source.
    pub fn with_file(self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.write(path, content);
        self
    }

    /// Make every read sleep first, so loads have a real suspension point.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Create or replace a file.
    pub fn write(&self, path: impl Into<String>, content: impl Into<String>) {
        let mut tree = self.tree.write().unwrap_or_else(PoisonError::into_inner);
        tree.next_revision += 1;
        let revision = tree.next_revision;
        tree.files.insert(
            path.into(),
            MemoryFile {
                content: content.into(),
                revision,
            },
        );
    }

    /// Remove a file. Returns whether it existed.
    pub fn remove(&self, path: &str) -> bool {
        let mut tree = self.tree.write().unwrap_or_else(PoisonError::into_inner);
        tree.next_revision += 1;
        tree.files.remove(path).is_some()
    }

    /// Register a folder so it can be listed while empty.
    pub fn create_folder(&self, folder: impl Into<String>) {
        let mut tree = self.tree.write().unwrap_or_else(PoisonError::into_inner);
        tree.folders.insert(folder.into());
    }

    /// How many times `path` has been read.
    pub fn reads(&self, path: &str) -> usize {
        let tree = self.tree.read().unwrap_or_else(PoisonError::into_inner);
        tree.reads.get(path).copied().unwrap_or(0)
    }

    /// Total reads across all files.
    pub fn total_reads(&self) -> usize {
        let tree = self.tree.read().unwrap_or_else(PoisonError::into_inner);
        tree.reads.values().sum()
    }
}

#[async_trait]
impl ContentSource for MemorySource {
    async fn list(&self, folder: &str) -> io::Result<Vec<String>> {
        let tree = self.tree.read().unwrap_or_else(PoisonError::into_inner);
        let prefix = format!("{}/", folder.trim_end_matches('/'));

        let mut exists = tree.folders.contains(folder.trim_end_matches('/'));
        let mut names = Vec::new();
        for path in tree.files.keys() {
            let Some(rest) = path.strip_prefix(&prefix) else {
                continue;
            };
            exists = true;
            if !rest.contains('/') {
                names.push(rest.to_string());
            }
        }

        if exists {
            Ok(names)
        } else {
            Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("folder {folder} not found"),
            ))
        }
    }

    async fn token_of(&self, file: &str) -> StalenessToken {
        let tree = self.tree.read().unwrap_or_else(PoisonError::into_inner);
        match tree.files.get(file) {
            Some(f) => StalenessToken::Revision(f.revision),
            None => StalenessToken::Missing,
        }
    }

    async fn read_to_string(&self, file: &str) -> io::Result<String> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let mut tree = self.tree.write().unwrap_or_else(PoisonError::into_inner);
        *tree.reads.entry(file.to_string()).or_default() += 1;
        match tree.files.get(file) {
            Some(f) => Ok(f.content.clone()),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{file} not found"),
            )),
        }
    }
}
