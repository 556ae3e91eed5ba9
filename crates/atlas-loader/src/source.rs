//! Where loaders get their bytes: listing, staleness tokens, and reads.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;

/// Read access to a tree of content files addressed by `/`-separated
/// relative paths.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Names of the regular files directly inside `folder`, in a stable
    /// order. Fails if the folder does not exist.
    async fn list(&self, folder: &str) -> io::Result<Vec<String>>;

    /// The current staleness token of `file`. Equal tokens mean the content
    /// has not changed between the two queries. A missing file has a token
    /// too, so appearing and disappearing both count as changes.
    async fn token_of(&self, file: &str) -> StalenessToken;

    /// The full text of `file`.
    async fn read_to_string(&self, file: &str) -> io::Result<String>;
}

/// Which content root served a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// The mod being edited.
    Mod,
    /// The base game install.
    Game,
}

/// An opaque comparable marker of a file's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StalenessToken {
    /// Held by loaders that have never loaded. Sources never return it.
    NeverLoaded,
    /// The file does not exist in any root.
    Missing,
    /// File metadata from disk.
    Disk {
        /// The root the file was found in.
        origin: Origin,
        /// Last modification time, when the platform reports one.
        modified: Option<SystemTime>,
        /// Length in bytes.
        len: u64,
    },
    /// A revision counter from an in-memory source.
    Revision(u64),
}

/// A mod directory overlaid on a game install.
///
/// A file present in the mod shadows the game's copy of the same path.
/// Folder listings are the union of both roots.
#[derive(Debug, Clone, Default)]
pub struct ModDirectory {
    mod_root: Option<PathBuf>,
    game_root: Option<PathBuf>,
}

impl ModDirectory {
    /// A source with no roots. Every file is missing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the mod root.
    pub fn with_mod_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.mod_root = Some(root.into());
        self
    }

    /// Set the game root.
    pub fn with_game_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.game_root = Some(root.into());
        self
    }

    fn roots(&self) -> impl Iterator<Item = (Origin, &Path)> {
        self.mod_root
            .iter()
            .map(|p| (Origin::Mod, p.as_path()))
            .chain(self.game_root.iter().map(|p| (Origin::Game, p.as_path())))
    }

    /// The root serving `file` and the file's absolute path, mod first.
    pub async fn resolve(&self, file: &str) -> Option<(Origin, PathBuf)> {
        for (origin, root) in self.roots() {
            let path = root.join(file);
            if tokio::fs::metadata(&path).await.is_ok_and(|m| m.is_file()) {
                return Some((origin, path));
            }
        }
        None
    }
}

#[async_trait]
impl ContentSource for ModDirectory {
    async fn list(&self, folder: &str) -> io::Result<Vec<String>> {
        let mut names = BTreeSet::new();
        let mut found = false;

        for (_, root) in self.roots() {
            let mut entries = match tokio::fs::read_dir(root.join(folder)).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e),
            };
            found = true;
            while let Some(entry) = entries.next_entry().await? {
                if !entry.file_type().await?.is_file() {
                    continue;
                }
                let name = entry.file_name();
                match name.to_str() {
                    Some(name) => {
                        names.insert(name.to_string());
                    }
                    None => tracing::warn!(
                        folder,
                        name = %name.to_string_lossy(),
                        "skipping file whose name is not valid UTF-8"
                    ),
                }
            }
        }

        if !found {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("folder {folder} not found in mod or game"),
            ));
        }
        Ok(names.into_iter().collect())
    }

    async fn token_of(&self, file: &str) -> StalenessToken {
        let Some((origin, path)) = self.resolve(file).await else {
            return StalenessToken::Missing;
        };
        match tokio::fs::metadata(&path).await {
            Ok(meta) => StalenessToken::Disk {
                origin,
                modified: meta.modified().ok(),
                len: meta.len(),
            },
            Err(_) => StalenessToken::Missing,
        }
    }

    async fn read_to_string(&self, file: &str) -> io::Result<String> {
        match self.resolve(file).await {
            Some((_, path)) => tokio::fs::read_to_string(path).await,
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{file} not found in mod or game"),
            )),
        }
    }
}
