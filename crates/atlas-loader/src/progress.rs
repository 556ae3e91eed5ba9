use std::fmt;
use std::sync::Arc;

/// A load stage, reported as it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// A file is about to be read.
    ReadingFile(String),
    /// A folder was listed and its files are about to load.
    LoadingFolder {
        /// The folder.
        folder: String,
        /// Number of files found.
        files: usize,
    },
    /// Country definition files are about to load.
    LoadingCountries {
        /// Number of tags in the tag lists.
        tags: usize,
    },
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadingFile(file) => write!(f, "reading {file}"),
            Self::LoadingFolder { folder, files } => write!(f, "loading {files} file(s) in {folder}"),
            Self::LoadingCountries { tags } => write!(f, "loading {tags} country definition(s)"),
        }
    }
}

type Callback = dyn Fn(&Progress) + Send + Sync;

/// Receives [`Progress`] events from a loader and everything it creates.
///
/// The default reporter discards events. Clones share one callback.
#[derive(Clone, Default)]
pub struct ProgressReporter(Option<Arc<Callback>>);

impl ProgressReporter {
    /// Report through `callback`.
    pub fn new(callback: impl Fn(&Progress) + Send + Sync + 'static) -> Self {
        let callback: Arc<Callback> = Arc::new(callback);
        Self(Some(callback))
    }

    /// Pass `progress` to the callback, if there is one.
    pub fn report(&self, progress: Progress) {
        if let Some(callback) = &self.0 {
            callback(&progress);
        }
    }
}

impl fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ProgressReporter")
            .field(&self.0.as_ref().map(|_| "callback"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn default_reporter_discards() {
        ProgressReporter::default().report(Progress::ReadingFile("a.txt".into()));
    }

    #[test]
    fn clones_share_the_callback() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let reporter = ProgressReporter::new(move |p| sink.lock().unwrap().push(p.to_string()));

        reporter.report(Progress::ReadingFile("a.txt".into()));
        reporter.clone().report(Progress::LoadingCountries { tags: 2 });

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["reading a.txt", "loading 2 country definition(s)"]
        );
    }
}
