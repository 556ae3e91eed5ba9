use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use atlas_core::LoadResult;
use tokio::sync::Mutex;

use crate::error::LoaderResult;

/// The last successful result of a loader.
pub struct LoadCache<T> {
    value: Option<Arc<LoadResult<T>>>,
}

impl<T> LoadCache<T> {
    /// The cached result, if any.
    pub fn get(&self) -> Option<Arc<LoadResult<T>>> {
        self.value.clone()
    }

    /// Replace the cached result.
    pub fn store(&mut self, value: Arc<LoadResult<T>>) {
        self.value = Some(value);
    }

    /// Whether nothing has been loaded yet.
    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }
}

impl<T> Default for LoadCache<T> {
    fn default() -> Self {
        Self { value: None }
    }
}

impl<T> fmt::Debug for LoadCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadCache")
            .field("loaded", &self.value.is_some())
            .finish()
    }
}

/// A memoized asynchronous computation.
///
/// Implementors supply [`load_impl`](Loader::load_impl) and, if their
/// result can go stale, [`should_reload`](Loader::should_reload). Callers
/// use [`load`](Loader::load), which returns the cached result unchanged
/// (the same `Arc`) until it is stale or a reload is forced.
///
/// `load` takes `&mut self`: one loader runs one load at a time. Wrap a
/// loader in [`SharedLoader`] to call it from several tasks.
#[async_trait]
pub trait Loader: Send + Sync {
    /// The value this loader produces.
    type Output: Send + Sync + 'static;

    /// Whether the cached result no longer reflects the content.
    async fn should_reload(&self) -> LoaderResult<bool> {
        Ok(false)
    }

    /// Compute a fresh result.
    async fn load_impl(&mut self, force: bool) -> LoaderResult<LoadResult<Self::Output>>;

    /// The cache slot.
    fn cache(&self) -> &LoadCache<Self::Output>;

    /// The cache slot, mutably.
    fn cache_mut(&mut self) -> &mut LoadCache<Self::Output>;

    /// The current result, recomputed if missing, stale, or `force`d.
    ///
    /// On failure the previous result stays cached.
    async fn load(&mut self, force: bool) -> LoaderResult<Arc<LoadResult<Self::Output>>> {
        if !force {
            if let Some(cached) = self.cache().get() {
                if !self.should_reload().await? {
                    return Ok(cached);
                }
            }
        }

        let fresh = Arc::new(self.load_impl(force).await?);
        self.cache_mut().store(Arc::clone(&fresh));
        Ok(fresh)
    }

    /// The last successful result, without checking staleness.
    fn cached(&self) -> Option<Arc<LoadResult<Self::Output>>> {
        self.cache().get()
    }
}

/// A loader that can be called from several tasks at once.
///
/// Loads go through an async mutex. A `load` that arrives while another is
/// in flight waits for it and then sees its cache, so concurrent non-forced
/// loads of an unchanged tree do the work once. Dropping a pending `load`
/// (a lost `select!`, an elapsed `timeout`) abandons it; the last good
/// result stays cached.
pub struct SharedLoader<L> {
    inner: Arc<Mutex<L>>,
}

impl<L> Clone for SharedLoader<L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L: Loader> SharedLoader<L> {
    /// Share `loader`.
    pub fn new(loader: L) -> Self {
        Self {
            inner: Arc::new(Mutex::new(loader)),
        }
    }

    /// See [`Loader::load`].
    pub async fn load(&self, force: bool) -> LoaderResult<Arc<LoadResult<L::Output>>> {
        let mut loader = self.inner.lock().await;
        loader.load(force).await
    }

    /// See [`Loader::should_reload`].
    pub async fn should_reload(&self) -> LoaderResult<bool> {
        let loader = self.inner.lock().await;
        loader.should_reload().await
    }

    /// The last successful result. Waits for an in-flight load to finish.
    pub async fn cached(&self) -> Option<Arc<LoadResult<L::Output>>> {
        self.inner.lock().await.cached()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    /// Counts its loads; staleness and failure are switched from outside.
    #[derive(Default)]
    struct Counter {
        runs: Arc<AtomicUsize>,
        stale: Arc<AtomicBool>,
        fail: Arc<AtomicBool>,
        delay: Option<Duration>,
        cache: LoadCache<usize>,
    }

    #[async_trait]
    impl Loader for Counter {
        type Output = usize;

        async fn should_reload(&self) -> LoaderResult<bool> {
            Ok(self.stale.load(Ordering::SeqCst))
        }

        async fn load_impl(&mut self, _force: bool) -> LoaderResult<LoadResult<usize>> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(LoadError::ListFolder {
                    folder: "x".into(),
                    source: std::io::Error::other("boom"),
                });
            }
            let n = self.runs.fetch_add(1, Ordering::SeqCst) + 1;
            self.stale.store(false, Ordering::SeqCst);
            Ok(LoadResult::new(n))
        }

        fn cache(&self) -> &LoadCache<usize> {
            &self.cache
        }

        fn cache_mut(&mut self) -> &mut LoadCache<usize> {
            &mut self.cache
        }
    }

    #[tokio::test]
    async fn second_load_returns_same_object() {
        let mut loader = Counter::default();
        let first = loader.load(false).await.unwrap();
        let second = loader.load(false).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loader.runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn force_reloads() {
        let mut loader = Counter::default();
        let first = loader.load(false).await.unwrap();
        let forced = loader.load(true).await.unwrap();
        assert!(!Arc::ptr_eq(&first, &forced));
        assert_eq!(forced.result, 2);
    }

    #[tokio::test]
    async fn stale_reloads() {
        let mut loader = Counter::default();
        loader.load(false).await.unwrap();
        loader.stale.store(true, Ordering::SeqCst);
        assert_eq!(loader.load(false).await.unwrap().result, 2);
        assert_eq!(loader.load(false).await.unwrap().result, 2);
    }

    #[tokio::test]
    async fn failure_keeps_last_good_result() {
        let mut loader = Counter::default();
        let good = loader.load(false).await.unwrap();

        loader.fail.store(true, Ordering::SeqCst);
        assert!(loader.load(true).await.is_err());
        assert!(Arc::ptr_eq(&loader.cached().unwrap(), &good));

        loader.fail.store(false, Ordering::SeqCst);
        assert_eq!(loader.load(false).await.unwrap().result, 1);
    }

    #[tokio::test]
    async fn failure_on_first_load_leaves_cache_empty() {
        let mut loader = Counter::default();
        loader.fail.store(true, Ordering::SeqCst);
        assert!(loader.load(false).await.is_err());
        assert!(loader.cache().is_empty());
    }

    #[tokio::test]
    async fn shared_concurrent_loads_run_once() {
        let loader = Counter {
            delay: Some(Duration::from_millis(20)),
            ..Counter::default()
        };
        let runs = Arc::clone(&loader.runs);
        let shared = SharedLoader::new(loader);

        let other = shared.clone();
        let (a, b) = tokio::join!(shared.load(false), other.load(false));
        let (a, b) = (a.unwrap(), b.unwrap());

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn shared_forced_loads_both_run() {
        let loader = Counter::default();
        let runs = Arc::clone(&loader.runs);
        let shared = SharedLoader::new(loader);

        let other = shared.clone();
        let (a, b) = tokio::join!(shared.load(true), other.load(true));
        assert_ne!(a.unwrap().result, b.unwrap().result);
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn shared_dropped_load_keeps_cache() {
        let loader = Counter {
            delay: Some(Duration::from_millis(50)),
            ..Counter::default()
        };
        let stale = Arc::clone(&loader.stale);
        let shared = SharedLoader::new(loader);
        let good = shared.load(false).await.unwrap();

        stale.store(true, Ordering::SeqCst);
        let abandoned = tokio::time::timeout(Duration::from_millis(5), shared.load(false)).await;
        assert!(abandoned.is_err());

        assert!(Arc::ptr_eq(&shared.cached().await.unwrap(), &good));
        assert!(shared.should_reload().await.unwrap());
        assert_eq!(shared.load(false).await.unwrap().result, 2);
    }
}
