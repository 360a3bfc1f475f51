//! Per-key fetch coordination over the cache store
//!
//! A `FetchCoordinator` owns one logical cache key and funnels every fetch
//! for that key through a single path: serve the cached value while it is
//! fresh, otherwise run the fetch function and write the result back with
//! the configured TTL. Starting a new fetch cancels the previous outstanding
//! one for the same key (last-request-wins), and a result that arrives under
//! a cancelled token is discarded without touching the store.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use parking_lot::Mutex;
use thiserror::Error;

use crate::cache::store::CacheStore;
use crate::cancel::CancelToken;

/// Boxed error type produced by fetch functions
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Type-erased fetch function: key and cancellation token in, value out
type FetchFn<T> =
    Arc<dyn Fn(String, CancelToken) -> BoxFuture<'static, Result<T, BoxError>> + Send + Sync>;

/// Errors surfaced by a coordinator
///
/// Cancellation never appears here: a superseded fetch surfaces as an
/// absent result from [`FetchCoordinator::fetch`], not as an error.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// The fetch function failed for a reason other than cancellation
    #[error("fetch for key '{key}' failed: {source}")]
    Fetch {
        key: String,
        #[source]
        source: BoxError,
    },

    /// The coordinator was constructed with unusable parameters
    #[error("invalid fetch configuration: {0}")]
    Configuration(String),
}

/// Options recognized by a coordinator
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// How long a fetched value stays fresh in the store
    pub ttl: Duration,
    /// When false, the coordinator never fetches; it only serves what the
    /// store already holds
    pub enabled: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            enabled: true,
        }
    }
}

/// Coordinates fetches for one cache key
///
/// At most one fetch per key is outstanding at any time: issuing a new one
/// cancels the prior token before the new fetch starts. Intended to be
/// shared behind an `Arc` with the UI code that triggers refreshes.
pub struct FetchCoordinator<T> {
    store: Arc<CacheStore<T>>,
    key: String,
    fetch_fn: FetchFn<T>,
    options: FetchOptions,
    /// Token of the outstanding fetch, if any. Replacing it always cancels
    /// the previous token while this lock is held, which is what makes
    /// last-request-wins race-free.
    in_flight: Mutex<Option<CancelToken>>,
}

impl<T> FetchCoordinator<T>
where
    T: Clone + Send + 'static,
{
    /// Creates a coordinator for `key` backed by `store`
    ///
    /// # Errors
    /// Returns [`CoordinatorError::Configuration`] when the key is empty or
    /// blank; the failure is synchronous, before any fetch is attempted.
    pub fn new<F, Fut>(
        store: Arc<CacheStore<T>>,
        key: impl Into<String>,
        options: FetchOptions,
        fetch_fn: F,
    ) -> Result<Self, CoordinatorError>
    where
        F: Fn(String, CancelToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, BoxError>> + Send + 'static,
    {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(CoordinatorError::Configuration(
                "cache key must not be empty".to_string(),
            ));
        }

        Ok(Self {
            store,
            key,
            fetch_fn: Arc::new(move |key, token| Box::pin(fetch_fn(key, token))),
            options,
            in_flight: Mutex::new(None),
        })
    }

    /// The cache key this coordinator manages
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the cached value if present and unexpired, without fetching
    pub fn cached(&self) -> Option<T> {
        self.store.get(&self.key)
    }

    /// Removes the cached value for this key, effective immediately
    pub fn invalidate(&self) {
        self.store.remove(&self.key);
    }

    /// True while a fetch for this key is outstanding and not superseded
    pub fn is_fetching(&self) -> bool {
        self.in_flight
            .lock()
            .as_ref()
            .is_some_and(|token| !token.is_cancelled())
    }

    /// Returns the value for this key, fetching it if necessary
    ///
    /// With `force_refresh == false`, a fresh cached value is returned
    /// without a network call. Otherwise the cached entry is invalidated,
    /// any outstanding fetch for the key is cancelled, and the fetch
    /// function runs with a new token.
    ///
    /// Returns `Ok(None)` in exactly two cases: the fetch was superseded by
    /// a newer one (its result, success or failure, is discarded), or the
    /// coordinator is disabled and the store holds nothing fresh. Fetch
    /// failures surface as [`CoordinatorError::Fetch`] with the original
    /// cause attached; a non-forced failure never evicts a still-valid
    /// cached value.
    pub async fn fetch(&self, force_refresh: bool) -> Result<Option<T>, CoordinatorError> {
        if !self.options.enabled {
            return Ok(self.store.get(&self.key));
        }

        if !force_refresh {
            if let Some(value) = self.store.get(&self.key) {
                return Ok(Some(value));
            }
        } else {
            // A forced refresh explicitly discards the current value, so a
            // failure below leaves the key absent rather than stale.
            self.store.remove(&self.key);
        }

        let token = CancelToken::new();
        {
            let mut in_flight = self.in_flight.lock();
            if let Some(prev) = in_flight.replace(token.clone()) {
                prev.cancel();
                tracing::debug!(key = %self.key, "superseding in-flight fetch");
            }
        }

        tracing::debug!(key = %self.key, force_refresh, "fetch started");
        let result = (self.fetch_fn)(self.key.clone(), token.clone()).await;

        // The token is only ever cancelled while `in_flight` is held, so
        // deciding under the same lock is race-free: either we were
        // superseded, or the slot still holds our token and we retire it.
        {
            let mut in_flight = self.in_flight.lock();
            if token.is_cancelled() {
                tracing::debug!(key = %self.key, "discarding superseded fetch result");
                return Ok(None);
            }
            *in_flight = None;
            if let Ok(value) = &result {
                self.store.set(&self.key, value.clone(), self.options.ttl);
            }
        }

        match result {
            Ok(value) => Ok(Some(value)),
            Err(source) => {
                tracing::warn!(key = %self.key, error = %source, "fetch failed");
                Err(CoordinatorError::Fetch {
                    key: self.key.clone(),
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_fetcher(
        counter: Arc<AtomicUsize>,
    ) -> impl Fn(String, CancelToken) -> BoxFuture<'static, Result<u64, BoxError>> {
        move |_key, _token| {
            let n = counter.fetch_add(1, Ordering::SeqCst) as u64 + 1;
            Box::pin(async move { Ok(n) })
        }
    }

    fn failing_fetcher(_key: String, _token: CancelToken) -> BoxFuture<'static, Result<u64, BoxError>> {
        Box::pin(async { Err::<u64, BoxError>("upstream unavailable".into()) })
    }

    #[test]
    fn test_empty_key_is_a_configuration_error() {
        let store: Arc<CacheStore<u64>> = Arc::new(CacheStore::new());
        let result = FetchCoordinator::new(store, "  ", FetchOptions::default(), |_, _| async {
            Ok(0u64)
        });

        match result {
            Err(CoordinatorError::Configuration(msg)) => {
                assert!(msg.contains("key"), "unexpected message: {msg}");
            }
            _ => panic!("expected a configuration error"),
        }
    }

    #[tokio::test]
    async fn test_fresh_cache_hit_skips_the_fetcher() {
        let store = Arc::new(CacheStore::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let coordinator = FetchCoordinator::new(
            Arc::clone(&store),
            "donors",
            FetchOptions::default(),
            counting_fetcher(Arc::clone(&calls)),
        )
        .unwrap();

        assert_eq!(coordinator.fetch(false).await.unwrap(), Some(1));
        assert_eq!(coordinator.fetch(false).await.unwrap(), Some(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_force_refresh_bypasses_a_fresh_cache() {
        let store = Arc::new(CacheStore::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let coordinator = FetchCoordinator::new(
            Arc::clone(&store),
            "donors",
            FetchOptions::default(),
            counting_fetcher(Arc::clone(&calls)),
        )
        .unwrap();

        assert_eq!(coordinator.fetch(false).await.unwrap(), Some(1));
        assert_eq!(coordinator.fetch(true).await.unwrap(), Some(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_disabled_coordinator_never_fetches() {
        let store = Arc::new(CacheStore::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let options = FetchOptions {
            enabled: false,
            ..Default::default()
        };
        let coordinator = FetchCoordinator::new(
            Arc::clone(&store),
            "donors",
            options,
            counting_fetcher(Arc::clone(&calls)),
        )
        .unwrap();

        // Cold store: nothing to serve, nothing fetched.
        assert_eq!(coordinator.fetch(false).await.unwrap(), None);

        // Warm store: the cached value is served as-is.
        store.set("donors", 99, Duration::from_secs(60));
        assert_eq!(coordinator.fetch(false).await.unwrap(), Some(99));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_surfaces_with_cause() {
        let store: Arc<CacheStore<u64>> = Arc::new(CacheStore::new());
        let coordinator = FetchCoordinator::new(
            Arc::clone(&store),
            "stats",
            FetchOptions::default(),
            failing_fetcher,
        )
        .unwrap();

        let err = coordinator.fetch(false).await.unwrap_err();
        match err {
            CoordinatorError::Fetch { key, source } => {
                assert_eq!(key, "stats");
                assert_eq!(source.to_string(), "upstream unavailable");
            }
            other => panic!("expected a fetch error, got {other:?}"),
        }
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_non_forced_failure_leaves_valid_cache_untouched() {
        let store = Arc::new(CacheStore::new());
        store.set("stats", 7u64, Duration::from_secs(60));
        let coordinator = FetchCoordinator::new(
            Arc::clone(&store),
            "stats",
            FetchOptions::default(),
            failing_fetcher,
        )
        .unwrap();

        // The fresh entry short-circuits; the failing fetcher never runs.
        assert_eq!(coordinator.fetch(false).await.unwrap(), Some(7));
        assert_eq!(store.get("stats"), Some(7));
    }

    #[tokio::test]
    async fn test_forced_failure_evicts_the_entry() {
        let store = Arc::new(CacheStore::new());
        store.set("stats", 7u64, Duration::from_secs(60));
        let coordinator = FetchCoordinator::new(
            Arc::clone(&store),
            "stats",
            FetchOptions::default(),
            failing_fetcher,
        )
        .unwrap();

        assert!(coordinator.fetch(true).await.is_err());
        assert!(store.get("stats").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_fetch_cancels_the_first() {
        let store = Arc::new(CacheStore::new());
        let coordinator = Arc::new(
            FetchCoordinator::new(
                Arc::clone(&store),
                "donors",
                FetchOptions::default(),
                |_key, token: CancelToken| async move {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    token.checkpoint()?;
                    Ok(1u64)
                },
            )
            .unwrap(),
        );

        let first = {
            let coordinator = Arc::clone(&coordinator);
            tokio::spawn(async move { coordinator.fetch(false).await })
        };
        // Let the first fetch reach its sleep before superseding it.
        tokio::task::yield_now().await;
        assert!(coordinator.is_fetching());

        // The second request cancels the first's token before fetching.
        let second = {
            let coordinator = Arc::clone(&coordinator);
            tokio::spawn(async move { coordinator.fetch(true).await })
        };

        let first = first.await.unwrap().unwrap();
        let second = second.await.unwrap().unwrap();

        // Only the second result is observable; the superseded fetch is
        // absorbed without an error.
        assert_eq!(first, None);
        assert_eq!(second, Some(1));
        assert!(!coordinator.is_fetching());
    }

    #[tokio::test]
    async fn test_invalidate_then_cached_yields_absent() {
        let store = Arc::new(CacheStore::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let coordinator = FetchCoordinator::new(
            Arc::clone(&store),
            "donors",
            FetchOptions::default(),
            counting_fetcher(Arc::clone(&calls)),
        )
        .unwrap();

        coordinator.fetch(false).await.unwrap();
        coordinator.invalidate();
        assert!(coordinator.cached().is_none());
    }
}
