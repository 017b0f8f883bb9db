//! Catalog Caching
//!
//! Process-memory caches for the two provider catalogs. Each cache owns its
//! refresh policy and a [`Clock`], so expiry can be driven deterministically
//! in tests.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex as AsyncMutex;

use crate::error::Result;

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// When a populated cache should be refetched
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshPolicy {
    /// Keep the first successful fetch for the lifetime of the process
    Never,
    /// Refetch once the cached copy is older than the given age
    Ttl(Duration),
}

struct Entry<T> {
    items: Arc<Vec<T>>,
    fetched_at: DateTime<Utc>,
}

/// A single cached catalog with fetch-on-demand.
///
/// The lock is held across the upstream fetch, so concurrent callers that
/// find the cache empty or stale wait for one fetch instead of each issuing
/// their own.
pub struct CatalogCache<T> {
    entry: AsyncMutex<Option<Entry<T>>>,
    policy: RefreshPolicy,
    clock: Arc<dyn Clock>,
}

impl<T: Send + Sync> CatalogCache<T> {
    pub fn new(policy: RefreshPolicy) -> Self {
        Self::with_clock(policy, Arc::new(SystemClock))
    }

    pub fn with_clock(policy: RefreshPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            entry: AsyncMutex::new(None),
            policy,
            clock,
        }
    }

    pub fn policy(&self) -> RefreshPolicy {
        self.policy
    }

    /// Return the cached catalog, fetching it first if empty or expired.
    ///
    /// Empty fetch results are returned but not stored. When a refresh fails
    /// and an older copy exists, the older copy is served and the next call
    /// tries again.
    pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> Result<Arc<Vec<T>>>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<Vec<T>>> + Send,
    {
        let mut entry = self.entry.lock().await;
        let now = self.clock.now();

        if let Some(cached) = entry.as_ref() {
            if !self.is_expired(cached.fetched_at, now) {
                tracing::debug!(items = cached.items.len(), "Catalog cache hit");
                return Ok(Arc::clone(&cached.items));
            }
            tracing::debug!(fetched_at = %cached.fetched_at, "Catalog cache expired");
        }

        match fetch().await {
            Ok(items) => {
                let items = Arc::new(items);
                if items.is_empty() {
                    tracing::warn!("Upstream returned an empty catalog; not caching it");
                } else {
                    *entry = Some(Entry {
                        items: Arc::clone(&items),
                        fetched_at: now,
                    });
                }
                Ok(items)
            }
            Err(e) => match entry.as_ref() {
                Some(stale) => {
                    tracing::warn!(error = %e, "Catalog refresh failed; serving stale copy");
                    Ok(Arc::clone(&stale.items))
                }
                None => Err(e),
            },
        }
    }

    /// Drop the cached copy so the next access refetches
    pub async fn invalidate(&self) {
        *self.entry.lock().await = None;
    }

    pub async fn is_populated(&self) -> bool {
        self.entry.lock().await.is_some()
    }

    fn is_expired(&self, fetched_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self.policy {
            RefreshPolicy::Never => false,
            RefreshPolicy::Ttl(ttl) => now - fetched_at > ttl,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalyzerError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn upstream_down() -> AnalyzerError {
        AnalyzerError::Upstream {
            provider: "Test",
            endpoint: "list".into(),
            status: 503,
        }
    }

    #[tokio::test]
    async fn test_ttl_expiry_refetches() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache: CatalogCache<u32> =
            CatalogCache::with_clock(RefreshPolicy::Ttl(Duration::hours(1)), clock.clone());
        let calls = &AtomicUsize::new(0);

        let fetch = move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![1, 2, 3])
        };

        cache.get_or_fetch(fetch).await.unwrap();
        clock.advance(Duration::minutes(59));
        cache.get_or_fetch(fetch).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        clock.advance(Duration::minutes(2));
        cache.get_or_fetch(fetch).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_never_policy_ignores_age() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache: CatalogCache<u32> =
            CatalogCache::with_clock(RefreshPolicy::Never, clock.clone());
        let calls = &AtomicUsize::new(0);

        let fetch = move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![7])
        };

        cache.get_or_fetch(fetch).await.unwrap();
        clock.advance(Duration::days(365));
        cache.get_or_fetch(fetch).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_fetch() {
        let cache: CatalogCache<u32> = CatalogCache::new(RefreshPolicy::Never);
        let calls = &AtomicUsize::new(0);

        let lookups = (0..8).map(|_| {
            cache.get_or_fetch(move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                // still in flight when the other callers arrive
                tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                Ok(vec![1, 2, 3])
            })
        });
        let results = futures::future::join_all(lookups).await;

        assert!(results.iter().all(|r| r.as_ref().is_ok_and(|items| items.len() == 3)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let cache: CatalogCache<u32> = CatalogCache::new(RefreshPolicy::Never);

        let first = cache.get_or_fetch(|| async { Err(upstream_down()) }).await;
        assert!(first.is_err());
        assert!(!cache.is_populated().await);

        let second = cache.get_or_fetch(|| async { Ok(vec![1]) }).await.unwrap();
        assert_eq!(second.as_slice(), &[1]);
    }

    #[tokio::test]
    async fn test_stale_copy_served_on_refresh_failure() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache: CatalogCache<u32> =
            CatalogCache::with_clock(RefreshPolicy::Ttl(Duration::hours(1)), clock.clone());

        cache.get_or_fetch(|| async { Ok(vec![1, 2]) }).await.unwrap();
        clock.advance(Duration::hours(2));

        let stale = cache.get_or_fetch(|| async { Err(upstream_down()) }).await.unwrap();
        assert_eq!(stale.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_result_not_stored() {
        let cache: CatalogCache<u32> = CatalogCache::new(RefreshPolicy::Never);

        let empty = cache.get_or_fetch(|| async { Ok(Vec::new()) }).await.unwrap();
        assert!(empty.is_empty());
        assert!(!cache.is_populated().await);

        cache.invalidate().await;
        let filled = cache.get_or_fetch(|| async { Ok(vec![9]) }).await.unwrap();
        assert_eq!(filled.len(), 1);
    }
}
