// Modemstat - Residential gateway status scraping
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Single-slot time-to-live cache in front of a gatherer

use crate::client::ModemConfig;
use crate::error::Result;
use crate::gatherer::{Gatherer, ModemSource};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Default time a gathered value stays fresh
pub const DEFAULT_CACHE_DURATION: Duration = Duration::from_secs(5 * 60);

#[derive(Debug)]
struct CacheSlot<T> {
    value: T,
    stored_at: Instant,
}

impl<T> CacheSlot<T> {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() <= ttl
    }
}

/// Memoizes the latest value of a wrapped gatherer for a fixed duration.
///
/// Expiry is checked lazily on [`Gatherer::gather`]. The slot lock is held
/// while the wrapped gatherer runs, so concurrent callers of one cache wait
/// for a single upstream fetch. A failed fetch leaves the slot untouched.
pub struct CachingGatherer<G: Gatherer> {
    inner: G,
    ttl: Duration,
    slot: Mutex<Option<CacheSlot<G::Output>>>,
}

impl<G: Gatherer> CachingGatherer<G> {
    /// Wrap `inner`, keeping each value for `ttl`
    pub fn new(inner: G, ttl: Duration) -> Self {
        info!(
            gatherer = inner.name(),
            cache_duration = ?ttl,
            "Initialized CachingGatherer"
        );
        Self {
            inner,
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// Wrap `inner` with [`DEFAULT_CACHE_DURATION`]
    pub fn with_default_duration(inner: G) -> Self {
        Self::new(inner, DEFAULT_CACHE_DURATION)
    }

    /// The wrapped gatherer
    pub fn inner(&self) -> &G {
        &self.inner
    }

    /// Configured time-to-live
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// True when a value is stored and still fresh
    pub fn is_fresh(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|slot| slot.is_fresh(self.ttl))
    }
}

impl<G> Gatherer for CachingGatherer<G>
where
    G: Gatherer,
    G::Output: Clone,
{
    type Output = G::Output;

    fn gather(&self) -> Result<G::Output> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        match slot.as_ref() {
            Some(cached) if cached.is_fresh(self.ttl) => {
                debug!(gatherer = self.inner.name(), "Using cached value");
                return Ok(cached.value.clone());
            }
            Some(_) => info!(gatherer = self.inner.name(), "Cache expired"),
            None => info!(gatherer = self.inner.name(), "Cache empty"),
        }

        let value = self.inner.gather()?;
        *slot = Some(CacheSlot {
            value: value.clone(),
            stored_at: Instant::now(),
        });
        Ok(value)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

impl<G: Gatherer + ModemSource> ModemSource for CachingGatherer<G> {
    fn modem(&self) -> &ModemConfig {
        self.inner.modem()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FetchError, ModemError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread::sleep;

    /// Returns `result_<n>` on the n-th call, failing on the calls listed in `fail_on`
    struct CountingGatherer {
        calls: AtomicUsize,
        fail_on: Vec<usize>,
    }

    impl CountingGatherer {
        fn new() -> Self {
            Self::failing_on(&[])
        }

        fn failing_on(calls: &[usize]) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_on: calls.to_vec(),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Gatherer for CountingGatherer {
        type Output = String;

        fn gather(&self) -> Result<String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_on.contains(&n) {
                return Err(FetchError::Connection {
                    url: "http://192.168.1.254/".to_string(),
                    reason: "refused".to_string(),
                }
                .into());
            }
            Ok(format!("result_{n}"))
        }

        fn name(&self) -> &str {
            "CountingGatherer"
        }
    }

    #[test]
    fn test_first_call_fetches_data() {
        let caching = CachingGatherer::new(CountingGatherer::new(), Duration::from_secs(5));

        assert_eq!(caching.gather().unwrap(), "result_1");
        assert_eq!(caching.inner().call_count(), 1);
    }

    #[test]
    fn test_second_call_within_ttl_returns_cached() {
        let caching = CachingGatherer::new(CountingGatherer::new(), Duration::from_secs(5));

        let first = caching.gather().unwrap();
        let second = caching.gather().unwrap();
        let third = caching.gather().unwrap();

        assert_eq!(first, "result_1");
        assert_eq!(second, first);
        assert_eq!(third, first);
        assert_eq!(caching.inner().call_count(), 1);
        assert!(caching.is_fresh());
    }

    #[test]
    fn test_call_after_ttl_fetches_fresh_data() {
        let caching = CachingGatherer::new(CountingGatherer::new(), Duration::from_millis(100));

        assert_eq!(caching.gather().unwrap(), "result_1");
        sleep(Duration::from_millis(150));
        assert!(!caching.is_fresh());
        assert_eq!(caching.gather().unwrap(), "result_2");
        assert_eq!(caching.inner().call_count(), 2);
    }

    #[test]
    fn test_first_failure_leaves_slot_empty() {
        let caching =
            CachingGatherer::new(CountingGatherer::failing_on(&[1]), Duration::from_secs(5));

        assert!(matches!(caching.gather(), Err(ModemError::Fetch(_))));
        assert!(!caching.is_fresh());

        // Nothing was stored, so the next call goes upstream again
        assert_eq!(caching.gather().unwrap(), "result_2");
        assert_eq!(caching.inner().call_count(), 2);
    }

    #[test]
    fn test_failed_refresh_propagates_and_keeps_slot() {
        let caching =
            CachingGatherer::new(CountingGatherer::failing_on(&[2]), Duration::from_millis(50));

        assert_eq!(caching.gather().unwrap(), "result_1");
        sleep(Duration::from_millis(80));
        assert!(caching.gather().is_err());
        // The expired value was not replaced, so the next call retries
        assert_eq!(caching.gather().unwrap(), "result_3");
    }

    #[test]
    fn test_name_delegates() {
        let caching = CachingGatherer::with_default_duration(CountingGatherer::new());
        assert_eq!(caching.name(), "CountingGatherer");
        assert_eq!(caching.ttl(), DEFAULT_CACHE_DURATION);
    }

    #[test]
    fn test_each_wrapper_has_its_own_slot() {
        let a = CachingGatherer::new(CountingGatherer::new(), Duration::from_secs(5));
        let b = CachingGatherer::new(CountingGatherer::new(), Duration::from_secs(5));

        a.gather().unwrap();
        assert!(a.is_fresh());
        assert!(!b.is_fresh());
        assert_eq!(b.gather().unwrap(), "result_1");
        assert_eq!(b.inner().call_count(), 1);
    }
}
