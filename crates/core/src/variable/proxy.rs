//! Read-through decorators: renaming proxies and time-windowed caching.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};

use super::{AccessError, Clock, Variable, system_clock};
use crate::value::Value;

/// Delegates every read to a wrapped variable, optionally under a new name.
///
/// Used for cross-namespace forwarding (renaming `n` to `<namespace>-n`) and
/// as the base shape for [`CachingVariable`].
pub struct ProxyVariable {
    name: String,
    inner: Arc<dyn Variable>,
}

impl ProxyVariable {
    /// Wrap `inner` under a new exported name.
    pub fn new(name: impl Into<String>, inner: Arc<dyn Variable>) -> Self {
        Self { name: name.into(), inner }
    }
}

impl std::fmt::Debug for ProxyVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyVariable")
            .field("name", &self.name)
            .field("inner", &self.inner.name())
            .finish()
    }
}

impl Variable for ProxyVariable {
    fn name(&self) -> &str {
        &self.name
    }

    fn doc(&self) -> &str {
        self.inner.doc()
    }

    fn tags(&self) -> &BTreeSet<String> {
        self.inner.tags()
    }

    fn value(&self) -> Result<Value, AccessError> {
        self.inner.value()
    }

    fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.inner.last_updated()
    }

    fn is_expandable(&self) -> bool {
        self.inner.is_expandable()
    }
}

/// A proxy that memoizes the wrapped value for a fixed time window.
///
/// The first read always misses. `last_updated()` reports the cache's own
/// stamp (time of the last underlying fetch), not the wrapped variable's.
///
/// The cache lock is held only across load/store, never across the
/// underlying fetch, so concurrent readers racing on an expired cache may
/// both invoke the wrapped accessor. That double recompute is accepted
/// behavior: reads are idempotent from the caller's viewpoint and the
/// simpler protocol avoids blocking readers behind a slow source.
pub struct CachingVariable {
    name: String,
    inner: Arc<dyn Variable>,
    timeout_ms: u64,
    cache: Mutex<Option<CacheSlot>>,
    clock: Clock,
}

#[derive(Clone)]
struct CacheSlot {
    value: Value,
    fetched_at: DateTime<Utc>,
}

impl CachingVariable {
    /// Cache `inner` reads for `timeout_ms` milliseconds.
    pub fn new(inner: Arc<dyn Variable>, timeout_ms: u64) -> Self {
        Self::with_clock(inner, timeout_ms, system_clock())
    }

    /// As [`CachingVariable::new`] with an explicit time source. Primarily
    /// for tests.
    pub fn with_clock(inner: Arc<dyn Variable>, timeout_ms: u64, clock: Clock) -> Self {
        Self {
            name: inner.name().to_string(),
            inner,
            timeout_ms,
            cache: Mutex::new(None),
            clock,
        }
    }

    fn fresh_value(&self, now: DateTime<Utc>) -> Option<Value> {
        let slot = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = slot.as_ref()?;
        let age = now.signed_duration_since(slot.fetched_at);
        if age.num_milliseconds() > self.timeout_ms as i64 {
            None
        } else {
            Some(slot.value.clone())
        }
    }
}

impl std::fmt::Debug for CachingVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachingVariable")
            .field("name", &self.name)
            .field("timeout_ms", &self.timeout_ms)
            .finish_non_exhaustive()
    }
}

impl Variable for CachingVariable {
    fn name(&self) -> &str {
        &self.name
    }

    fn doc(&self) -> &str {
        self.inner.doc()
    }

    fn tags(&self) -> &BTreeSet<String> {
        self.inner.tags()
    }

    fn value(&self) -> Result<Value, AccessError> {
        let now = (self.clock)();
        if let Some(value) = self.fresh_value(now) {
            return Ok(value);
        }
        // Fetch outside the lock. A failed fetch leaves the previous slot in
        // place and propagates the error.
        let value = self.inner.value()?;
        let fetched_at = (self.clock)();
        let mut slot = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(CacheSlot { value: value.clone(), fetched_at });
        Ok(value)
    }

    fn last_updated(&self) -> Option<DateTime<Utc>> {
        let slot = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref().map(|s| s.fetched_at)
    }

    fn is_expandable(&self) -> bool {
        self.inner.is_expandable()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicI64, Ordering};

    use chrono::TimeZone;

    use super::*;
    use crate::variable::SupplierVariable;

    fn counting_source(counter: Arc<AtomicI64>) -> Arc<dyn Variable> {
        Arc::new(
            SupplierVariable::builder("hits")
                .reads(move || Value::Int(counter.fetch_add(1, Ordering::SeqCst)))
                .build()
                .unwrap(),
        )
    }

    fn manual_clock(start: DateTime<Utc>) -> (Arc<Mutex<DateTime<Utc>>>, Clock) {
        let now = Arc::new(Mutex::new(start));
        let handle = Arc::clone(&now);
        let clock: Clock = Arc::new(move || *handle.lock().unwrap());
        (now, clock)
    }

    #[test]
    fn test_proxy_renames_and_delegates() {
        let inner = Arc::new(
            SupplierVariable::builder("status")
                .doc("service status")
                .reads(|| Value::Str("up".into()))
                .build()
                .unwrap(),
        );
        let proxy = ProxyVariable::new("svc-status", inner);
        assert_eq!(proxy.name(), "svc-status");
        assert_eq!(proxy.doc(), "service status");
        assert_eq!(proxy.value().unwrap(), Value::Str("up".into()));
        assert!(!proxy.is_expandable());
    }

    #[test]
    fn test_cache_hit_within_window_and_miss_after() {
        let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let (now, clock) = manual_clock(t0);
        let counter = Arc::new(AtomicI64::new(0));
        let cached = CachingVariable::with_clock(counting_source(counter), 1000, clock);

        // first read always misses
        assert_eq!(cached.value().unwrap(), Value::Int(0));
        assert_eq!(cached.last_updated(), Some(t0));

        // half the window: still the cached value even though the source moved on
        *now.lock().unwrap() = t0 + chrono::Duration::milliseconds(500);
        assert_eq!(cached.value().unwrap(), Value::Int(0));

        // just past the window: refresh
        let t2 = t0 + chrono::Duration::milliseconds(1001);
        *now.lock().unwrap() = t2;
        assert_eq!(cached.value().unwrap(), Value::Int(1));
        assert_eq!(cached.last_updated(), Some(t2));
    }

    #[test]
    fn test_no_stamp_before_first_fetch() {
        let cached = CachingVariable::new(counting_source(Arc::new(AtomicI64::new(0))), 1000);
        assert!(cached.last_updated().is_none());
    }

    #[test]
    fn test_failed_fetch_propagates_and_keeps_previous_slot() {
        let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let (now, clock) = manual_clock(t0);
        let fail = Arc::new(Mutex::new(false));
        let fail_handle = Arc::clone(&fail);
        let source = Arc::new(
            SupplierVariable::builder("flaky")
                .accessor(move || {
                    if *fail_handle.lock().unwrap() {
                        Err(AccessError::Failed {
                            name: "flaky".into(),
                            message: "source gone".into(),
                        })
                    } else {
                        Ok(Value::Int(7))
                    }
                })
                .build()
                .unwrap(),
        );
        let cached = CachingVariable::with_clock(source, 1000, clock);

        assert_eq!(cached.value().unwrap(), Value::Int(7));

        *fail.lock().unwrap() = true;
        *now.lock().unwrap() = t0 + chrono::Duration::milliseconds(2000);
        assert!(cached.value().is_err());
        // stamp still reflects the last successful fetch
        assert_eq!(cached.last_updated(), Some(t0));
    }
}
