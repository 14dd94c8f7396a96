//! Thread-safe memoizing key/value cache.
//!
//! Each key maps to its own slot, a write-once cell holding the shared value.
//! A lookup grabs the slot under the map's shard lock, releases the lock, and
//! then initializes the slot outside of it:
//!
//! - concurrent callers on the **same** missing key block on that slot while
//!   exactly one of them runs the loader;
//! - callers on **different** keys never wait for each other's loaders.
//!
//! `set` and `clear` replace or drop slots. A loader that is still running on
//! a replaced slot finishes for itself and its waiters but its result is never
//! published, so a write that completes before a lookup starts is always seen.
//!
//! # Examples
//!
//! ```
//! use singleton_cache::MemoizingCache;
//!
//! let cache: MemoizingCache<String> = MemoizingCache::new();
//!
//! let value = cache.get_or_load("greeting", |key| format!("loaded {key}"));
//! assert_eq!(&*value, "loaded greeting");
//!
//! // Second lookup is served from the cache; the loader is not called.
//! let again = cache.get_or_load("greeting", |_| unreachable!());
//! assert_eq!(&*again, "loaded greeting");
//! ```

use std::convert::Infallible;
use std::fmt;
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use tracing::{debug, trace, warn};

use crate::cache_stats::CacheStats;
use crate::{CacheConfig, CacheError, CacheEvent, CacheStatsSnapshot};

/// Per-key write-once slot.
type Slot<V> = Arc<OnceCell<Arc<V>>>;

/// Type alias for the user-supplied tracing callback.
///
/// The callback receives a reference to a [`CacheEvent`] every time the cache is
/// interacted with. It must be thread-safe because the cache itself is shared.
pub type TraceCallback = dyn Fn(&CacheEvent) + Send + Sync + 'static;

/// Where a looked-up value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Already stored, or loaded by a concurrent caller this lookup waited on.
    Cached,
    /// Produced by this caller's loader.
    Loaded,
}

/// A value returned by [`MemoizingCache::fetch`].
#[derive(Debug, Clone)]
pub struct Fetched<V> {
    /// The shared value.
    pub value: Arc<V>,
    /// Whether this call's loader produced it.
    pub origin: Origin,
}

impl<V> Fetched<V> {
    /// True unless this call's loader produced the value.
    pub fn is_cached(&self) -> bool {
        self.origin == Origin::Cached
    }
}

/// Unbounded, thread-safe cache that loads each missing key at most once.
///
/// Values are stored as `Arc<V>` and handed out by reference count; the cache
/// never clones or inspects them.
pub struct MemoizingCache<V> {
    entries: DashMap<String, Slot<V>>,
    stats: CacheStats,
    track_stats: bool,
    trace: Mutex<Option<Arc<TraceCallback>>>,
}

impl<V: Send + Sync + 'static> Default for MemoizingCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Send + Sync + 'static> MemoizingCache<V> {
    /// Creates an empty cache with the default configuration.
    pub fn new() -> Self {
        Self::from_valid_config(&CacheConfig::default())
    }

    /// Creates an empty cache with room for `capacity` keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_valid_config(&CacheConfig {
            initial_capacity: capacity,
            ..CacheConfig::default()
        })
    }

    /// Creates an empty cache from an explicit configuration.
    ///
    /// # Errors
    ///
    /// [`CacheError::InvalidConfig`] if the configuration does not validate.
    pub fn with_config(config: CacheConfig) -> Result<Self, CacheError> {
        config.validate()?;
        Ok(Self::from_valid_config(&config))
    }

    fn from_valid_config(config: &CacheConfig) -> Self {
        let entries = match config.shard_amount {
            Some(shards) => {
                DashMap::with_capacity_and_shard_amount(config.initial_capacity, shards)
            }
            None => DashMap::with_capacity(config.initial_capacity),
        };

        Self {
            entries,
            stats: CacheStats::new(),
            track_stats: config.track_stats,
            trace: Mutex::new(None),
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Lookups
    // ---------------------------------------------------------------------------------------------

    /// Returns the value stored under `key`, running `load` only on a miss.
    ///
    /// When several threads miss on the same key at once, exactly one of them
    /// runs its loader; the others block until it finishes and receive the
    /// same `Arc`.
    pub fn get_or_load<F>(&self, key: &str, load: F) -> Arc<V>
    where
        F: FnOnce(&str) -> V,
    {
        match self.fetch(key, |k| Ok::<V, Infallible>(load(k))) {
            Ok(fetched) => fetched.value,
            Err(never) => match never {},
        }
    }

    /// Fallible variant of [`get_or_load`](Self::get_or_load).
    ///
    /// A failed load is not memoized: the error is returned to this caller and
    /// the next lookup of `key` runs a loader again. Callers that were waiting
    /// on the failed load retry with their own loader.
    pub fn try_get_or_load<E, F>(&self, key: &str, load: F) -> Result<Arc<V>, E>
    where
        F: FnOnce(&str) -> Result<V, E>,
    {
        self.fetch(key, load).map(|fetched| fetched.value)
    }

    /// Like [`try_get_or_load`](Self::try_get_or_load), also reporting whether
    /// the value came from the cache or from this call's loader.
    pub fn fetch<E, F>(&self, key: &str, load: F) -> Result<Fetched<V>, E>
    where
        F: FnOnce(&str) -> Result<V, E>,
    {
        let slot = self.slot(key);

        if let Some(value) = slot.get() {
            trace!(key, "cache hit");
            if self.track_stats {
                self.stats.record_hit();
            }
            self.emit(|| CacheEvent::Hit {
                key: key.to_owned(),
            });
            return Ok(Fetched {
                value: Arc::clone(value),
                origin: Origin::Cached,
            });
        }

        if self.track_stats {
            self.stats.record_miss();
        }

        // Runs on every exit, including a panicking loader.
        let _guard = EmptySlotGuard {
            cache: self,
            key,
            slot: &slot,
        };

        let mut ran_loader = false;
        let result = slot.get_or_try_init(|| {
            ran_loader = true;
            debug!(key, "cache miss, loading from source");
            load(key).map(Arc::new)
        });

        match result {
            Ok(value) => {
                let value = Arc::clone(value);
                let origin = if ran_loader {
                    debug!(key, "loaded value stored");
                    self.record_load(key, true);
                    Origin::Loaded
                } else {
                    trace!(key, "joined in-flight load");
                    self.emit(|| CacheEvent::Hit {
                        key: key.to_owned(),
                    });
                    Origin::Cached
                };
                Ok(Fetched { value, origin })
            }
            Err(err) => {
                warn!(key, "load failed, nothing cached");
                self.record_load(key, false);
                Err(err)
            }
        }
    }

    /// Returns the stored value for `key` without loading.
    pub fn get(&self, key: &str) -> Option<Arc<V>> {
        self.entries
            .get(key)
            .and_then(|slot| slot.value().get().cloned())
    }

    /// Whether a value is stored under `key`. In-flight loads do not count.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value().get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ---------------------------------------------------------------------------------------------
    // Writes
    // ---------------------------------------------------------------------------------------------

    /// Stores `value` under `key`, replacing whatever was there.
    ///
    /// A load of `key` already in progress keeps running, but its result is
    /// not published; later lookups observe this value.
    pub fn set(&self, key: impl Into<String>, value: V) {
        self.set_arc(key, Arc::new(value));
    }

    /// Stores an already shared value under `key`.
    pub fn set_arc(&self, key: impl Into<String>, value: Arc<V>) {
        let key = key.into();
        debug!(key = %key, "storing value");

        self.entries
            .insert(key.clone(), Arc::new(OnceCell::with_value(value)));

        if self.track_stats {
            self.stats.record_set();
        }
        self.emit(|| CacheEvent::Set { key });
    }

    /// Drops every entry.
    ///
    /// Entries that existed before the call are gone once it returns. Loads
    /// running during the clear complete for their callers but are not stored.
    /// `removed` counts the stored values actually dropped by this call.
    pub fn clear(&self) {
        let mut removed = 0;
        self.entries.retain(|_, slot| {
            if slot.get().is_some() {
                removed += 1;
            }
            false
        });
        debug!(removed, "cache cleared");

        if self.track_stats {
            self.stats.record_clear();
        }
        self.emit(|| CacheEvent::Clear { removed });
    }

    /// Point-in-time counters. All zero when stats tracking is disabled.
    pub fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot(self.len())
    }

    // ---------------------------------------------------------------------------------------------
    // Tracing
    // ---------------------------------------------------------------------------------------------

    /// Sets a callback invoked for every hit, load, set and clear.
    ///
    /// The callback runs on the calling thread after the trace lock is released,
    /// so it may use the cache itself.
    pub fn set_trace_callback(&self, callback: impl Fn(&CacheEvent) + Send + Sync + 'static) {
        let mut guard = self.trace.lock().unwrap_or_else(|p| p.into_inner());
        *guard = Some(Arc::new(callback));
    }

    /// Clears the tracing callback.
    pub fn clear_trace_callback(&self) {
        let mut guard = self.trace.lock().unwrap_or_else(|p| p.into_inner());
        *guard = None;
    }

    fn emit(&self, event: impl FnOnce() -> CacheEvent) {
        let callback = self
            .trace
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone();
        if let Some(callback) = callback {
            callback(&event());
        }
    }

    fn record_load(&self, key: &str, ok: bool) {
        if self.track_stats {
            self.stats.record_load(ok);
        }
        self.emit(|| CacheEvent::Load {
            key: key.to_owned(),
            ok,
        });
    }

    /// Removes `slot` if it is still the one mapped to `key`, still empty, and
    /// held only by the map and the caller.
    fn discard_if_empty(&self, key: &str, slot: &Slot<V>) {
        let removed = self.entries.remove_if(key, |_, current| {
            Arc::ptr_eq(current, slot)
                && current.get().is_none()
                && Arc::strong_count(current) == 2
        });
        if removed.is_some() {
            trace!(key, "dropped empty slot");
        }
    }

    #[cfg(test)]
    fn slot_count(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    fn slot_holders(&self, key: &str) -> usize {
        self.entries
            .get(key)
            .map_or(0, |slot| Arc::strong_count(slot.value()))
    }

    /// Finds or creates the slot for `key`. The shard lock is released on return.
    fn slot(&self, key: &str) -> Slot<V> {
        if let Some(slot) = self.entries.get(key) {
            return Arc::clone(slot.value());
        }
        Arc::clone(self.entries.entry(key.to_owned()).or_default().value())
    }
}

/// Drops a slot left empty by a failed or panicking load.
struct EmptySlotGuard<'a, V: Send + Sync + 'static> {
    cache: &'a MemoizingCache<V>,
    key: &'a str,
    slot: &'a Slot<V>,
}

impl<V: Send + Sync + 'static> Drop for EmptySlotGuard<'_, V> {
    fn drop(&mut self) {
        self.cache.discard_if_empty(self.key, self.slot);
    }
}

impl<V: Send + Sync + 'static> fmt::Debug for MemoizingCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoizingCache")
            .field("len", &self.len())
            .field("track_stats", &self.track_stats)
            .finish_non_exhaustive()
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;
    use std::time::Duration;

    fn counting_loader<'a>(
        counter: &'a AtomicUsize,
        value: &'a str,
    ) -> impl FnOnce(&str) -> String + 'a {
        move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            value.to_string()
        }
    }

    #[test]
    fn test_miss_then_hit() {
        let cache: MemoizingCache<String> = MemoizingCache::new();
        let loads = AtomicUsize::new(0);

        let first = cache.get_or_load("k", counting_loader(&loads, "v"));
        let second = cache.get_or_load("k", counting_loader(&loads, "other"));

        assert_eq!(&*first, "v");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_loader_receives_key() {
        let cache: MemoizingCache<String> = MemoizingCache::new();
        let value = cache.get_or_load("commonKey", |key| key.to_uppercase());
        assert_eq!(&*value, "COMMONKEY");
    }

    #[test]
    fn test_overwrite_then_lookup() {
        let cache: MemoizingCache<String> = MemoizingCache::new();
        let loads = AtomicUsize::new(0);

        cache.set("k", "v1".to_string());
        cache.set("k", "v2".to_string());
        let value = cache.get_or_load("k", counting_loader(&loads, "loaded"));

        assert_eq!(&*value, "v2");
        assert_eq!(loads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_set_overrides_loaded_value() {
        let cache: MemoizingCache<i32> = MemoizingCache::new();
        cache.get_or_load("n", |_| 1);
        cache.set("n", 2);
        assert_eq!(*cache.get_or_load("n", |_| 3), 2);
    }

    #[test]
    fn test_clear_forces_reload() {
        let cache: MemoizingCache<String> = MemoizingCache::new();
        let loads = AtomicUsize::new(0);

        cache.set("k", "v".to_string());
        cache.clear();
        assert!(cache.is_empty());

        let value = cache.get_or_load("k", counting_loader(&loads, "reloaded"));
        assert_eq!(&*value, "reloaded");
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_load_is_not_memoized() {
        let cache: MemoizingCache<String> = MemoizingCache::new();

        let err = cache
            .try_get_or_load("k", |_| Err::<String, _>("source down"))
            .unwrap_err();
        assert_eq!(err, "source down");
        assert!(!cache.contains_key("k"));
        assert_eq!(cache.len(), 0);

        let value = cache
            .try_get_or_load("k", |_| Ok::<_, &str>("recovered".to_string()))
            .unwrap();
        assert_eq!(&*value, "recovered");
    }

    #[test]
    fn test_failed_loads_leave_no_slots() {
        let cache: MemoizingCache<u32> = MemoizingCache::new();

        for i in 0..1000 {
            let result = cache.try_get_or_load(&format!("bad-{i}"), |_| Err::<u32, _>(()));
            assert!(result.is_err());
        }

        assert_eq!(cache.len(), 0);
        assert_eq!(cache.slot_count(), 0);

        cache.get_or_load("good", |_| 1);
        assert_eq!(cache.slot_count(), 1);
    }

    #[test]
    fn test_panicking_load_leaves_no_slot() {
        let cache: MemoizingCache<u32> = MemoizingCache::new();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            cache.get_or_load("boom", |_| panic!("loader exploded"))
        }));
        assert!(result.is_err());
        assert_eq!(cache.slot_count(), 0);

        assert_eq!(*cache.get_or_load("boom", |_| 5), 5);
    }

    #[test]
    fn test_waiter_retries_after_failed_load() {
        let cache: Arc<MemoizingCache<String>> = Arc::new(MemoizingCache::new());
        let (started_tx, started_rx) = std::sync::mpsc::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        let waiter_loads = Arc::new(AtomicUsize::new(0));

        let failing = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                cache.try_get_or_load("k", move |_| {
                    started_tx.send(()).unwrap();
                    release_rx.recv().unwrap();
                    Err::<String, _>("down")
                })
            })
        };
        started_rx.recv().unwrap();

        let waiter = {
            let cache = Arc::clone(&cache);
            let waiter_loads = Arc::clone(&waiter_loads);
            thread::spawn(move || {
                cache.try_get_or_load("k", |_| {
                    waiter_loads.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, &str>("ok".to_string())
                })
            })
        };

        // Map, failing loader and waiter all hold the slot.
        while cache.slot_holders("k") < 3 {
            thread::yield_now();
        }
        release_tx.send(()).unwrap();

        assert_eq!(failing.join().unwrap().unwrap_err(), "down");
        assert_eq!(&*waiter.join().unwrap().unwrap(), "ok");
        assert_eq!(waiter_loads.load(Ordering::SeqCst), 1);
        assert_eq!(&*cache.get_or_load("k", |_| unreachable!()), "ok");
    }

    #[test]
    fn test_joined_load_emits_hit() {
        let cache: Arc<MemoizingCache<u32>> = Arc::new(MemoizingCache::new());
        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();
        cache.set_trace_callback(move |e| {
            events_clone.lock().unwrap().push(e.to_string());
        });

        let (started_tx, started_rx) = std::sync::mpsc::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();

        let loader = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                cache.get_or_load("k", move |_| {
                    started_tx.send(()).unwrap();
                    release_rx.recv().unwrap();
                    1
                })
            })
        };
        started_rx.recv().unwrap();

        let joiner = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || cache.fetch("k", |_| Ok::<_, ()>(2)).unwrap())
        };
        while cache.slot_holders("k") < 3 {
            thread::yield_now();
        }
        release_tx.send(()).unwrap();

        assert_eq!(*loader.join().unwrap(), 1);
        let joined = joiner.join().unwrap();
        assert_eq!(joined.origin, Origin::Cached);
        assert_eq!(*joined.value, 1);

        let mut captured = events.lock().unwrap().clone();
        captured.sort();
        assert_eq!(captured, vec!["hit { key: k }", "load { key: k, ok: true }"]);
    }

    #[test]
    fn test_clear_counts_stored_values_only() {
        let cache: MemoizingCache<u32> = MemoizingCache::new();
        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();
        cache.set_trace_callback(move |e| {
            events_clone.lock().unwrap().push(e.clone());
        });

        cache.set("a", 1);
        cache.set("b", 2);
        cache.clear();

        assert_eq!(cache.slot_count(), 0);
        assert_eq!(
            events.lock().unwrap().last(),
            Some(&CacheEvent::Clear { removed: 2 })
        );
    }

    #[test]
    fn test_fetch_reports_origin() {
        let cache: MemoizingCache<u32> = MemoizingCache::new();

        let first = cache.fetch("k", |_| Ok::<_, ()>(7)).unwrap();
        assert_eq!(first.origin, Origin::Loaded);
        assert!(!first.is_cached());

        let second = cache.fetch("k", |_| Ok::<_, ()>(8)).unwrap();
        assert_eq!(second.origin, Origin::Cached);
        assert_eq!(*second.value, 7);
    }

    #[test]
    fn test_get_does_not_load() {
        let cache: MemoizingCache<u32> = MemoizingCache::new();
        assert!(cache.get("missing").is_none());
        assert!(cache.is_empty());

        cache.set("present", 1);
        assert_eq!(cache.get("present").as_deref(), Some(&1));
        assert!(cache.contains_key("present"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_set_arc_keeps_identity() {
        let cache: MemoizingCache<String> = MemoizingCache::new();
        let shared = Arc::new("shared".to_string());
        cache.set_arc("k", Arc::clone(&shared));

        let got = cache.get_or_load("k", |_| unreachable!());
        assert!(Arc::ptr_eq(&shared, &got));
    }

    #[test]
    fn test_concurrent_same_key_loads_once() {
        const THREADS: usize = 16;

        let cache: Arc<MemoizingCache<String>> = Arc::new(MemoizingCache::new());
        let loads = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let loads = Arc::clone(&loads);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    cache.get_or_load("same-key", |_| {
                        loads.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(50));
                        "commonValue".to_string()
                    })
                })
            })
            .collect();

        let values: Vec<Arc<String>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        for value in &values {
            assert!(Arc::ptr_eq(value, &values[0]));
        }
    }

    #[test]
    fn test_different_keys_load_in_parallel() {
        let cache: Arc<MemoizingCache<u32>> = Arc::new(MemoizingCache::new());
        let (started_tx, started_rx) = std::sync::mpsc::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();

        let slow = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                cache.get_or_load("slow", move |_| {
                    started_tx.send(()).unwrap();
                    release_rx.recv().unwrap();
                    1
                })
            })
        };

        // The slow loader is parked; other keys must not wait on it.
        started_rx.recv().unwrap();
        assert_eq!(*cache.get_or_load("fast", |_| 2), 2);
        cache.set("other", 3);
        assert_eq!(cache.get("other").as_deref(), Some(&3));

        release_tx.send(()).unwrap();
        assert_eq!(*slow.join().unwrap(), 1);
    }

    #[test]
    fn test_set_during_inflight_load_wins() {
        let cache: Arc<MemoizingCache<String>> = Arc::new(MemoizingCache::new());
        let (started_tx, started_rx) = std::sync::mpsc::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();

        let loader = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                cache.get_or_load("k", move |_| {
                    started_tx.send(()).unwrap();
                    release_rx.recv().unwrap();
                    "loaded".to_string()
                })
            })
        };

        started_rx.recv().unwrap();
        cache.set("k", "written".to_string());
        release_tx.send(()).unwrap();

        // The loading thread still gets its own result.
        assert_eq!(&*loader.join().unwrap(), "loaded");
        // Everyone afterwards sees the write.
        assert_eq!(&*cache.get_or_load("k", |_| unreachable!()), "written");
    }

    #[test]
    fn test_clear_during_inflight_load_is_not_published() {
        let cache: Arc<MemoizingCache<u32>> = Arc::new(MemoizingCache::new());
        let (started_tx, started_rx) = std::sync::mpsc::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();

        let loader = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                cache.get_or_load("k", move |_| {
                    started_tx.send(()).unwrap();
                    release_rx.recv().unwrap();
                    1
                })
            })
        };

        started_rx.recv().unwrap();
        cache.clear();
        release_tx.send(()).unwrap();

        assert_eq!(*loader.join().unwrap(), 1);
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn test_stats() {
        let cache: MemoizingCache<u32> = MemoizingCache::new();
        cache.get_or_load("a", |_| 1);
        cache.get_or_load("a", |_| 1);
        let _ = cache.try_get_or_load("b", |_| Err::<u32, _>(()));
        cache.set("c", 3);
        cache.clear();

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.loads, 1);
        assert_eq!(stats.failed_loads, 1);
        assert_eq!(stats.sets, 1);
        assert_eq!(stats.clears, 1);
        assert_eq!(stats.size, 0);
    }

    #[test]
    fn test_stats_disabled() {
        let config = CacheConfig::builder().track_stats(false).build();
        let cache: MemoizingCache<u32> = MemoizingCache::with_config(config).unwrap();
        cache.get_or_load("a", |_| 1);
        cache.get_or_load("a", |_| 1);

        let stats = cache.stats();
        assert_eq!(stats.total_lookups(), 0);
        assert_eq!(stats.size, 1);
    }

    #[test]
    fn test_with_config_rejects_invalid() {
        let config = CacheConfig::builder().shard_amount(3).build();
        let result = MemoizingCache::<u32>::with_config(config);
        assert!(matches!(result, Err(CacheError::InvalidConfig { .. })));
    }

    #[test]
    fn test_with_config_sharded() {
        let config = CacheConfig::builder()
            .initial_capacity(64)
            .shard_amount(4)
            .build();
        let cache: MemoizingCache<u32> = MemoizingCache::with_config(config).unwrap();
        cache.set("x", 1);
        assert_eq!(cache.get("x").as_deref(), Some(&1));
    }

    #[test]
    fn test_trace_callback_events() {
        let cache: MemoizingCache<u32> = MemoizingCache::new();
        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();

        cache.set_trace_callback(move |e| {
            events_clone.lock().unwrap().push(e.to_string());
        });

        cache.get_or_load("k", |_| 1);
        cache.get_or_load("k", |_| 1);
        let _ = cache.try_get_or_load("bad", |_| Err::<u32, _>(()));
        cache.set("s", 2);
        cache.clear();

        let captured = events.lock().unwrap();
        assert_eq!(
            *captured,
            vec![
                "load { key: k, ok: true }",
                "hit { key: k }",
                "load { key: bad, ok: false }",
                "set { key: s }",
                "clear { removed: 2 }",
            ]
        );
    }

    #[test]
    fn test_clear_trace_callback_stops_events() {
        let cache: MemoizingCache<u32> = MemoizingCache::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();

        cache.set_trace_callback(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });
        cache.set("a", 1);
        cache.clear_trace_callback();
        cache.set("b", 2);

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_callback_may_use_cache() {
        let cache: Arc<MemoizingCache<u32>> = Arc::new(MemoizingCache::new());
        let weak = Arc::downgrade(&cache);

        cache.set_trace_callback(move |event| {
            if let (CacheEvent::Set { key }, Some(cache)) = (event, weak.upgrade()) {
                let _ = cache.get(key);
            }
        });

        cache.set("k", 1);
        assert_eq!(cache.get("k").as_deref(), Some(&1));
    }

    #[test]
    fn test_debug_format() {
        let cache: MemoizingCache<u32> = MemoizingCache::new();
        cache.set("a", 1);
        let debug = format!("{:?}", cache);
        assert!(debug.starts_with("MemoizingCache"));
        assert!(debug.contains("len: 1"));
    }
}
