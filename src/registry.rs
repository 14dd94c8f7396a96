//! Lazily created, process-wide singleton holder.
//!
//! A [`SingletonRegistry`] owns at most one instance of `T`. The instance is
//! built on the first call to [`get_instance`](SingletonRegistry::get_instance);
//! callers racing on that first call block until the single construction is
//! finished and then all receive the same `Arc`.
//!
//! `new` is `const`, so a registry is normally placed in a `static`:
//!
//! ```
//! use singleton_cache::{MemoizingCache, SingletonRegistry};
//! use std::sync::Arc;
//!
//! static CACHE: SingletonRegistry<MemoizingCache<String>> =
//!     SingletonRegistry::new(MemoizingCache::new);
//!
//! let a = CACHE.get_instance();
//! let b = CACHE.get_instance();
//! assert!(Arc::ptr_eq(&a, &b));
//! ```

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{info, warn};

use crate::MemoizingCache;

/// Shared handle to a process-wide cache.
pub type CacheHandle<V> = Arc<MemoizingCache<V>>;

/// Registry holding a single shared cache of `V` values.
pub type CacheRegistry<V> = SingletonRegistry<MemoizingCache<V>>;

/// Holds one lazily constructed instance of `T`.
///
/// There is no reset: once built, the instance lives as long as the registry.
pub struct SingletonRegistry<T> {
    instance: OnceCell<Arc<T>>,
    init: fn() -> T,
}

impl<T> SingletonRegistry<T> {
    /// Creates an empty registry that will build its instance with `init`.
    pub const fn new(init: fn() -> T) -> Self {
        Self {
            instance: OnceCell::new(),
            init,
        }
    }
}

impl<T: Send + Sync + 'static> SingletonRegistry<T> {
    /// Returns the shared instance, constructing it on first use.
    ///
    /// `init` runs exactly once no matter how many threads call this
    /// concurrently; the construction happens-before every returned handle.
    pub fn get_instance(&self) -> Arc<T> {
        let instance = self.instance.get_or_init(|| {
            let instance = Arc::new((self.init)());
            info!(
                type_name = std::any::type_name::<T>(),
                "singleton instance created"
            );
            instance
        });
        Arc::clone(instance)
    }

    /// Returns the shared instance, building it with a fallible `init` if the
    /// registry is still empty.
    ///
    /// If the registry is already initialized, `init` is not called. If `init`
    /// fails, nothing is stored and the error is returned; a caller that was
    /// waiting on the failed construction then runs its own `init`.
    pub fn try_get_instance_with<E, F>(&self, init: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.instance
            .get_or_try_init(|| match init() {
                Ok(value) => {
                    info!(
                        type_name = std::any::type_name::<T>(),
                        "singleton instance created"
                    );
                    Ok(Arc::new(value))
                }
                Err(err) => {
                    warn!(
                        type_name = std::any::type_name::<T>(),
                        "singleton construction failed"
                    );
                    Err(err)
                }
            })
            .map(Arc::clone)
    }

    /// Returns the instance if it has been built, without building it.
    pub fn get(&self) -> Option<Arc<T>> {
        self.instance.get().cloned()
    }

    /// Whether the instance has been created yet.
    pub fn is_initialized(&self) -> bool {
        self.instance.get().is_some()
    }
}

impl<T> fmt::Debug for SingletonRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingletonRegistry")
            .field("type_name", &std::any::type_name::<T>())
            .field("initialized", &self.instance.get().is_some())
            .finish()
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
