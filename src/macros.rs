//! Macros for declaring process-wide caches.

/// Declares a lazily created, process-wide [`MemoizingCache`](crate::MemoizingCache)
/// with a single macro invocation.
///
/// The macro generates a module containing:
/// - A hidden static [`SingletonRegistry`](crate::SingletonRegistry)
/// - Free functions (`instance`, `get_or_load`, `try_get_or_load`, `set`, `clear`,
///   `is_initialized`) that go through that registry
///
/// The cache is built on first use. An optional third argument is the
/// expression used to build it.
///
/// # Examples
///
/// ```rust
/// use singleton_cache::define_cache;
/// use std::sync::Arc;
///
/// define_cache!(cache_manager, String);
///
/// let value = cache_manager::get_or_load("commonKey", |_| "commonValue".to_string());
/// assert_eq!(&*value, "commonValue");
///
/// cache_manager::set("key-0", "Value set by Task 0".to_string());
///
/// // Every handle is the same instance.
/// assert!(Arc::ptr_eq(&cache_manager::instance(), &cache_manager::instance()));
/// ```
///
/// # Custom construction
///
/// ```rust
/// use singleton_cache::define_cache;
///
/// define_cache!(lookups, u64, singleton_cache::MemoizingCache::with_capacity(1024));
///
/// assert!(!lookups::is_initialized());
/// lookups::set("answer", 42);
/// assert!(lookups::is_initialized());
/// ```
#[macro_export]
macro_rules! define_cache {
    ($name:ident, $value:ty) => {
        $crate::define_cache!($name, $value, $crate::MemoizingCache::<$value>::new());
    };
    ($name:ident, $value:ty, $init:expr) => {
        #[allow(dead_code)]
        pub mod $name {
            #[allow(unused_imports)]
            use super::*;
            use std::sync::Arc;

            // Holds the one cache instance (module-private)
            static REGISTRY: $crate::SingletonRegistry<$crate::MemoizingCache<$value>> =
                $crate::SingletonRegistry::new(|| $init);

            /// Shared handle to the cache, created on first call.
            pub fn instance() -> $crate::CacheHandle<$value> {
                REGISTRY.get_instance()
            }

            /// Whether the cache has been created yet.
            pub fn is_initialized() -> bool {
                REGISTRY.is_initialized()
            }

            /// Return the cached value for `key`, loading it once on a miss.
            pub fn get_or_load(key: &str, load: impl FnOnce(&str) -> $value) -> Arc<$value> {
                instance().get_or_load(key, load)
            }

            /// Fallible load; failures are returned and not cached.
            pub fn try_get_or_load<E>(
                key: &str,
                load: impl FnOnce(&str) -> Result<$value, E>,
            ) -> Result<Arc<$value>, E> {
                instance().try_get_or_load(key, load)
            }

            /// Store `value` under `key`, replacing any previous value.
            pub fn set(key: impl Into<String>, value: $value) {
                instance().set(key, value)
            }

            /// Drop every cached entry.
            pub fn clear() {
                instance().clear()
            }
        }
    };
}
