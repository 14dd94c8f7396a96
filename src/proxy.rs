//! Read-through caching proxy.
//!
//! [`CachingProxy`] wraps any [`DataSource`] and is itself a `DataSource`, so
//! callers cannot tell whether they talk to the real source or the proxy. The
//! first fetch of a query goes to the source; repeats are answered from a
//! [`MemoizingCache`]. Failed fetches are never cached.

use std::sync::Arc;

use tracing::debug;

use crate::{CacheConfig, CacheError, CacheStatsSnapshot, Fetched, MemoizingCache};

/// A possibly slow source of string results keyed by query text.
pub trait DataSource: Send + Sync {
    /// Produces the result for `query`.
    fn fetch(&self, query: &str) -> Result<String, CacheError>;
}

impl<S: DataSource + ?Sized> DataSource for Arc<S> {
    fn fetch(&self, query: &str) -> Result<String, CacheError> {
        (**self).fetch(query)
    }
}

impl<S: DataSource + ?Sized> DataSource for Box<S> {
    fn fetch(&self, query: &str) -> Result<String, CacheError> {
        (**self).fetch(query)
    }
}

/// Caches results of an inner [`DataSource`].
#[derive(Debug)]
pub struct CachingProxy<S> {
    source: S,
    cache: MemoizingCache<String>,
}

impl<S: DataSource> CachingProxy<S> {
    /// Wraps `source` with a default-configured cache.
    pub fn new(source: S) -> Self {
        debug!("caching proxy initialized");
        Self {
            source,
            cache: MemoizingCache::new(),
        }
    }

    /// # Errors
    ///
    /// [`CacheError::InvalidConfig`] if `config` does not validate.
    pub fn with_config(source: S, config: CacheConfig) -> Result<Self, CacheError> {
        let cache = MemoizingCache::with_config(config)?;
        debug!("caching proxy initialized");
        Ok(Self {
            source,
            cache,
        })
    }

    /// Fetches `query`, reporting whether the answer came from the cache.
    pub fn fetch_with_origin(&self, query: &str) -> Result<Fetched<String>, CacheError> {
        self.cache.fetch(query, |q| self.source.fetch(q))
    }

    /// Forgets every cached result; the next fetch of any query hits the source.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Counters of the underlying cache.
    pub fn stats(&self) -> CacheStatsSnapshot {
        self.cache.stats()
    }

    /// The underlying cache.
    pub fn cache(&self) -> &MemoizingCache<String> {
        &self.cache
    }

    /// The wrapped source.
    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: DataSource> DataSource for CachingProxy<S> {
    fn fetch(&self, query: &str) -> Result<String, CacheError> {
        self.fetch_with_origin(query)
            .map(|fetched| (*fetched.value).clone())
    }
}
