//! Cache configuration and builder.
//!
//! The cache is unbounded and has no expiry, so the knobs are limited to
//! how the underlying concurrent map is sized and whether counters are kept.

use crate::CacheError;

/// Default number of slots reserved up front.
pub const DEFAULT_INITIAL_CAPACITY: usize = 16;

/// Configuration for a [`MemoizingCache`](crate::MemoizingCache).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Number of keys to reserve space for.
    pub initial_capacity: usize,

    /// Number of map shards (None = let the map pick from the CPU count).
    /// Must be a power of two greater than one.
    pub shard_amount: Option<usize>,

    /// Whether hit/miss/load counters are updated.
    pub track_stats: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            shard_amount: None,
            track_stats: true,
        }
    }
}

impl CacheConfig {
    /// Create a new configuration builder
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Checks that the configuration can be turned into a cache.
    ///
    /// # Errors
    ///
    /// [`CacheError::InvalidConfig`] when `shard_amount` is not a power of two
    /// greater than one.
    pub fn validate(&self) -> Result<(), CacheError> {
        if let Some(shards) = self.shard_amount {
            if shards < 2 || !shards.is_power_of_two() {
                return Err(CacheError::invalid_config(format!(
                    "shard amount must be a power of two greater than one, got {shards}"
                )));
            }
        }
        Ok(())
    }
}

/// Builder for [`CacheConfig`] with fluent API
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.config.initial_capacity = capacity;
        self
    }

    pub fn shard_amount(mut self, shards: usize) -> Self {
        self.config.shard_amount = Some(shards);
        self
    }

    pub fn track_stats(mut self, enabled: bool) -> Self {
        self.config.track_stats = enabled;
        self
    }

    /// Finish building; validation happens when the cache is created.
    pub fn build(self) -> CacheConfig {
        self.config
    }
}
