use std::error::Error;

/// Boxed error produced by a data source.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Errors surfaced by the cache and its collaborators.
///
/// Plain in-memory operations (`get_or_load`, `set`, `clear`) never fail;
/// these variants cover configuration and fallible data sources.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The supplied configuration cannot be used to build a cache.
    #[error("invalid cache configuration: {reason}")]
    InvalidConfig {
        /// What is wrong with the configuration.
        reason: String,
    },

    /// A data source failed to produce a value for `key`.
    #[error("failed to load '{key}' from source")]
    LoadFailed {
        /// The key that was being loaded.
        key: String,
        /// The underlying failure.
        #[source]
        source: BoxError,
    },
}

impl CacheError {
    /// Wraps any source error as a [`CacheError::LoadFailed`] for `key`.
    pub fn load_failed(key: impl Into<String>, source: impl Into<BoxError>) -> Self {
        CacheError::LoadFailed {
            key: key.into(),
            source: source.into(),
        }
    }

    /// Shorthand for [`CacheError::InvalidConfig`].
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        CacheError::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Key of a failed load, if this is one.
    pub fn key(&self) -> Option<&str> {
        match self {
            CacheError::LoadFailed { key, .. } => Some(key),
            CacheError::InvalidConfig { .. } => None,
        }
    }
}
