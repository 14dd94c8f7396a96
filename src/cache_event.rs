/// Events emitted by a cache during operations.
///
/// These events are passed to the tracing callback set via
/// [`MemoizingCache::set_trace_callback`](crate::MemoizingCache::set_trace_callback).
/// The `Clone` derive allows callbacks to store or forward events if needed.
///
/// # Examples
///
/// ```rust
/// use singleton_cache::CacheEvent;
///
/// let event = CacheEvent::Hit { key: "users".to_string() };
/// assert_eq!(event.to_string(), "hit { key: users }");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// A lookup was served from a stored value, or joined a concurrent
    /// caller's successful load.
    Hit {
        /// The key that was requested
        key: String,
    },

    /// A lookup missed and the loader was run.
    Load {
        /// The key that was loaded
        key: String,
        /// Whether the loader produced a value (failed loads are not stored)
        ok: bool,
    },

    /// A value was stored explicitly.
    Set {
        /// The key that was written
        key: String,
    },

    /// The cache was emptied.
    Clear {
        /// Number of slots dropped by the clear
        removed: usize,
    },
}

impl std::fmt::Display for CacheEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheEvent::Hit { key } => write!(f, "hit {{ key: {key} }}"),
            CacheEvent::Load { key, ok } => write!(f, "load {{ key: {key}, ok: {ok} }}"),
            CacheEvent::Set { key } => write!(f, "set {{ key: {key} }}"),
            CacheEvent::Clear { removed } => write!(f, "clear {{ removed: {removed} }}"),
        }
    }
}
