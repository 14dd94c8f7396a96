//! # Singleton Cache
//!
//! A lazily created, process-wide memoizing cache that is safe to share across threads.
//!
//! The crate has two layers:
//!
//! - [`MemoizingCache`] maps string keys to shared values. On a miss it runs the
//!   caller's loader **exactly once per key**, even when many threads miss at the
//!   same moment; loads of different keys proceed in parallel.
//! - [`SingletonRegistry`] builds one instance of a value on first demand and hands
//!   the same `Arc` to every caller. [`define_cache!`] wires the two together.
//!
//! ## Quick Start
//!
//! ```rust
//! use singleton_cache::define_cache;
//!
//! define_cache!(cache_manager, String);
//!
//! let value = cache_manager::get_or_load("commonKey", |_| "commonValue".to_string());
//! assert_eq!(&*value, "commonValue");
//!
//! cache_manager::set("key-0", "Value set by Task 0".to_string());
//! let stored = cache_manager::get_or_load("key-0", |_| unreachable!());
//! assert_eq!(&*stored, "Value set by Task 0");
//! ```
//!
//! ## Features
//!
//! - **Exactly-once loads**: concurrent misses on one key share a single loader run
//! - **Failures are not cached**: a failed load is retried on the next lookup
//! - **Explicit handles**: callers get an `Arc` and can pass it around instead of
//!   reaching for globals
//! - **Tracing support**: `tracing` logs plus an optional per-cache event callback
//! - **Read-through proxy**: [`CachingProxy`] puts a cache in front of any [`DataSource`]

mod cache;
mod cache_config;
mod cache_error;
mod cache_event;
mod cache_stats;
mod macros;
mod proxy;
mod registry;

pub use cache::{Fetched, MemoizingCache, Origin, TraceCallback};
pub use cache_config::{CacheConfig, CacheConfigBuilder, DEFAULT_INITIAL_CAPACITY};
pub use cache_error::{BoxError, CacheError};
pub use cache_event::CacheEvent;
pub use cache_stats::CacheStatsSnapshot;
pub use proxy::{CachingProxy, DataSource};
pub use registry::{CacheHandle, CacheRegistry, SingletonRegistry};
