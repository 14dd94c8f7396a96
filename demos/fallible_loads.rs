//! Fallible loads example for singleton-cache.
//!
//! Demonstrates:
//! - A loader that can fail
//! - Failures are reported to the caller and never cached
//! - Watching cache activity through the trace callback
//!
//! Run with: `cargo run --example fallible_loads`

use singleton_cache::{CacheError, MemoizingCache};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Fails on the first attempt, succeeds afterwards.
fn flaky_source(attempts: &AtomicUsize, key: &str) -> Result<String, CacheError> {
    let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
    if attempt == 1 {
        Err(CacheError::load_failed(key, "connection reset"))
    } else {
        Ok(format!("{key} (attempt {attempt})"))
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    println!("=== singleton-cache: Fallible Loads ===\n");

    let cache: MemoizingCache<String> = MemoizingCache::new();
    cache.set_trace_callback(|event| println!("   [trace] {event}"));

    let attempts = AtomicUsize::new(0);

    for round in 1..=3 {
        println!("{round}. Looking up 'profile'...");
        match cache.try_get_or_load("profile", |key| flaky_source(&attempts, key)) {
            Ok(value) => println!("   value: {value}"),
            Err(e) => println!("   error: {e}"),
        }
    }

    println!("\n   source attempts: {}", attempts.load(Ordering::SeqCst));
    println!("   failed loads:    {}", cache.stats().failed_loads);
    println!("\n=== Example Complete ===");
}
