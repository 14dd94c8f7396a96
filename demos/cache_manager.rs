//! Shared cache manager example for singleton-cache.
//!
//! Demonstrates:
//! - Lazy, one-time creation of a process-wide cache
//! - Five threads loading the same key (the slow source runs once)
//! - Writes from one thread visible to every other thread
//!
//! Run with: `RUST_LOG=debug cargo run --example cache_manager`

use singleton_cache::define_cache;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// One cache for the whole process
define_cache!(cache_manager, String);

/// Stand-in for a slow external source.
fn load_from_source(key: &str) -> String {
    println!("   {:?}: loading '{key}' from external source...", thread::current().id());
    thread::sleep(Duration::from_millis(100));
    "commonValue".to_string()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== singleton-cache: Cache Manager ===\n");

    // -------------------------------------------------------------------------
    // 1. Obtain the instance twice
    // -------------------------------------------------------------------------
    println!("1. Obtaining the cache manager...");

    println!("   initialized before first use? {}", cache_manager::is_initialized());
    let cache1 = cache_manager::instance();
    let cache2 = cache_manager::instance();
    println!("   cache1 == cache2? {}", Arc::ptr_eq(&cache1, &cache2));

    // -------------------------------------------------------------------------
    // 2. Five tasks share the cache
    // -------------------------------------------------------------------------
    println!("\n2. Starting five tasks...");

    let handles: Vec<_> = (0..5)
        .map(|task_id| {
            let cache1 = Arc::clone(&cache1);
            thread::spawn(move || {
                let cache = cache_manager::instance();
                println!("   Task {task_id}: got cache manager instance");

                let common = cache.get_or_load("commonKey", load_from_source);
                println!("   Task {task_id}: commonKey = '{common}'");

                thread::sleep(Duration::from_millis(50 + task_id * 10));
                cache.set(format!("key-{task_id}"), format!("Value set by Task {task_id}"));

                if task_id > 0 {
                    let first = cache.get_or_load("key-0", load_from_source);
                    println!("   Task {task_id}: key-0 = '{first}'");
                }

                println!(
                    "   Task {task_id}: instance == cache1? {}",
                    Arc::ptr_eq(&cache, &cache1)
                );
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("task panicked");
    }

    // -------------------------------------------------------------------------
    // 3. Inspect the shared state
    // -------------------------------------------------------------------------
    println!("\n3. All tasks completed.");

    let stats = cache1.stats();
    println!("   entries: {}", stats.size);
    println!("   loads:   {}", stats.loads);
    println!("   hits:    {} (hit rate {:.0}%)", stats.hits, stats.hit_rate() * 100.0);

    println!("\n=== Example Complete ===");
}
