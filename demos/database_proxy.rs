//! Read-through proxy example for singleton-cache.
//!
//! Demonstrates:
//! - Putting a `CachingProxy` in front of a slow `DataSource`
//! - Repeated queries answered from the cache
//! - Clearing the cache to force fresh reads
//!
//! Run with: `cargo run --example database_proxy`

use singleton_cache::{CacheError, CachingProxy, DataSource, Origin};
use std::thread;
use std::time::{Duration, Instant};

/// Pretend database with expensive queries.
struct SlowDatabase {
    started: Instant,
}

impl DataSource for SlowDatabase {
    fn fetch(&self, query: &str) -> Result<String, CacheError> {
        println!("   [database] running slow query: '{query}'");
        thread::sleep(Duration::from_millis(500));
        Ok(format!(
            "rows for '{query}' read at +{}ms",
            self.started.elapsed().as_millis()
        ))
    }
}

fn run(proxy: &CachingProxy<SlowDatabase>, label: &str, query: &str) {
    println!("\n{label}");
    match proxy.fetch_with_origin(query) {
        Ok(fetched) => {
            let suffix = match fetched.origin {
                Origin::Cached => " (from cache)",
                Origin::Loaded => "",
            };
            println!("   result: {}{suffix}", fetched.value);
        }
        Err(e) => println!("   error: {e}"),
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    println!("=== singleton-cache: Database Proxy ===");

    let proxy = CachingProxy::new(SlowDatabase {
        started: Instant::now(),
    });

    const USERS: &str = "SELECT * FROM Users WHERE Active=1";
    const PRODUCTS: &str = "SELECT Name, Price FROM Products";

    run(&proxy, "1. First users query", USERS);
    run(&proxy, "2. Second users query", USERS);
    run(&proxy, "3. First products query", PRODUCTS);
    run(&proxy, "4. Third users query", USERS);
    run(&proxy, "5. Second products query", PRODUCTS);

    println!("\n6. Clearing the cache...");
    proxy.clear_cache();

    run(&proxy, "7. Users query after clear", USERS);

    let stats = proxy.stats();
    println!(
        "\n   source queries: {}, cache hits: {}",
        stats.loads, stats.hits
    );
    println!("\n=== Example Complete ===");
}
