pub mod buckets;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod fuzzy;
pub mod gap;
pub mod handlers;
pub mod metrics;
pub mod oracle;
pub mod pricing;
pub mod server;
pub mod signals;
pub mod vocabulary;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing/logging
///
/// `RUST_LOG` wins over `default_level`. `format` is either `"text"` or
/// `"json"`; anything else falls back to text.
pub fn init_tracing(default_level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if format == "json" {
        registry
            .with(fmt::layer().json().with_current_span(true))
            .try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    if let Err(e) = result {
        eprintln!("Warning: tracing already initialized: {}", e);
    }
}
