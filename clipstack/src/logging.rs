//! Structured logging setup
//!
//! The library only emits `tracing` events. Hosts either install their own
//! subscriber or call `init_logging` once at startup.

use tracing_subscriber::EnvFilter;

/// Filter used when neither the argument nor `RUST_LOG` is set
const DEFAULT_FILTER: &str = "clipstack=info";

/// Install a fmt subscriber. `filter` uses `EnvFilter` syntax
/// (e.g. `"clipstack=debug"`); `None` falls back to `RUST_LOG`, then to
/// `clipstack=info`. Safe to call more than once: later calls are ignored.
#[uniffi::export]
pub fn init_logging(filter: Option<String>) {
    let filter = match filter {
        Some(directives) => EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
