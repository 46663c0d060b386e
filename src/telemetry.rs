//! Tracing subscriber setup
//!
//! The library only emits `tracing` events. Binaries and tests opt into output here.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "deferred=info";

/// Install a global fmt subscriber filtered by `RUST_LOG` (or [`DEFAULT_FILTER`])
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .try_init()
        .is_ok()
}

/// Like [`init_tracing`], but writes through the test harness so output is captured per test
pub fn init_test_tracing() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_test_writer()
        .try_init()
        .is_ok()
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
