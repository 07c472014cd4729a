//! Tracing subscriber setup shared by both binaries.

use tracing_subscriber::EnvFilter;

/// Used when `RUST_LOG` is unset or invalid
pub const DEFAULT_FILTER: &str = "info,swift_codes=debug";

/// Install the global fmt subscriber. Safe to call more than once.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
