//! Tracing subscriber setup.
//!
//! The library only emits events; binaries and tests opt in to a
//! subscriber by calling `init_tracing`.

use tracing_subscriber::EnvFilter;

use crate::config::RowmapConfig;

/// Install a global fmt subscriber. `RUST_LOG` overrides `default_level`.
/// Returns false if a global subscriber was already installed.
pub fn init_tracing(default_level: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

/// `init_tracing` with the level from config.
pub fn init_from_config(config: &RowmapConfig) -> bool {
    init_tracing(config.effective_log_level())
}
