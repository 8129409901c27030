//! Structured logging setup using `tracing-subscriber`.
//!
//! The library only emits `tracing` events; embedding applications usually
//! install their own subscriber. These helpers cover tools and tests that
//! do not:
//! - **Console** ([`init_cli`]): human-readable output on stderr
//! - **JSON** ([`init_json`]): one JSON object per event on stderr
//!
//! Both honour `RUST_LOG` (default: `info`) and tolerate a subscriber that is
//! already installed.

use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialise human-readable logging to stderr.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_cli() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install console subscriber: {e}"))
}

/// Initialise JSON logging to stderr.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_json() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install JSON subscriber: {e}"))
}
