//! Shared utilities: logging setup, reconnect backoff and feed environment.

mod backoff;
mod environment;

pub use backoff::ExponentialBackoff;
pub use environment::{CoinbaseEnvironment, ParseEnvironmentError};

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info";

/// Installs the global `tracing` subscriber.
///
/// Honors `RUST_LOG`; safe to call more than once (later calls are ignored).
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
