//! Slippage monitor error types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Invalid monitor configuration. Fatal at start-up only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Environment variable present but unparseable.
    #[error("invalid value for {name}: '{value}'")]
    InvalidVar { name: &'static str, value: String },

    #[error("product id must not be empty")]
    EmptyProductId,

    #[error("tick interval must be greater than zero")]
    ZeroTickInterval,

    #[error("trade volume must be positive, got {0}")]
    NonPositiveVolume(Decimal),
}

/// Errors that stop the monitor.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Feed event channel closed without a shutdown signal.
    #[error("event channel closed")]
    ChannelClosed,
}
