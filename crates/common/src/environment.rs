//! Coinbase Exchange environment configuration.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Coinbase Exchange environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoinbaseEnvironment {
    /// Live market data.
    #[default]
    Production,
    /// Public sandbox with synthetic markets.
    Sandbox,
}

impl CoinbaseEnvironment {
    /// Websocket feed URL.
    pub fn ws_feed_url(&self) -> &'static str {
        match self {
            Self::Production => "wss://ws-feed.exchange.coinbase.com",
            Self::Sandbox => "wss://ws-feed-public.sandbox.exchange.coinbase.com",
        }
    }

    pub fn is_sandbox(&self) -> bool {
        matches!(self, Self::Sandbox)
    }

    /// Reads `COINBASE_ENVIRONMENT`, falling back to `Production`.
    pub fn from_env() -> Self {
        std::env::var("COINBASE_ENVIRONMENT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }
}

impl fmt::Display for CoinbaseEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Production => write!(f, "production"),
            Self::Sandbox => write!(f, "sandbox"),
        }
    }
}

impl FromStr for CoinbaseEnvironment {
    type Err = ParseEnvironmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" | "live" => Ok(Self::Production),
            "sandbox" | "test" | "testnet" => Ok(Self::Sandbox),
            _ => Err(ParseEnvironmentError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("invalid environment '{0}', expected 'production' or 'sandbox'")]
pub struct ParseEnvironmentError(String);
