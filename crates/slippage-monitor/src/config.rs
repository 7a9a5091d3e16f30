//! Monitor configuration.

use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::ConfigError;
use crate::report::DEFAULT_REPORT_PRECISION;

const ENV_PRODUCT_ID: &str = "SLIPPAGE_PRODUCT_ID";
const ENV_TICK_MS: &str = "SLIPPAGE_TICK_MS";
const ENV_TRADE_VOLUME: &str = "SLIPPAGE_TRADE_VOLUME";
const ENV_REPORT_PRECISION: &str = "SLIPPAGE_REPORT_PRECISION";

/// Settings for the measurement cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Instrument to track, e.g. `BTC-USD`.
    pub product_id: String,
    /// Period between measurement ticks, per side.
    pub tick_interval: Duration,
    /// Volume priced against the book on every tick.
    pub trade_volume: Decimal,
    /// Fractional digits in printed slippage.
    pub report_precision: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            product_id: "BTC-USD".to_string(),
            tick_interval: Duration::from_millis(1000),
            trade_volume: dec!(10),
            report_precision: DEFAULT_REPORT_PRECISION,
        }
    }
}

impl MonitorConfig {
    /// Defaults overridden by `SLIPPAGE_*` environment variables, validated.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(product_id) = lookup(ENV_PRODUCT_ID) {
            config.product_id = product_id.trim().to_string();
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, ENV_TICK_MS)? {
            config.tick_interval = Duration::from_millis(ms);
        }
        if let Some(volume) = parse_var::<Decimal, _>(&lookup, ENV_TRADE_VOLUME)? {
            config.trade_volume = volume;
        }
        if let Some(precision) = parse_var::<usize, _>(&lookup, ENV_REPORT_PRECISION)? {
            config.report_precision = precision;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_product_id(mut self, product_id: impl Into<String>) -> Self {
        self.product_id = product_id.into();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.product_id.is_empty() {
            return Err(ConfigError::EmptyProductId);
        }
        if self.tick_interval.is_zero() {
            return Err(ConfigError::ZeroTickInterval);
        }
        if self.trade_volume <= Decimal::ZERO {
            return Err(ConfigError::NonPositiveVolume(self.trade_volume));
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => {
            let parsed = value.trim().parse::<T>();
            parsed
                .map(Some)
                .map_err(|_| ConfigError::InvalidVar { name, value })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = MonitorConfig::default();
        assert_eq!(config.product_id, "BTC-USD");
        assert_eq!(config.tick_interval, Duration::from_secs(1));
        assert_eq!(config.trade_volume, dec!(10));
        assert_eq!(config.report_precision, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_no_overrides_gives_defaults() {
        let config = MonitorConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, MonitorConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = MonitorConfig::from_lookup(lookup_from(&[
            ("SLIPPAGE_PRODUCT_ID", "ETH-USD"),
            ("SLIPPAGE_TICK_MS", "250"),
            ("SLIPPAGE_TRADE_VOLUME", "2.5"),
            ("SLIPPAGE_REPORT_PRECISION", "6"),
        ]))
        .unwrap();

        assert_eq!(config.product_id, "ETH-USD");
        assert_eq!(config.tick_interval, Duration::from_millis(250));
        assert_eq!(config.trade_volume, dec!(2.5));
        assert_eq!(config.report_precision, 6);
    }

    #[test]
    fn test_unparseable_var() {
        let err = MonitorConfig::from_lookup(lookup_from(&[("SLIPPAGE_TICK_MS", "soon")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidVar {
                name: "SLIPPAGE_TICK_MS",
                value: "soon".to_string()
            }
        );
    }

    #[test]
    fn test_validation() {
        assert_eq!(
            MonitorConfig::from_lookup(lookup_from(&[("SLIPPAGE_TRADE_VOLUME", "0")])),
            Err(ConfigError::NonPositiveVolume(Decimal::ZERO))
        );
        assert_eq!(
            MonitorConfig::from_lookup(lookup_from(&[("SLIPPAGE_TICK_MS", "0")])),
            Err(ConfigError::ZeroTickInterval)
        );
        assert_eq!(
            MonitorConfig::default().with_product_id("").validate(),
            Err(ConfigError::EmptyProductId)
        );
    }
}
