use std::str::FromStr;

use chrono::TimeDelta;
use thiserror::Error;

pub const DEFAULT_CHANNEL_BUFFER: usize = 100;
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;
pub const DEFAULT_LOG_FILTER: &str = "info";

const CHANNEL_BUFFER_KEY: &str = "WEBSHOP_CHANNEL_BUFFER";
const TOKEN_TTL_KEY: &str = "WEBSHOP_TOKEN_TTL_SECS";
const LOG_KEY: &str = "WEBSHOP_LOG";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Runtime settings for the shop system.
#[derive(Debug, Clone, PartialEq)]
pub struct ShopConfig {
    /// Mailbox capacity of every actor.
    pub channel_buffer: usize,
    /// Lifetime of an access token from the moment it is issued.
    pub token_ttl: TimeDelta,
    /// Tracing filter used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            channel_buffer: DEFAULT_CHANNEL_BUFFER,
            token_ttl: TimeDelta::seconds(DEFAULT_TOKEN_TTL_SECS),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl ShopConfig {
    /// Defaults overridden by `WEBSHOP_CHANNEL_BUFFER`, `WEBSHOP_TOKEN_TTL_SECS` and `WEBSHOP_LOG`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(buffer) = parse::<usize>(&lookup, CHANNEL_BUFFER_KEY)? {
            if buffer == 0 {
                return Err(invalid(CHANNEL_BUFFER_KEY, buffer));
            }
            config.channel_buffer = buffer;
        }
        if let Some(secs) = parse::<i64>(&lookup, TOKEN_TTL_KEY)? {
            config.token_ttl = TimeDelta::try_seconds(secs)
                .filter(|ttl| *ttl > TimeDelta::zero())
                .ok_or_else(|| invalid(TOKEN_TTL_KEY, secs))?;
        }
        if let Some(filter) = lookup(LOG_KEY).filter(|f| !f.trim().is_empty()) {
            config.log_filter = filter;
        }

        Ok(config)
    }
}

fn parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<Option<T>, ConfigError> {
    lookup(key)
        .map(|raw| raw.trim().parse::<T>().map_err(|_| invalid(key, raw)))
        .transpose()
}

fn invalid(key: &'static str, value: impl ToString) -> ConfigError {
    ConfigError::Invalid { key, value: value.to_string() }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ShopConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ShopConfig::default());
        assert_eq!(config.channel_buffer, 100);
        assert_eq!(config.token_ttl, TimeDelta::days(1));
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_overrides() {
        let config = ShopConfig::from_lookup(lookup(&[
            ("WEBSHOP_CHANNEL_BUFFER", "8"),
            ("WEBSHOP_TOKEN_TTL_SECS", "3600"),
            ("WEBSHOP_LOG", "webshop=debug"),
        ]))
        .unwrap();
        assert_eq!(config.channel_buffer, 8);
        assert_eq!(config.token_ttl, TimeDelta::hours(1));
        assert_eq!(config.log_filter, "webshop=debug");
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            ShopConfig::from_lookup(lookup(&[("WEBSHOP_CHANNEL_BUFFER", "lots")])),
            Err(ConfigError::Invalid { key: "WEBSHOP_CHANNEL_BUFFER", value: "lots".to_string() })
        );
        assert!(ShopConfig::from_lookup(lookup(&[("WEBSHOP_CHANNEL_BUFFER", "0")])).is_err());
        assert!(ShopConfig::from_lookup(lookup(&[("WEBSHOP_TOKEN_TTL_SECS", "-5")])).is_err());
        assert!(ShopConfig::from_lookup(lookup(&[("WEBSHOP_TOKEN_TTL_SECS", "0")])).is_err());
    }
}
