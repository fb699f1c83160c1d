//! Configuration management for the futures testnet bot.

use crate::{Error, Result};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Default REST endpoint of the USD-M futures testnet.
pub const TESTNET_BASE_URL: &str = "https://testnet.binancefuture.com";
/// Default REST endpoint of the USD-M futures production venue.
pub const MAINNET_BASE_URL: &str = "https://fapi.binance.com";
/// Default log file, relative to the working directory.
pub const DEFAULT_LOG_FILE: &str = "trading_bot.log";
/// Largest `recvWindow` the exchange accepts, in milliseconds.
pub const MAX_RECV_WINDOW_MS: u64 = 60_000;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub binance: BinanceConfig,
    pub log: LogConfig,
}

#[derive(Clone, Deserialize)]
pub struct BinanceConfig {
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub base_url: String,
    pub testnet: bool,
    /// Optional `recvWindow` in milliseconds; the exchange default applies when unset.
    pub recv_window: Option<u64>,
}

impl std::fmt::Debug for BinanceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinanceConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_secret", &self.api_secret.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("testnet", &self.testnet)
            .field("recv_window", &self.recv_window)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    pub file: PathBuf,
}

impl Config {
    /// Load configuration from environment variables (and `.env`, if present).
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let testnet = match non_empty("BINANCE_TESTNET") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| Error::Config {
                message: format!("BINANCE_TESTNET must be true or false, got '{}'", raw),
            })?,
            None => true,
        };

        let base_url = non_empty("BINANCE_FUTURES_URL").unwrap_or_else(|| {
            if testnet {
                TESTNET_BASE_URL.to_string()
            } else {
                MAINNET_BASE_URL.to_string()
            }
        });

        let recv_window = non_empty("BINANCE_RECV_WINDOW")
            .map(|raw| parse_recv_window(&raw))
            .transpose()?;

        Ok(Self {
            binance: BinanceConfig {
                api_key: non_empty("BINANCE_API_KEY"),
                api_secret: non_empty("BINANCE_API_SECRET"),
                base_url: base_url.trim_end_matches('/').to_string(),
                testnet,
                recv_window,
            },
            log: LogConfig {
                file: non_empty("TRADING_BOT_LOG")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
            },
        })
    }
}

/// Parse and range-check a `recvWindow` value.
pub fn parse_recv_window(raw: &str) -> Result<u64> {
    let value: u64 = raw.trim().parse().map_err(|_| Error::Config {
        message: format!("recvWindow must be a whole number of milliseconds, got '{}'", raw),
    })?;
    if value == 0 || value > MAX_RECV_WINDOW_MS {
        return Err(Error::Config {
            message: format!(
                "recvWindow must be between 1 and {} ms, got {}",
                MAX_RECV_WINDOW_MS, value
            ),
        });
    }
    Ok(value)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_point_at_testnet() {
        let config = config_from(&[]).unwrap();

        assert!(config.binance.testnet);
        assert_eq!(config.binance.base_url, TESTNET_BASE_URL);
        assert_eq!(config.binance.recv_window, None);
        assert!(config.binance.api_key.is_none());
        assert_eq!(config.log.file, PathBuf::from(DEFAULT_LOG_FILE));
    }

    #[test]
    fn test_explicit_values() {
        let config = config_from(&[
            ("BINANCE_API_KEY", "key"),
            ("BINANCE_API_SECRET", "secret"),
            ("BINANCE_FUTURES_URL", "http://localhost:8080/"),
            ("BINANCE_RECV_WINDOW", "5000"),
            ("TRADING_BOT_LOG", "/tmp/bot.log"),
        ])
        .unwrap();

        assert_eq!(config.binance.api_key.as_deref(), Some("key"));
        assert_eq!(config.binance.base_url, "http://localhost:8080");
        assert_eq!(config.binance.recv_window, Some(5000));
        assert_eq!(config.log.file, PathBuf::from("/tmp/bot.log"));
    }

    #[test]
    fn test_mainnet_default_url() {
        let config = config_from(&[("BINANCE_TESTNET", "false")]).unwrap();
        assert!(!config.binance.testnet);
        assert_eq!(config.binance.base_url, MAINNET_BASE_URL);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(config_from(&[("BINANCE_RECV_WINDOW", "abc")]).is_err());
        assert!(config_from(&[("BINANCE_RECV_WINDOW", "90000")]).is_err());
        assert!(config_from(&[("BINANCE_TESTNET", "maybe")]).is_err());
    }

    #[test]
    fn test_blank_credentials_are_absent() {
        let config = config_from(&[("BINANCE_API_KEY", "  ")]).unwrap();
        assert!(config.binance.api_key.is_none());
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let config = config_from(&[
            ("BINANCE_API_KEY", "visible-key"),
            ("BINANCE_API_SECRET", "visible-secret"),
        ])
        .unwrap();

        let debug_str = format!("{:?}", config);
        assert!(!debug_str.contains("visible-key"));
        assert!(!debug_str.contains("visible-secret"));
    }
}
