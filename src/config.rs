//! Relay configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).
//!
//! | Variable                  | Default                                  |
//! |---------------------------|------------------------------------------|
//! | `LISTEN_ADDR`             | `0.0.0.0:8080`                           |
//! | `ENRICHMENT_URL`          | `http://127.0.0.1:5000/predict/anomaly`  |
//! | `ENRICHMENT_TIMEOUT_MS`   | `2000`                                   |
//! | `OUTBOUND_QUEUE_CAPACITY` | `64`                                     |
//! | `LOG_FORMAT`              | `text` (`json` for structured output)    |

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use reqwest::Url;

use crate::error::RelayError;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_ENRICHMENT_URL: &str = "http://127.0.0.1:5000/predict/anomaly";
const DEFAULT_ENRICHMENT_TIMEOUT_MS: u64 = 2_000;
const DEFAULT_OUTBOUND_QUEUE_CAPACITY: usize = 64;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(RelayError::Config(format!("unknown LOG_FORMAT {other:?}"))),
        }
    }
}

/// Top-level relay configuration.
///
/// Loaded once at startup via [`RelayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Socket address to bind the listener to (e.g. `0.0.0.0:8080`).
    pub listen_addr: SocketAddr,

    /// Endpoint of the anomaly-detection service.
    pub enrichment_url: Url,

    /// Upper bound on a single enrichment request.
    pub enrichment_timeout: Duration,

    /// Frames buffered per connection before it is considered unresponsive.
    pub outbound_queue_capacity: usize,

    /// Log output format.
    pub log_format: LogFormat,
}

impl RelayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file, then
    /// delegates to [`RelayConfig::from_lookup`].
    ///
    /// # Errors
    ///
    /// See [`RelayConfig::from_lookup`].
    pub fn from_env() -> Result<Self, RelayError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Missing keys fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Config`] if `LISTEN_ADDR` or `ENRICHMENT_URL`
    /// cannot be parsed, if `LOG_FORMAT` is unknown, or if a numeric setting
    /// is malformed or zero.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RelayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let listen_addr = lookup("LISTEN_ADDR")
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|err| RelayError::Config(format!("LISTEN_ADDR: {err}")))?;

        let enrichment_url = lookup("ENRICHMENT_URL")
            .unwrap_or_else(|| DEFAULT_ENRICHMENT_URL.to_string());
        let enrichment_url = Url::parse(&enrichment_url)
            .map_err(|err| RelayError::Config(format!("ENRICHMENT_URL: {err}")))?;

        let timeout_ms = parse_positive(&lookup, "ENRICHMENT_TIMEOUT_MS", DEFAULT_ENRICHMENT_TIMEOUT_MS)?;
        let outbound_queue_capacity =
            parse_positive(&lookup, "OUTBOUND_QUEUE_CAPACITY", DEFAULT_OUTBOUND_QUEUE_CAPACITY)?;

        let log_format = match lookup("LOG_FORMAT") {
            Some(value) => value.parse()?,
            None => LogFormat::default(),
        };

        Ok(Self {
            listen_addr,
            enrichment_url,
            enrichment_timeout: Duration::from_millis(timeout_ms),
            outbound_queue_capacity,
            log_format,
        })
    }
}

/// Parses `key` as a non-zero number, returning `default` when unset.
fn parse_positive<F, T>(lookup: &F, key: &str, default: T) -> Result<T, RelayError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialEq + Default,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.trim().parse::<T>() {
        Ok(value) if value != T::default() => Ok(value),
        _ => Err(RelayError::Config(format!(
            "{key}: expected a positive integer, got {raw:?}"
        ))),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<RelayConfig, RelayError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        RelayConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let Ok(config) = load(&[]) else {
            panic!("defaults are valid");
        };
        assert_eq!(config.listen_addr.port(), 8080);
        assert_eq!(config.enrichment_url.path(), "/predict/anomaly");
        assert_eq!(config.enrichment_timeout, Duration::from_millis(2_000));
        assert_eq!(config.outbound_queue_capacity, 64);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn overrides_are_applied() {
        let Ok(config) = load(&[
            ("LISTEN_ADDR", "127.0.0.1:9000"),
            ("ENRICHMENT_URL", "http://scorer.local/v2/anomaly"),
            ("ENRICHMENT_TIMEOUT_MS", "250"),
            ("OUTBOUND_QUEUE_CAPACITY", "16"),
            ("LOG_FORMAT", "JSON"),
        ]) else {
            panic!("valid overrides");
        };
        assert_eq!(config.listen_addr.port(), 9000);
        assert_eq!(config.enrichment_url.host_str(), Some("scorer.local"));
        assert_eq!(config.enrichment_timeout, Duration::from_millis(250));
        assert_eq!(config.outbound_queue_capacity, 16);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn bad_listen_addr_is_rejected() {
        assert!(matches!(
            load(&[("LISTEN_ADDR", "not-an-addr")]),
            Err(RelayError::Config(_))
        ));
    }

    #[test]
    fn bad_enrichment_url_is_rejected() {
        assert!(load(&[("ENRICHMENT_URL", "::nope")]).is_err());
    }

    #[test]
    fn zero_or_garbage_numbers_are_rejected() {
        assert!(load(&[("ENRICHMENT_TIMEOUT_MS", "0")]).is_err());
        assert!(load(&[("OUTBOUND_QUEUE_CAPACITY", "lots")]).is_err());
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        assert!(load(&[("LOG_FORMAT", "xml")]).is_err());
    }
}
