use std::time::Duration;
use stockbot::data::DEFAULT_BASE_URL;
use thiserror::Error as ThisError;
use url::Url;

const API_KEY: &str = "ALPHA_VANTAGE_API_KEY";
const LEGACY_API_KEY: &str = "ALPHA_KEY";
const BASE_URL: &str = "ALPHA_VANTAGE_BASE_URL";
const PORT: &str = "PORT";
const RESPONSE_BUDGET_MS: &str = "RESPONSE_BUDGET_MS";
const BACKGROUND_TIMEOUT_MS: &str = "BACKGROUND_TIMEOUT_MS";
const DELIVERY_TIMEOUT_MS: &str = "DELIVERY_TIMEOUT_MS";
const QUOTE_REQUEST_PAUSE_MS: &str = "QUOTE_REQUEST_PAUSE_MS";

const DEFAULT_PORT: u16 = 3000;

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("{name} must be a non-negative integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("{name} is not a valid URL: {source}")]
    InvalidUrl {
        name: &'static str,
        source: url::ParseError,
    },
}

/// Deadlines and pacing for quote lookups.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timing {
    /// Wall-clock window for a synchronous reply. Kept under the
    /// slash-command protocol's three seconds.
    pub budget: Duration,
    pub background_timeout: Duration,
    pub delivery_timeout: Duration,
    /// Pause between consecutive provider calls when listing a watchlist.
    pub request_pause: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            budget: Duration::from_millis(2500),
            background_timeout: Duration::from_secs(15),
            delivery_timeout: Duration::from_secs(10),
            request_pause: Duration::from_secs(1),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    /// `None` runs the bot in degraded mode: every quote reports the
    /// missing credential instead of calling the provider.
    pub api_key: Option<String>,
    pub base_url: Url,
    pub port: u16,
    pub timing: Timing,
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let api_key = lookup(API_KEY)
            .or_else(|| lookup(LEGACY_API_KEY))
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        let base_url = lookup(BASE_URL).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(&base_url).map_err(|source| Error::InvalidUrl {
            name: BASE_URL,
            source,
        })?;

        let port = match lookup(PORT) {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| Error::InvalidNumber { name: PORT, value })?,
            None => DEFAULT_PORT,
        };

        let defaults = Timing::default();
        let timing = Timing {
            budget: millis(&lookup, RESPONSE_BUDGET_MS, defaults.budget)?,
            background_timeout: millis(&lookup, BACKGROUND_TIMEOUT_MS, defaults.background_timeout)?,
            delivery_timeout: millis(&lookup, DELIVERY_TIMEOUT_MS, defaults.delivery_timeout)?,
            request_pause: millis(&lookup, QUOTE_REQUEST_PAUSE_MS, defaults.request_pause)?,
        };

        Ok(Config {
            api_key,
            base_url,
            port,
            timing,
        })
    }
}

fn millis(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: Duration,
) -> Result<Duration, Error> {
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| Error::InvalidNumber { name, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(variables: &[(&str, &str)]) -> Result<Config, Error> {
        let variables: HashMap<String, String> = variables
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();

        Config::from_lookup(|name| variables.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();

        assert_eq!(config.api_key, None);
        assert_eq!(config.base_url.as_str(), "https://www.alphavantage.co/");
        assert_eq!(config.port, 3000);
        assert_eq!(config.timing, Timing::default());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("ALPHA_VANTAGE_API_KEY", " key "),
            ("ALPHA_VANTAGE_BASE_URL", "http://127.0.0.1:9000"),
            ("PORT", "8080"),
            ("RESPONSE_BUDGET_MS", "2400"),
            ("BACKGROUND_TIMEOUT_MS", "20000"),
            ("DELIVERY_TIMEOUT_MS", "5000"),
            ("QUOTE_REQUEST_PAUSE_MS", "0"),
        ])
        .unwrap();

        assert_eq!(config.api_key, Some("key".to_string()));
        assert_eq!(config.base_url.as_str(), "http://127.0.0.1:9000/");
        assert_eq!(config.port, 8080);
        assert_eq!(
            config.timing,
            Timing {
                budget: Duration::from_millis(2400),
                background_timeout: Duration::from_secs(20),
                delivery_timeout: Duration::from_secs(5),
                request_pause: Duration::ZERO,
            }
        );
    }

    #[test]
    fn test_legacy_api_key() {
        let config = config(&[("ALPHA_KEY", "legacy")]).unwrap();
        assert_eq!(config.api_key, Some("legacy".to_string()));
    }

    #[test]
    fn test_blank_api_key_is_degraded_mode() {
        let config = config(&[("ALPHA_VANTAGE_API_KEY", "   ")]).unwrap();
        assert_eq!(config.api_key, None);
    }

    #[test]
    fn test_invalid_number() {
        let error = config(&[("RESPONSE_BUDGET_MS", "fast")]).unwrap_err();

        assert_eq!(
            error.to_string(),
            "RESPONSE_BUDGET_MS must be a non-negative integer, got \"fast\""
        );
    }

    #[test]
    fn test_invalid_port() {
        assert!(matches!(
            config(&[("PORT", "70000")]),
            Err(Error::InvalidNumber { name: "PORT", .. })
        ));
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            config(&[("ALPHA_VANTAGE_BASE_URL", "not a url")]),
            Err(Error::InvalidUrl { .. })
        ));
    }
}
