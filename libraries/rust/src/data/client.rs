use crate::data::payload::{classify_daily_close, classify_live, Classified, DailyClose, LiveQuote};
use crate::quote::Symbol;
use async_trait::async_trait;
use mockall::automock;
use reqwest::{Client as HTTPClient, StatusCode, Url};
use std::time::Duration;
use thiserror::Error as ThisError;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co";

const QUERY_PATH: &str = "query";

const LIVE_FUNCTION: &str = "GLOBAL_QUOTE";

const DAILY_FUNCTION: &str = "TIME_SERIES_DAILY";

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("Quote provider timed out after {0:?}")]
    Timeout(Duration),
    #[error("Network error: {0}")]
    Network(reqwest::Error),
    #[error("Invalid provider URL: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    fn from_transport(error: reqwest::Error, timeout: Duration) -> Self {
        if error.is_timeout() {
            Error::Timeout(timeout)
        } else {
            Error::Network(error)
        }
    }
}

/// Upstream quote queries. One GET per call, no retries.
#[automock]
#[async_trait]
pub trait Interface: Send + Sync {
    async fn fetch_live(
        &self,
        symbol: &Symbol,
        timeout: Duration,
    ) -> Result<Classified<LiveQuote>, Error>;
    async fn fetch_daily_close(
        &self,
        symbol: &Symbol,
        timeout: Duration,
    ) -> Result<Classified<DailyClose>, Error>;
}

#[derive(Clone)]
pub struct Client {
    base_url: Url,
    api_key: String,
    http_client: HTTPClient,
}

impl Client {
    pub fn new(base_url: Url, api_key: String) -> Self {
        Client {
            base_url,
            api_key,
            http_client: HTTPClient::new(),
        }
    }

    async fn query(
        &self,
        function: &str,
        symbol: &Symbol,
        timeout: Duration,
    ) -> Result<(StatusCode, String), Error> {
        let url = self.base_url.join(QUERY_PATH)?;

        debug!(
            function,
            symbol = %symbol,
            url = %url,
            timeout_ms = timeout.as_millis() as u64,
            "querying quote provider"
        );

        let response = self
            .http_client
            .get(url)
            .header("accept", "application/json")
            .query(&[
                ("function", function),
                ("symbol", symbol.as_str()),
                ("apikey", self.api_key.as_str()),
            ])
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| Error::from_transport(e, timeout))?;

        let status = response.status();

        let body = response
            .text()
            .await
            .map_err(|e| Error::from_transport(e, timeout))?;

        if !status.is_success() {
            warn!(function, symbol = %symbol, %status, "quote provider returned non-success status");
        }

        Ok((status, body))
    }
}

/// Notices are classified from the body; a bare 429 without one still counts.
fn with_status<T>(status: StatusCode, classified: Classified<T>) -> Classified<T> {
    match classified {
        Classified::Empty if status == StatusCode::TOO_MANY_REQUESTS => {
            Classified::RateLimited(format!("HTTP {}", status))
        }
        other => other,
    }
}

#[async_trait]
impl Interface for Client {
    async fn fetch_live(
        &self,
        symbol: &Symbol,
        timeout: Duration,
    ) -> Result<Classified<LiveQuote>, Error> {
        let (status, body) = self.query(LIVE_FUNCTION, symbol, timeout).await?;

        Ok(with_status(status, classify_live(&body)))
    }

    async fn fetch_daily_close(
        &self,
        symbol: &Symbol,
        timeout: Duration,
    ) -> Result<Classified<DailyClose>, Error> {
        let (status, body) = self.query(DAILY_FUNCTION, symbol, timeout).await?;

        Ok(with_status(status, classify_daily_close(&body)))
    }
}
