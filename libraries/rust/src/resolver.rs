use crate::data::{Classified, Interface as DataInterface};
use crate::quote::{QuoteResult, Symbol};
use async_trait::async_trait;
use mockall::automock;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Resolves a symbol to a [`QuoteResult`]. Never fails; every outcome is a value.
#[automock]
#[async_trait]
pub trait Interface: Send + Sync {
    async fn resolve(&self, symbol: &Symbol, timeout: Duration) -> QuoteResult;
}

/// Live quote first, daily close as the fallback.
///
/// A quota notice on the live endpoint ends resolution immediately: the
/// fallback shares the same quota.
#[derive(Clone)]
pub struct Resolver {
    data_client: Arc<dyn DataInterface>,
}

impl Resolver {
    pub fn new(data_client: Arc<dyn DataInterface>) -> Self {
        Resolver { data_client }
    }

    async fn fallback(&self, symbol: &Symbol, timeout: Duration) -> QuoteResult {
        match self.data_client.fetch_daily_close(symbol, timeout).await {
            Ok(Classified::Quote(daily)) => {
                debug!(symbol = %symbol, date = %daily.date, "resolved daily close");
                QuoteResult::DailyClose { price: daily.close }
            }
            Ok(Classified::RateLimited(notice)) => {
                info!(symbol = %symbol, notice = %notice, "daily close rate limited");
                QuoteResult::RateLimited
            }
            Ok(Classified::Rejected(message)) => {
                info!(symbol = %symbol, message = %message, "daily close rejected");
                QuoteResult::Unavailable
            }
            Ok(Classified::Empty) => {
                debug!(symbol = %symbol, "daily close empty");
                QuoteResult::Unavailable
            }
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "daily close request failed");
                QuoteResult::Unavailable
            }
        }
    }
}

#[async_trait]
impl Interface for Resolver {
    async fn resolve(&self, symbol: &Symbol, timeout: Duration) -> QuoteResult {
        match self.data_client.fetch_live(symbol, timeout).await {
            Ok(Classified::Quote(live)) => {
                return QuoteResult::Live {
                    price: live.price,
                    change: live.change,
                    change_percent: live.change_percent,
                };
            }
            Ok(Classified::RateLimited(notice)) => {
                info!(symbol = %symbol, notice = %notice, "live quote rate limited, skipping fallback");
                return QuoteResult::RateLimited;
            }
            Ok(Classified::Rejected(message)) => {
                debug!(symbol = %symbol, message = %message, "live quote rejected, falling back");
            }
            Ok(Classified::Empty) => {
                debug!(symbol = %symbol, "live quote empty, falling back");
            }
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "live quote request failed, falling back");
            }
        }

        // The fallback gets the same timeout as the path it replaces.
        self.fallback(symbol, timeout).await
    }
}
