use crate::config::Timing;
use crate::reply::{self, Reply};
use reqwest::{Client as HTTPClient, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use stockbot::quote::Symbol;
use stockbot::resolver::Interface as ResolverInterface;
use thiserror::Error as ThisError;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn, Instrument};
use url::Url;

#[derive(ThisError, Debug)]
pub enum DeliveryError {
    #[error("Request to response_url failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("response_url answered {0}")]
    Status(StatusCode),
}

/// What a command asked for.
#[derive(Debug)]
enum Lookup {
    Quote(Symbol),
    /// `lines` holds the symbols already resolved, in order. A deferred
    /// listing picks up where the fast attempt stopped.
    Watchlist {
        symbols: Vec<Symbol>,
        lines: Vec<String>,
    },
}

struct Answer {
    text: String,
    rate_limited: bool,
}

impl Lookup {
    fn watchlist(symbols: Vec<Symbol>) -> Self {
        let lines = Vec::with_capacity(symbols.len());
        Lookup::Watchlist { symbols, lines }
    }

    fn symbols(&self) -> &[Symbol] {
        match self {
            Lookup::Quote(symbol) => std::slice::from_ref(symbol),
            Lookup::Watchlist { symbols, .. } => symbols,
        }
    }

    /// True when the pauses alone use up the budget, so a fast attempt could
    /// only spend provider quota.
    fn outlasts(&self, budget: Duration, pause: Duration) -> bool {
        match self {
            Lookup::Quote(_) => false,
            Lookup::Watchlist { symbols, .. } => {
                let gaps = u32::try_from(symbols.len().saturating_sub(1)).unwrap_or(u32::MAX);
                gaps > 0 && pause.saturating_mul(gaps) >= budget
            }
        }
    }

    /// Only a single quote defers on a quota notice; a watchlist prints it on
    /// the affected line and carries on.
    ///
    /// Cancel safe: a line is recorded only once its symbol has resolved.
    async fn answer(
        &mut self,
        resolver: &dyn ResolverInterface,
        timeout: Duration,
        pause: Duration,
    ) -> Answer {
        match self {
            Lookup::Quote(symbol) => {
                let result = resolver.resolve(symbol, timeout).await;
                Answer {
                    text: reply::quote_line(symbol, &result),
                    rate_limited: result.is_rate_limited(),
                }
            }
            Lookup::Watchlist { symbols, lines } => {
                for symbol in &symbols[lines.len()..] {
                    if !lines.is_empty() && !pause.is_zero() {
                        tokio::time::sleep(pause).await;
                    }

                    let result = resolver.resolve(symbol, timeout).await;
                    lines.push(reply::quote_line(symbol, &result));
                }

                Answer {
                    text: reply::watchlist(lines),
                    rate_limited: false,
                }
            }
        }
    }

    /// Resolved lines so far, the rest marked as delayed.
    fn delayed(&self) -> String {
        match self {
            Lookup::Quote(symbol) => reply::delayed_line(symbol),
            Lookup::Watchlist { symbols, lines } => {
                let mut rendered = lines.clone();
                rendered.extend(symbols[lines.len()..].iter().map(reply::delayed_line));
                reply::watchlist(&rendered)
            }
        }
    }

    fn not_configured(&self) -> String {
        match self {
            Lookup::Quote(symbol) => reply::not_configured_line(symbol),
            Lookup::Watchlist { symbols, .. } => reply::watchlist(
                &symbols
                    .iter()
                    .map(reply::not_configured_line)
                    .collect::<Vec<_>>(),
            ),
        }
    }
}

/// Answers inside the response budget when it can, otherwise acknowledges
/// privately and posts the answer to the command's `response_url` later.
pub struct Coordinator {
    resolver: Option<Arc<dyn ResolverInterface>>,
    timing: Timing,
    http_client: HTTPClient,
}

impl Coordinator {
    /// A `None` resolver runs in degraded mode.
    pub fn new(resolver: Option<Arc<dyn ResolverInterface>>, timing: Timing) -> Self {
        Coordinator {
            resolver,
            timing,
            http_client: HTTPClient::new(),
        }
    }

    pub async fn respond(&self, symbol: Symbol, target: Option<Url>) -> Reply {
        self.coordinate(Lookup::Quote(symbol), target).await
    }

    /// Resolves every symbol in order, one line each.
    pub async fn respond_batch(&self, symbols: Vec<Symbol>, target: Option<Url>) -> Reply {
        if symbols.is_empty() {
            return Reply::public(reply::WATCHLIST_EMPTY);
        }

        self.coordinate(Lookup::watchlist(symbols), target).await
    }

    async fn coordinate(&self, mut lookup: Lookup, target: Option<Url>) -> Reply {
        let resolver = match &self.resolver {
            Some(resolver) => Arc::clone(resolver),
            None => {
                warn!("quote provider not configured");
                return Reply::public(lookup.not_configured());
            }
        };

        let budget = self.timing.budget;
        let pause = self.timing.request_pause;

        let fallback = if target.is_some() && lookup.outlasts(budget, pause) {
            info!(
                count = lookup.symbols().len(),
                pause_ms = pause.as_millis() as u64,
                "listing cannot fit the budget, deferring"
            );
            lookup.delayed()
        } else {
            let fast =
                tokio::time::timeout(budget, lookup.answer(&*resolver, budget, pause)).await;

            match fast {
                Ok(answer) if !answer.rate_limited => {
                    debug!("answered inside budget");
                    return Reply::public(answer.text);
                }
                Ok(answer) => {
                    info!("rate limited inside budget, deferring");
                    answer.text
                }
                Err(_) => {
                    info!(budget_ms = budget.as_millis() as u64, "budget elapsed, deferring");
                    lookup.delayed()
                }
            }
        };

        let Some(target) = target else {
            warn!("no response_url to defer to, answering now");
            return Reply::public(fallback);
        };

        let acknowledgement = Reply::private(reply::acknowledgement(lookup.symbols()));

        // Sender drops when `respond` returns, releasing the deferred post.
        let _gate = self.defer(resolver, lookup, target);

        acknowledgement
    }

    fn defer(
        &self,
        resolver: Arc<dyn ResolverInterface>,
        mut lookup: Lookup,
        target: Url,
    ) -> oneshot::Sender<()> {
        let (gate, opened) = oneshot::channel::<()>();
        let timing = self.timing;
        let http_client = self.http_client.clone();

        tokio::spawn(
            async move {
                let answer = lookup
                    .answer(&*resolver, timing.background_timeout, timing.request_pause)
                    .await;

                // Resolves once the sender is dropped.
                let _ = opened.await;

                let reply = Reply::public(answer.text);

                match deliver(&http_client, &target, &reply, timing.delivery_timeout).await {
                    Ok(()) => info!("deferred reply delivered"),
                    Err(e) => error!(error = %e, "deferred reply dropped"),
                }
            }
            .in_current_span(),
        );

        gate
    }
}

async fn deliver(
    http_client: &HTTPClient,
    target: &Url,
    reply: &Reply,
    timeout: Duration,
) -> Result<(), DeliveryError> {
    let response = http_client
        .post(target.clone())
        .json(reply)
        .timeout(timeout)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(DeliveryError::Status(status));
    }

    Ok(())
}
