use serde::Deserialize;
use stockbot::quote::{Symbol, SymbolError};
use thiserror::Error as ThisError;
use tracing::{info_span, warn, Span};
use url::Url;
use uuid::Uuid;

pub const PRICE_USAGE: &str = "Usage: `/price AAPL`";

pub const WATCHLIST_USAGE: &str = "Usage: `/watchlist add TICKER [TICKER...]`, `/watchlist remove TICKER [TICKER...]`, `/watchlist list`";

pub const WATCHLIST_INVALID: &str = "Invalid command. Use: `/watchlist add TICKER [TICKER...]`, `/watchlist remove TICKER [TICKER...]`, `/watchlist list`";

/// Form body Slack posts for a slash command.
#[derive(Debug, Deserialize)]
pub struct SlashCommand {
    #[serde(default)]
    pub text: String,
    pub response_url: Option<String>,
    pub command: Option<String>,
    pub channel_id: Option<String>,
    pub user_id: Option<String>,
}

impl SlashCommand {
    /// Log span for one command; deferred work runs inside it too.
    pub fn span(&self) -> Span {
        info_span!(
            "command",
            request_id = %Uuid::new_v4(),
            command = self.command.as_deref().unwrap_or(""),
            channel_id = self.channel_id.as_deref().unwrap_or(""),
            user_id = self.user_id.as_deref().unwrap_or(""),
        )
    }

    /// The one-shot URL a late answer may be posted to.
    pub fn deferred_target(&self) -> Option<Url> {
        let raw = self.response_url.as_deref()?.trim();

        if raw.is_empty() {
            return None;
        }

        match Url::parse(raw) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(error = %e, "ignoring malformed response_url");
                None
            }
        }
    }
}

#[derive(ThisError, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("no arguments given")]
    Empty,
    #[error("unknown action: {0}")]
    UnknownAction(String),
    #[error("{0} needs at least one ticker")]
    MissingTickers(&'static str),
    #[error("invalid ticker: {0}")]
    InvalidSymbol(#[from] SymbolError),
}

#[derive(Debug, PartialEq, Eq)]
pub enum WatchlistCommand {
    Add(Vec<Symbol>),
    Remove(Vec<Symbol>),
    List,
}

impl WatchlistCommand {
    pub fn parse(text: &str) -> Result<Self, Error> {
        let mut parts = text.split_whitespace();

        let action = match parts.next() {
            Some(action) => action.to_lowercase(),
            None => return Err(Error::Empty),
        };

        let symbols = symbols(parts)?;

        match action.as_str() {
            "add" if symbols.is_empty() => Err(Error::MissingTickers("add")),
            "add" => Ok(WatchlistCommand::Add(symbols)),
            "remove" if symbols.is_empty() => Err(Error::MissingTickers("remove")),
            "remove" => Ok(WatchlistCommand::Remove(symbols)),
            "list" => Ok(WatchlistCommand::List),
            _ => Err(Error::UnknownAction(action)),
        }
    }
}

/// First ticker of a `/price` command.
pub fn parse_price(text: &str) -> Result<Symbol, Error> {
    match text.split_whitespace().next() {
        Some(token) => Ok(Symbol::parse(token)?),
        None => Err(Error::Empty),
    }
}

/// Normalized tickers in input order, duplicates dropped.
fn symbols<'a>(tokens: impl Iterator<Item = &'a str>) -> Result<Vec<Symbol>, Error> {
    let mut symbols: Vec<Symbol> = Vec::new();

    for token in tokens {
        let symbol = Symbol::parse(token)?;
        if !symbols.contains(&symbol) {
            symbols.push(symbol);
        }
    }

    Ok(symbols)
}
