use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug, PartialEq, Eq)]
pub enum SymbolError {
    #[error("symbol is empty")]
    Empty,
    #[error("symbol contains whitespace: {0:?}")]
    Whitespace(String),
}

/// Uppercase, trimmed ticker identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    pub fn parse(input: &str) -> Result<Self, SymbolError> {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return Err(SymbolError::Empty);
        }

        if trimmed.chars().any(char::is_whitespace) {
            return Err(SymbolError::Whitespace(trimmed.to_string()));
        }

        Ok(Symbol(trimmed.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Symbol {
    type Err = SymbolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Symbol::parse(s)
    }
}

impl TryFrom<String> for Symbol {
    type Error = SymbolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Symbol::parse(&value)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of resolving a single symbol against the quote provider.
///
/// Every resolution ends in exactly one of these cases; failures are values,
/// not errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuoteResult {
    /// Real-time quote.
    Live {
        price: Decimal,
        change: Decimal,
        change_percent: String,
    },
    /// Most recent end-of-day close, used when no real-time price exists.
    DailyClose { price: Decimal },
    Unavailable,
    RateLimited,
}

impl QuoteResult {
    pub fn price(&self) -> Option<Decimal> {
        match self {
            QuoteResult::Live { price, .. } | QuoteResult::DailyClose { price } => Some(*price),
            QuoteResult::Unavailable | QuoteResult::RateLimited => None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, QuoteResult::RateLimited)
    }
}
