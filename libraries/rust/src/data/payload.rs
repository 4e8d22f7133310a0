//! Classification of raw quote provider payloads.
//!
//! The provider answers every request with a JSON object whose shape depends
//! on the outcome: quote fields, a quota notice, or an error message. These
//! functions inspect key presence once and hand back a closed [`Classified`]
//! value, so nothing downstream ever looks at the raw JSON again.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;

const GLOBAL_QUOTE_KEY: &str = "Global Quote";
const PRICE_KEY: &str = "05. price";
const CHANGE_KEY: &str = "09. change";
const CHANGE_PERCENT_KEY: &str = "10. change percent";

const DAILY_SERIES_KEY: &str = "Time Series (Daily)";
const CLOSE_KEY: &str = "4. close";

const ERROR_KEY: &str = "Error Message";
const NOTE_KEY: &str = "Note";
const INFORMATION_KEY: &str = "Information";

const QUOTA_PHRASES: [&str; 4] = [
    "rate limit",
    "call frequency",
    "requests per day",
    "calls per day",
];

const DEFAULT_CHANGE_PERCENT: &str = "0.00%";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified<T> {
    /// Usable quote data.
    Quote(T),
    /// Quota notice from the provider.
    RateLimited(String),
    /// Error or invalid-symbol payload.
    Rejected(String),
    /// Empty, malformed, or missing the fields we need.
    Empty,
}

impl<T> Classified<T> {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Classified::RateLimited(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveQuote {
    pub price: Decimal,
    pub change: Decimal,
    pub change_percent: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyClose {
    pub date: NaiveDate,
    pub close: Decimal,
}

pub fn classify_live(body: &str) -> Classified<LiveQuote> {
    let object = match parse_object(body) {
        Some(object) => object,
        None => return Classified::Empty,
    };

    if let Some(notice) = notice(&object) {
        return notice;
    }

    let quote = match object.get(GLOBAL_QUOTE_KEY).and_then(Value::as_object) {
        Some(quote) => quote,
        None => return Classified::Empty,
    };

    let price = match quote.get(PRICE_KEY).and_then(parse_price) {
        Some(price) => price,
        None => return Classified::Empty,
    };

    let change = quote
        .get(CHANGE_KEY)
        .and_then(parse_decimal)
        .unwrap_or(Decimal::ZERO);

    let change_percent = quote
        .get(CHANGE_PERCENT_KEY)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|percent| !percent.is_empty())
        .unwrap_or(DEFAULT_CHANGE_PERCENT)
        .to_string();

    Classified::Quote(LiveQuote {
        price,
        change,
        change_percent,
    })
}

pub fn classify_daily_close(body: &str) -> Classified<DailyClose> {
    let object = match parse_object(body) {
        Some(object) => object,
        None => return Classified::Empty,
    };

    if let Some(notice) = notice(&object) {
        return notice;
    }

    let series = match object.get(DAILY_SERIES_KEY).and_then(Value::as_object) {
        Some(series) => series,
        None => return Classified::Empty,
    };

    // ISO dates order chronologically, so the maximum key is the latest day.
    let latest = series
        .keys()
        .filter_map(|key| {
            NaiveDate::parse_from_str(key, "%Y-%m-%d")
                .ok()
                .map(|date| (date, key))
        })
        .max();

    let (date, key) = match latest {
        Some(found) => found,
        None => return Classified::Empty,
    };

    match series
        .get(key)
        .and_then(|day| day.get(CLOSE_KEY))
        .and_then(parse_price)
    {
        Some(close) => Classified::Quote(DailyClose { date, close }),
        None => Classified::Empty,
    }
}

/// Quota and error notices share one shape across every provider function.
fn notice<T>(object: &Map<String, Value>) -> Option<Classified<T>> {
    if let Some(message) = object.get(ERROR_KEY) {
        return Some(Classified::Rejected(text(message)));
    }

    if let Some(message) = object.get(NOTE_KEY) {
        return Some(Classified::RateLimited(text(message)));
    }

    if let Some(message) = object.get(INFORMATION_KEY) {
        let message = text(message);
        if is_quota_notice(&message) {
            return Some(Classified::RateLimited(message));
        }
        return Some(Classified::Rejected(message));
    }

    None
}

fn is_quota_notice(message: &str) -> bool {
    let lowered = message.to_lowercase();
    QUOTA_PHRASES.iter().any(|phrase| lowered.contains(phrase))
}

fn parse_object(body: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(object)) if !object.is_empty() => Some(object),
        _ => None,
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::String(message) => message.clone(),
        other => other.to_string(),
    }
}

fn parse_decimal(value: &Value) -> Option<Decimal> {
    let raw = value.as_str()?.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

fn parse_price(value: &Value) -> Option<Decimal> {
    parse_decimal(value).filter(|price| !price.is_sign_negative())
}
