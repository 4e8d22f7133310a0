use actix_web::body::BoxBody;
use actix_web::{HttpRequest, HttpResponse, Responder};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use stockbot::quote::{QuoteResult, Symbol};
use stockbot::watchlist::Removal;

pub const WATCHLIST_EMPTY: &str = "📭 Watchlist is empty.";

const WATCHLIST_HEADER: &str = "📊 Watchlist:";

/// Who sees a reply: the whole channel, or only the user who ran the command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    #[serde(rename = "in_channel")]
    Public,
    #[serde(rename = "ephemeral")]
    Private,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    #[serde(rename = "response_type")]
    pub visibility: Visibility,
    pub text: String,
}

impl Reply {
    pub fn public(text: impl Into<String>) -> Self {
        Reply {
            visibility: Visibility::Public,
            text: text.into(),
        }
    }

    pub fn private(text: impl Into<String>) -> Self {
        Reply {
            visibility: Visibility::Private,
            text: text.into(),
        }
    }
}

impl Responder for Reply {
    type Body = BoxBody;

    fn respond_to(self, _request: &HttpRequest) -> HttpResponse<Self::Body> {
        HttpResponse::Ok().json(self)
    }
}

fn money(value: Decimal, places: u32) -> Decimal {
    value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
}

pub fn quote_line(symbol: &Symbol, result: &QuoteResult) -> String {
    match result {
        QuoteResult::Live {
            price,
            change,
            change_percent,
        } => format!(
            "{}: ${:.2} (Δ {:.4}, {})",
            symbol,
            money(*price, 2),
            money(*change, 4),
            change_percent
        ),
        QuoteResult::DailyClose { price } => {
            format!("{}: ${:.2} (last close)", symbol, money(*price, 2))
        }
        QuoteResult::Unavailable => format!("{}: (no data)", symbol),
        QuoteResult::RateLimited => format!(
            "{}: (rate limited by the quote provider, try again in a minute)",
            symbol
        ),
    }
}

pub fn not_configured_line(symbol: &Symbol) -> String {
    format!(
        "{}: (quote provider is not configured, set ALPHA_VANTAGE_API_KEY)",
        symbol
    )
}

pub fn delayed_line(symbol: &Symbol) -> String {
    format!(
        "{}: (quote provider is taking too long, try again shortly)",
        symbol
    )
}

pub fn acknowledgement(symbols: &[Symbol]) -> String {
    match symbols {
        [symbol] => format!("⏳ Looking up {}, the quote will be posted here shortly.", symbol),
        _ => format!(
            "⏳ Looking up {} symbols, the watchlist will be posted here shortly.",
            symbols.len()
        ),
    }
}

pub fn watchlist(lines: &[String]) -> String {
    format!("{}\n{}", WATCHLIST_HEADER, lines.join("\n"))
}

pub fn added(symbols: &[Symbol]) -> String {
    format!("✅ Added: {}", join(symbols))
}

pub fn removed(removal: &Removal) -> String {
    let mut parts = Vec::new();

    if !removal.removed.is_empty() {
        parts.push(format!("🗑️ Removed: {}", join(&removal.removed)));
    }

    if !removal.missing.is_empty() {
        parts.push(format!("Not in list: {}", join(&removal.missing)));
    }

    if parts.is_empty() {
        return "No changes.".to_string();
    }

    parts.join(". ")
}

fn join(symbols: &[Symbol]) -> String {
    symbols
        .iter()
        .map(Symbol::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
