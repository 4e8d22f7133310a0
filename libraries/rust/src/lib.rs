//! Quote resolution and watchlist primitives for stockbot.

/// Symbols and quote outcomes
pub mod quote;

/// Watched symbols
pub mod watchlist;

/// Tracing setup
pub mod logger;

/// Common re-exports
pub mod prelude;

#[cfg(feature = "data")]
/// Quote provider client
pub mod data;

#[cfg(feature = "data")]
/// Live-then-daily-close quote resolution
pub mod resolver;
