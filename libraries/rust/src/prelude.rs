pub use crate::quote::{QuoteResult, Symbol, SymbolError};
pub use crate::watchlist::{Interface as WatchlistInterface, Removal, Watchlist};

#[cfg(feature = "data")]
pub use crate::resolver::{Interface as ResolverInterface, Resolver};
