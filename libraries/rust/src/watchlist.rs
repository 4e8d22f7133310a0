use crate::quote::Symbol;
use mockall::automock;
use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Removal {
    pub removed: Vec<Symbol>,
    pub missing: Vec<Symbol>,
}

/// Shared set of watched symbols.
///
/// Implementations must make each call atomic with respect to every other
/// call; callers never hold a lock across an await point.
#[automock]
pub trait Interface: Send + Sync {
    fn add(&self, symbols: &[Symbol]);
    fn remove(&self, symbols: &[Symbol]) -> Removal;
    /// Symbols in lexicographic order.
    fn list(&self) -> Vec<Symbol>;
}

/// In-memory watchlist. Lost on restart.
#[derive(Debug, Default)]
pub struct Watchlist {
    symbols: Mutex<BTreeSet<Symbol>>,
}

impl Watchlist {
    pub fn new() -> Self {
        Watchlist::default()
    }

    fn symbols(&self) -> MutexGuard<'_, BTreeSet<Symbol>> {
        // A panic mid-operation cannot leave the set half-updated.
        self.symbols
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Interface for Watchlist {
    fn add(&self, symbols: &[Symbol]) {
        let mut watched = self.symbols();
        watched.extend(symbols.iter().cloned());
    }

    fn remove(&self, symbols: &[Symbol]) -> Removal {
        let mut watched = self.symbols();
        let mut removal = Removal::default();

        for symbol in symbols {
            if watched.remove(symbol) {
                removal.removed.push(symbol.clone());
            } else if !removal.removed.contains(symbol) && !removal.missing.contains(symbol) {
                removal.missing.push(symbol.clone());
            }
        }

        removal
    }

    fn list(&self) -> Vec<Symbol> {
        self.symbols().iter().cloned().collect()
    }
}
