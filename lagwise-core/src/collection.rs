//! Realized trades and the collection that holds them.
//!
//! A `TradeCollection` is a value type: every lookup or filter returns a new
//! collection, and items are never mutated by filtering.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A realized trade record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub ticker: String,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub entry_price: f64,
    pub exit_price: f64,
}

impl Trade {
    /// Unleveraged return of the trade.
    pub fn base_return(&self) -> f64 {
        self.exit_price / self.entry_price - 1.0
    }

    /// Calendar days between entry and exit.
    pub fn duration_days(&self) -> i64 {
        (self.exit_date - self.entry_date).num_days()
    }
}

/// List-like access and filtering over trade records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeCollection {
    items: Vec<Trade>,
}

impl TradeCollection {
    pub fn new(items: Vec<Trade>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Trade> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Trade> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Trade] {
        &self.items
    }

    /// Trades entered on the given date.
    pub fn on_date(&self, date: NaiveDate) -> TradeCollection {
        self.filter(|t| t.entry_date == date)
    }

    /// Trades in the given ticker.
    pub fn for_ticker(&self, ticker: &str) -> TradeCollection {
        self.filter(|t| t.ticker == ticker)
    }

    /// New collection of the trades satisfying `condition`. Items are cloned,
    /// never mutated.
    pub fn filter(&self, condition: impl Fn(&Trade) -> bool) -> TradeCollection {
        TradeCollection {
            items: self.items.iter().filter(|t| condition(t)).cloned().collect(),
        }
    }
}

impl std::ops::Index<usize> for TradeCollection {
    type Output = Trade;

    fn index(&self, index: usize) -> &Trade {
        &self.items[index]
    }
}

impl<'a> IntoIterator for &'a TradeCollection {
    type Item = &'a Trade;
    type IntoIter = std::slice::Iter<'a, Trade>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl IntoIterator for TradeCollection {
    type Item = Trade;
    type IntoIter = std::vec::IntoIter<Trade>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
