//! Participant summaries and pairwise utilities for bilateral markets.
//!
//! The utility of pairing buyer `i` with seller `j` is
//!
//! ```text
//! (mean bid price of i - mean ask price of j) * min(quantity of i, quantity of j)
//! ```
//!
//! where mean prices are quantity-weighted over all of the participant's
//! lines. Both sides rank the other by this same value. Utilities are derived
//! per matching call and never stored in the book.

use std::collections::BTreeMap;

use crate::error::{MarketError, Result};
use crate::orderbook::OrderBook;
use crate::types::price::{descending, WeightedPrice};
use crate::types::{ParticipantId, Side};

/// Aggregate view of one participant's lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticipantSummary {
    pub participant: ParticipantId,
    /// Quantity-weighted mean price (0 when every line has zero quantity)
    pub mean_price: f64,
    /// Total quantity over all lines
    pub quantity: f64,
}

/// Dense buyer x seller utility matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceTable {
    buyers: Vec<ParticipantSummary>,
    sellers: Vec<ParticipantSummary>,
    /// Row-major: `utility[i * sellers.len() + j]`
    utility: Vec<f64>,
}

impl PreferenceTable {
    /// Summarise every participant of the book and compute all utilities.
    ///
    /// Buyers and sellers keep first-appearance order.
    pub fn from_book(book: &OrderBook) -> Self {
        let buyers = summarize(book, Side::Buy);
        let sellers = summarize(book, Side::Sell);

        let mut utility = Vec::with_capacity(buyers.len() * sellers.len());
        for buyer in &buyers {
            for seller in &sellers {
                utility.push((buyer.mean_price - seller.mean_price) * buyer.quantity.min(seller.quantity));
            }
        }

        Self {
            buyers,
            sellers,
            utility,
        }
    }

    #[inline]
    pub fn buyers(&self) -> &[ParticipantSummary] {
        &self.buyers
    }

    #[inline]
    pub fn sellers(&self) -> &[ParticipantSummary] {
        &self.sellers
    }

    /// Utility of buyer index `i` paired with seller index `j`
    #[inline]
    pub fn utility(&self, i: usize, j: usize) -> f64 {
        self.utility[i * self.sellers.len() + j]
    }

    /// Utility between two participant ids, if both are present
    pub fn utility_between(&self, buyer: ParticipantId, seller: ParticipantId) -> Option<f64> {
        let i = self.buyers.iter().position(|b| b.participant == buyer)?;
        let j = self.sellers.iter().position(|s| s.participant == seller)?;
        Some(self.utility(i, j))
    }

    /// Seller indices ranked by buyer `i`, best first (ties keep seller order)
    pub fn buyer_ranking(&self, i: usize) -> Vec<usize> {
        let mut ranking: Vec<usize> = (0..self.sellers.len()).collect();
        ranking.sort_by(|&a, &b| descending(self.utility(i, a), self.utility(i, b)));
        ranking
    }

    /// Buyer indices ranked by seller `j`, best first (ties keep buyer order)
    pub fn seller_ranking(&self, j: usize) -> Vec<usize> {
        let mut ranking: Vec<usize> = (0..self.buyers.len()).collect();
        ranking.sort_by(|&a, &b| descending(self.utility(a, j), self.utility(b, j)));
        ranking
    }

    /// Fail unless there are as many sellers as buyers
    pub fn ensure_balanced(&self) -> Result<()> {
        if self.buyers.len() == self.sellers.len() {
            Ok(())
        } else {
            Err(MarketError::UnbalancedMarket {
                buyers: self.buyers.len(),
                sellers: self.sellers.len(),
            })
        }
    }
}

/// Mean price and total quantity per participant of one side
fn summarize(book: &OrderBook, side: Side) -> Vec<ParticipantSummary> {
    let mut totals: BTreeMap<ParticipantId, WeightedPrice> = BTreeMap::new();
    for order in book.side(side) {
        totals
            .entry(order.participant)
            .or_default()
            .add(order.price, order.quantity);
    }

    book.participants(side)
        .into_iter()
        .map(|participant| {
            let total = totals.get(&participant).copied().unwrap_or_default();
            ParticipantSummary {
                participant,
                mean_price: total.mean().unwrap_or(0.0),
                quantity: total.quantity,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::price::approx_eq;

    fn book() -> OrderBook {
        let mut book = OrderBook::new();
        book.bid(2.0, 10.0, ParticipantId(1)).unwrap();
        book.bid(2.0, 6.0, ParticipantId(1)).unwrap();
        book.bid(3.0, 5.0, ParticipantId(2)).unwrap();
        book.ask(1.0, 2.0, ParticipantId(10)).unwrap();
        book.ask(6.0, 4.0, ParticipantId(20)).unwrap();
        book
    }

    #[test]
    fn test_summaries() {
        let table = PreferenceTable::from_book(&book());

        assert_eq!(table.buyers().len(), 2);
        assert!(approx_eq(table.buyers()[0].mean_price, 8.0));
        assert!(approx_eq(table.buyers()[0].quantity, 4.0));
        assert_eq!(table.sellers()[1].participant, ParticipantId(20));
    }

    #[test]
    fn test_summaries_interleaved_lines() {
        let mut book = OrderBook::new();
        for _ in 0..20 {
            book.bid(1.0, 4.0, ParticipantId(8)).unwrap();
            book.bid(3.0, 2.0, ParticipantId(2)).unwrap();
            book.bid(1.0, 6.0, ParticipantId(8)).unwrap();
        }
        let table = PreferenceTable::from_book(&book);

        let ids: Vec<_> = table.buyers().iter().map(|b| b.participant).collect();
        assert_eq!(ids, vec![ParticipantId(8), ParticipantId(2)]);
        assert!(approx_eq(table.buyers()[0].mean_price, 5.0));
        assert!(approx_eq(table.buyers()[0].quantity, 40.0));
        assert!(approx_eq(table.buyers()[1].mean_price, 2.0));
        assert!(approx_eq(table.buyers()[1].quantity, 60.0));
    }

    #[test]
    fn test_utility() {
        let table = PreferenceTable::from_book(&book());

        // (8 - 2) * min(4, 1)
        assert!(approx_eq(table.utility(0, 0), 6.0));
        // (8 - 4) * min(4, 6)
        assert!(approx_eq(table.utility(0, 1), 16.0));
        // (5 - 4) * min(3, 6)
        assert_eq!(table.utility_between(ParticipantId(2), ParticipantId(20)), Some(3.0));
        assert_eq!(table.utility_between(ParticipantId(9), ParticipantId(20)), None);
    }

    #[test]
    fn test_rankings() {
        let table = PreferenceTable::from_book(&book());

        assert_eq!(table.buyer_ranking(0), vec![1, 0]);
        // Seller 20: buyer 1 -> 16, buyer 2 -> 3
        assert_eq!(table.seller_ranking(1), vec![0, 1]);
    }

    #[test]
    fn test_balance_check() {
        let table = PreferenceTable::from_book(&book());
        assert!(table.ensure_balanced().is_ok());

        let mut lopsided = book();
        lopsided.bid(1.0, 1.0, ParticipantId(3)).unwrap();
        let err = PreferenceTable::from_book(&lopsided).ensure_balanced().unwrap_err();
        assert_eq!(err, MarketError::UnbalancedMarket { buyers: 3, sellers: 2 });
    }
}
