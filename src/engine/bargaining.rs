//! Per-pair price and volume settlement for a bilateral matching.
//!
//! ## Meet in the middle
//!
//! For each matched pair the buyer's lines are walked from the highest price
//! down and the seller's lines from the lowest price up. While the current
//! bid is at least the current ask, `min(bid lot, ask lot)` units trade at
//! the midpoint of the two prices. The pair settles for the total traded
//! quantity at the quantity-weighted mean of those midpoints.
//!
//! Nash bargaining with zero disagreement payoffs splits each unit's surplus
//! equally, which is exactly the midpoint rule, so both rules share one
//! procedure.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::orderbook::OrderBook;
use crate::types::price::{ascending, ask_accepts, descending, WeightedPrice, EPSILON};
use crate::types::{Allocation, AllocationEntry, Matching, Order, ParticipantId, Side};

/// Settlement rule for matched pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BargainRule {
    /// Trade crossing lots at the midpoint price
    #[default]
    Middle,
    /// Symmetric Nash bargaining; settles like [`BargainRule::Middle`]
    Nash,
}

named_rule!(BargainRule, "bargaining", {
    Middle => "middle" | "meet-in-the-middle",
    Nash => "nash",
});

impl std::str::FromStr for BargainRule {
    type Err = crate::error::MarketError;

    fn from_str(s: &str) -> crate::error::Result<Self> {
        Self::lookup(s).ok_or_else(|| Self::unknown(s))
    }
}

/// Settle every pair of `matching` against the lines in `book`.
///
/// Buyer and seller entries follow the matching's pair order. A pair that
/// cannot trade gets zero units and no price.
pub fn bargain(rule: BargainRule, book: &OrderBook, matching: &Matching) -> Allocation {
    let mut buyers = Vec::with_capacity(matching.len());
    let mut sellers = Vec::with_capacity(matching.len());

    for (buyer, seller) in matching.iter() {
        let settled = match rule {
            BargainRule::Middle | BargainRule::Nash => {
                meet_in_the_middle(&lines(book, Side::Buy, buyer), &lines(book, Side::Sell, seller))
            }
        };

        let price = settled.mean();
        if price.is_none() {
            warn!(%buyer, %seller, "matched pair has no crossing lots");
        }
        buyers.push(AllocationEntry::new(buyer, settled.quantity, price));
        sellers.push(AllocationEntry::new(seller, settled.quantity, price));
    }

    let allocation = Allocation::new(buyers, sellers);
    info!(%rule, pairs = matching.len(), volume = allocation.total_bought(), "bargaining complete");
    allocation
}

/// A participant's lines on one side, best price first
fn lines(book: &OrderBook, side: Side, participant: ParticipantId) -> Vec<Order> {
    let mut lines: Vec<Order> = book
        .side(side)
        .filter(|order| order.participant == participant)
        .copied()
        .collect();
    match side {
        Side::Buy => lines.sort_by(|a, b| descending(a.price, b.price)),
        Side::Sell => lines.sort_by(|a, b| ascending(a.price, b.price)),
    }
    lines
}

/// Two-cursor sweep over sorted bid and ask lots.
///
/// `bids` must be sorted by descending price and `asks` by ascending price.
pub fn meet_in_the_middle(bids: &[Order], asks: &[Order]) -> WeightedPrice {
    let mut settled = WeightedPrice::default();
    let (mut i, mut j) = (0, 0);
    let mut bid_left = bids.first().map_or(0.0, |o| o.quantity);
    let mut ask_left = asks.first().map_or(0.0, |o| o.quantity);

    while i < bids.len() && j < asks.len() {
        let (bid, ask) = (bids[i].price, asks[j].price);
        if !ask_accepts(ask, bid) {
            break;
        }

        let units = bid_left.min(ask_left);
        if units > EPSILON {
            let price = (bid + ask) / 2.0;
            debug!(bid, ask, units, price, "lots crossed");
            settled.add(price, units);
        }
        bid_left -= units;
        ask_left -= units;

        if bid_left <= EPSILON {
            i += 1;
            bid_left = bids.get(i).map_or(0.0, |o| o.quantity);
        }
        if ask_left <= EPSILON {
            j += 1;
            ask_left = asks.get(j).map_or(0.0, |o| o.quantity);
        }
    }

    settled
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::price::approx_eq;

    fn pair(buyer: ParticipantId, seller: ParticipantId) -> Matching {
        let mut matching = Matching::new();
        matching.insert(buyer, seller);
        matching
    }

    #[test]
    fn test_rule_names() {
        assert_eq!("nash".parse::<BargainRule>().unwrap(), BargainRule::Nash);
        assert_eq!("MIDDLE".parse::<BargainRule>().unwrap(), BargainRule::Middle);
        assert!("split".parse::<BargainRule>().is_err());
    }

    #[test]
    fn test_single_lots_trade_at_midpoint() {
        let mut book = OrderBook::new();
        book.bid(3.0, 10.0, ParticipantId(1)).unwrap();
        book.ask(5.0, 4.0, ParticipantId(2)).unwrap();

        let allocation = bargain(BargainRule::Middle, &book, &pair(ParticipantId(1), ParticipantId(2)));

        assert_eq!(allocation.buyers[0], AllocationEntry::priced(ParticipantId(1), 3.0, 7.0));
        assert_eq!(allocation.sellers[0], AllocationEntry::priced(ParticipantId(2), 3.0, 7.0));
    }

    #[test]
    fn test_sweep_stops_when_prices_cross() {
        let mut book = OrderBook::new();
        // Bids, best first: 2@10, 2@6, 5@1
        book.bid(2.0, 6.0, ParticipantId(1)).unwrap();
        book.bid(5.0, 1.0, ParticipantId(1)).unwrap();
        book.bid(2.0, 10.0, ParticipantId(1)).unwrap();
        // Asks, best first: 3@2, 4@8
        book.ask(4.0, 8.0, ParticipantId(2)).unwrap();
        book.ask(3.0, 2.0, ParticipantId(2)).unwrap();

        let allocation = bargain(BargainRule::Nash, &book, &pair(ParticipantId(1), ParticipantId(2)));
        let entry = allocation.buyers[0];

        // 2 units at 6 (10 vs 2), 1 unit at 4 (6 vs 2), then 6 < 8 stops
        assert!(approx_eq(entry.units, 3.0));
        assert!(approx_eq(entry.price.unwrap(), 16.0 / 3.0));
    }

    #[test]
    fn test_no_crossing_has_no_price() {
        let mut book = OrderBook::new();
        book.bid(3.0, 1.0, ParticipantId(1)).unwrap();
        book.ask(3.0, 2.0, ParticipantId(2)).unwrap();

        let allocation = bargain(BargainRule::Middle, &book, &pair(ParticipantId(1), ParticipantId(2)));

        assert_eq!(allocation.buyers[0].units, 0.0);
        assert_eq!(allocation.buyers[0].price, None);
        assert_eq!(allocation.sellers[0].price, None);
    }

    #[test]
    fn test_pairs_settle_independently() {
        let mut book = OrderBook::new();
        book.bid(1.0, 5.0, ParticipantId(1)).unwrap();
        book.bid(4.0, 9.0, ParticipantId(2)).unwrap();
        book.ask(2.0, 1.0, ParticipantId(10)).unwrap();
        book.ask(3.0, 7.0, ParticipantId(20)).unwrap();

        let matching: Matching = [
            (ParticipantId(1), ParticipantId(10)),
            (ParticipantId(2), ParticipantId(20)),
        ]
        .into_iter()
        .collect();
        let allocation = bargain(BargainRule::Middle, &book, &matching);

        assert_eq!(allocation.buyer(ParticipantId(1)).unwrap().units, 1.0);
        assert_eq!(allocation.buyer(ParticipantId(1)).unwrap().price, Some(3.0));
        assert_eq!(allocation.seller(ParticipantId(20)).unwrap().units, 3.0);
        assert_eq!(allocation.seller(ParticipantId(20)).unwrap().price, Some(8.0));
        assert!(approx_eq(allocation.total_bought(), allocation.total_sold()));
    }
}
