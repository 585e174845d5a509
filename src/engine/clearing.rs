//! Pooled double-auction clearing-price search.
//!
//! ## Algorithm
//!
//! For a candidate price `p`:
//!
//! - feasible demand = cumulative bid quantity priced at or above `p`
//! - feasible supply = cumulative ask quantity priced at or below `p`
//! - volume = min of the two, gap = absolute difference
//!
//! Sweeping the sorted union of bid and ask prices upwards, volume first
//! rises (supply binds) then falls (demand binds). The scan stops at the
//! first strict decrease and returns the previous candidate; if volume never
//! decreases the last candidate wins.
//!
//! Cost: O(N log N) to sort the candidates plus O(log N) per candidate.
//!
//! ## Example
//!
//! ```
//! use marketsim::engine::clearing::compute_clearing_price;
//! use marketsim::orderbook::OrderBook;
//! use marketsim::types::ParticipantId;
//!
//! let mut book = OrderBook::new();
//! book.bid(10.0, 2.0, ParticipantId(0)).unwrap();
//! book.bid(5.0, 1.0, ParticipantId(1)).unwrap();
//! book.ask(10.0, 5.0, ParticipantId(2)).unwrap();
//! book.ask(6.0, 0.45, ParticipantId(3)).unwrap();
//!
//! let result = compute_clearing_price(&book);
//! assert_eq!((result.price, result.volume, result.gap), (2.0, 6.0, 4.0));
//! ```

use tracing::{debug, info, warn};

use crate::orderbook::{Curve, OrderBook};
use crate::types::price::{approx_eq, ascending, EPSILON};
use crate::types::ClearingResult;

/// Tradeable volume and imbalance at one candidate price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeAt {
    pub price: f64,
    pub demand: f64,
    pub supply: f64,
}

impl VolumeAt {
    /// Evaluate both curves at `price`
    pub fn evaluate(demand: &Curve, supply: &Curve, price: f64) -> Self {
        Self {
            price,
            demand: demand.feasible_quantity(price),
            supply: supply.feasible_quantity(price),
        }
    }

    #[inline]
    pub fn volume(&self) -> f64 {
        self.demand.min(self.supply)
    }

    #[inline]
    pub fn gap(&self) -> f64 {
        (self.demand - self.supply).abs()
    }
}

/// Distinct bid and ask prices, ascending
pub fn candidate_prices(demand: &Curve, supply: &Curve) -> Vec<f64> {
    let mut prices: Vec<f64> = demand.prices().chain(supply.prices()).collect();
    prices.sort_by(|a, b| ascending(*a, *b));
    prices.dedup_by(|a, b| approx_eq(*a, *b));
    prices
}

/// Volume at every candidate price, in scan order.
///
/// Not used by the search itself; exposed so callers can inspect the
/// volume profile the search walks over.
pub fn volume_profile(demand: &Curve, supply: &Curve) -> Vec<VolumeAt> {
    candidate_prices(demand, supply)
        .into_iter()
        .map(|price| VolumeAt::evaluate(demand, supply, price))
        .collect()
}

/// Run the clearing search over precomputed curves.
///
/// Returns [`ClearingResult::empty`] when either curve is empty.
pub fn clear_curves(demand: &Curve, supply: &Curve) -> ClearingResult {
    if demand.is_empty() {
        warn!("there are no active bids; clearing is undefined");
        return ClearingResult::empty();
    }
    if supply.is_empty() {
        warn!("there are no active asks; clearing is undefined");
        return ClearingResult::empty();
    }

    let mut best: Option<VolumeAt> = None;
    for price in candidate_prices(demand, supply) {
        let current = VolumeAt::evaluate(demand, supply, price);
        debug!(price, volume = current.volume(), gap = current.gap(), "candidate price");

        if let Some(previous) = best {
            if current.volume() < previous.volume() - EPSILON {
                break;
            }
        }
        best = Some(current);
    }

    // Both curves are non-empty, so at least one candidate was evaluated.
    let result = best
        .map(|at| ClearingResult::new(at.price, at.volume(), at.gap()))
        .unwrap_or_default();
    info!(price = result.price, volume = result.volume, gap = result.gap, "market cleared");
    result
}

/// Find the volume-maximising clearing price of a pooled market.
pub fn compute_clearing_price(book: &OrderBook) -> ClearingResult {
    clear_curves(&book.demand_curve(), &book.supply_curve())
}

// ============================================================================
// Unit Tests
// ============================================================================
