//! Demand and supply curves derived from the book.
//!
//! ## Ordering
//!
//! - **Demand** (bids): price levels sorted high-to-low
//! - **Supply** (asks): price levels sorted low-to-high
//!
//! Lines at equal prices are merged into one [`PriceLevel`]. Alongside the
//! levels the curve keeps the running (cumulative) quantity, so the feasible
//! quantity at any price is a binary search plus one lookup.
//!
//! ## Example
//!
//! ```
//! use marketsim::orderbook::OrderBook;
//!
//! let mut book = OrderBook::new();
//! book.bid(10.0, 2.0, 0u64.into()).unwrap();
//! book.bid(5.0, 1.0, 1u64.into()).unwrap();
//!
//! let demand = book.demand_curve();
//! assert_eq!(demand.points(), vec![(2.0, 10.0), (1.0, 15.0)]);
//! assert_eq!(demand.feasible_quantity(1.5), 10.0);
//! ```

use crate::orderbook::PriceLevel;
use crate::types::price::{approx_eq, ascending, ask_accepts, bid_accepts, descending};
use crate::types::{Order, Side};

/// Aggregated, sorted curve for one side of the book.
///
/// Recomputed on demand from the book; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    side: Side,
    levels: Vec<PriceLevel>,
    cumulative: Vec<f64>,
}

impl Curve {
    /// Build a curve from the order lines of one side.
    ///
    /// Lines of the other side are ignored. Sorting is stable, so lines that
    /// merge into one level keep their insertion order.
    pub fn from_orders<'a, I>(side: Side, orders: I) -> Self
    where
        I: IntoIterator<Item = &'a Order>,
    {
        let mut lines: Vec<&Order> = orders.into_iter().filter(|o| o.side == side).collect();
        match side {
            Side::Buy => lines.sort_by(|a, b| descending(a.price, b.price)),
            Side::Sell => lines.sort_by(|a, b| ascending(a.price, b.price)),
        }

        let mut levels: Vec<PriceLevel> = Vec::new();
        for order in lines {
            match levels.last_mut() {
                Some(level) if approx_eq(level.price, order.price) => level.push(order),
                _ => levels.push(PriceLevel::from_order(order)),
            }
        }

        let mut running = 0.0;
        let cumulative = levels
            .iter()
            .map(|level| {
                running += level.total_quantity;
                running
            })
            .collect();

        Self {
            side,
            levels,
            cumulative,
        }
    }

    /// Side this curve was built from
    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    /// Price levels in curve order
    #[inline]
    pub fn levels(&self) -> &[PriceLevel] {
        &self.levels
    }

    /// Number of distinct price levels
    #[inline]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Level prices in curve order
    pub fn prices(&self) -> impl Iterator<Item = f64> + '_ {
        self.levels.iter().map(|level| level.price)
    }

    /// (price, cumulative quantity) pairs in curve order
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.prices().zip(self.cumulative.iter().copied()).collect()
    }

    /// Vertices of the step function (cumulative quantity, price) that
    /// plotting front-ends draw: starts at zero quantity and repeats the last
    /// price at the total quantity.
    pub fn step_points(&self) -> Vec<(f64, f64)> {
        let mut steps = Vec::with_capacity(self.levels.len() + 1);
        let mut quantity = 0.0;
        for (level, cumulative) in self.levels.iter().zip(&self.cumulative) {
            steps.push((quantity, level.price));
            quantity = *cumulative;
        }
        if let Some(last) = self.levels.last() {
            steps.push((quantity, last.price));
        }
        steps
    }

    /// Total quantity on this side
    pub fn total_quantity(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Quantity willing to trade at `price`.
    ///
    /// Demand: all levels priced at or above `price`. Supply: all levels
    /// priced at or below `price`. Both are prefixes of the curve, found by
    /// binary search.
    pub fn feasible_quantity(&self, price: f64) -> f64 {
        let count = match self.side {
            Side::Buy => self.levels.partition_point(|l| bid_accepts(l.price, price)),
            Side::Sell => self.levels.partition_point(|l| ask_accepts(l.price, price)),
        };
        match count {
            0 => 0.0,
            n => self.cumulative[n - 1],
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrderId, ParticipantId};

    fn line(id: usize, side: Side, quantity: f64, price: f64) -> Order {
        Order::new(OrderId(id), side, quantity, price, ParticipantId(id as u64)).unwrap()
    }

    fn supply() -> Curve {
        let orders = vec![
            line(0, Side::Sell, 10.0, 5.0),
            line(1, Side::Sell, 6.0, 0.45),
            line(2, Side::Sell, 4.0, 5.0),
            line(3, Side::Buy, 99.0, 1.0),
        ];
        Curve::from_orders(Side::Sell, &orders)
    }

    #[test]
    fn test_supply_sorted_and_merged() {
        let curve = supply();

        assert_eq!(curve.side(), Side::Sell);
        assert_eq!(curve.len(), 2);
        assert_eq!(curve.points(), vec![(0.45, 6.0), (5.0, 20.0)]);
        assert_eq!(curve.levels()[1].orders, vec![OrderId(0), OrderId(2)]);
        assert_eq!(curve.total_quantity(), 20.0);
    }

    #[test]
    fn test_demand_sorted_descending() {
        let orders = vec![
            line(0, Side::Buy, 5.0, 1.0),
            line(1, Side::Buy, 10.0, 1.5),
            line(2, Side::Buy, 20.0, 0.5),
        ];
        let curve = Curve::from_orders(Side::Buy, &orders);

        assert_eq!(curve.prices().collect::<Vec<_>>(), vec![1.5, 1.0, 0.5]);
        assert_eq!(curve.points(), vec![(1.5, 10.0), (1.0, 15.0), (0.5, 35.0)]);
    }

    #[test]
    fn test_feasible_quantity() {
        let curve = supply();

        assert_eq!(curve.feasible_quantity(0.1), 0.0);
        assert_eq!(curve.feasible_quantity(0.45), 6.0);
        assert_eq!(curve.feasible_quantity(2.0), 6.0);
        assert_eq!(curve.feasible_quantity(5.0), 20.0);
        assert_eq!(curve.feasible_quantity(100.0), 20.0);
    }

    #[test]
    fn test_step_points() {
        let curve = supply();
        assert_eq!(
            curve.step_points(),
            vec![(0.0, 0.45), (6.0, 5.0), (20.0, 5.0)]
        );

        let empty = Curve::from_orders(Side::Buy, &Vec::<Order>::new());
        assert!(empty.step_points().is_empty());
        assert_eq!(empty.feasible_quantity(1.0), 0.0);
    }
}
