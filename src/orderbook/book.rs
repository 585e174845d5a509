//! Append-only order book.
//!
//! ## Architecture
//!
//! - **Slab**: Pre-allocated storage; the slab key is the [`OrderId`]
//! - **Curves**: Demand/supply views derived per query, never cached
//!
//! Orders are never removed during a session, so slab keys are handed out
//! sequentially and iterating the slab yields insertion order.
//!
//! ## Example
//!
//! ```
//! use marketsim::orderbook::OrderBook;
//! use marketsim::types::{ParticipantId, Side};
//!
//! let mut book = OrderBook::with_capacity(16);
//!
//! book.bid(10.0, 2.0, ParticipantId(0)).unwrap();
//! book.bid(5.0, 1.0, ParticipantId(1)).unwrap();
//! book.ask(10.0, 5.0, ParticipantId(2)).unwrap();
//! book.ask(6.0, 0.45, ParticipantId(3)).unwrap();
//!
//! assert_eq!(book.len(), 4);
//! assert_eq!(book.bid_count(), 2);
//! assert_eq!(book.supply_curve().points(), vec![(0.45, 6.0), (5.0, 16.0)]);
//! ```

use std::collections::BTreeSet;

use slab::Slab;
use tracing::debug;

use crate::error::Result;
use crate::orderbook::Curve;
use crate::types::{Order, OrderId, ParticipantId, Side};

/// The set of active orders for one market session.
#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    /// Order storage, keyed by `OrderId`
    orders: Slab<Order>,

    /// Total number of bid lines
    bid_count: usize,

    /// Total number of ask lines
    ask_count: usize,
}

impl OrderBook {
    /// Create a new empty book
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a book with pre-allocated capacity
    ///
    /// # Example
    ///
    /// ```
    /// use marketsim::orderbook::OrderBook;
    ///
    /// let book = OrderBook::with_capacity(1_000);
    /// assert!(book.capacity() >= 1_000);
    /// ```
    pub fn with_capacity(order_capacity: usize) -> Self {
        Self {
            orders: Slab::with_capacity(order_capacity),
            bid_count: 0,
            ask_count: 0,
        }
    }

    // ========================================================================
    // Capacity and Size
    // ========================================================================

    #[inline]
    pub fn capacity(&self) -> usize {
        self.orders.capacity()
    }

    /// Total number of order lines
    #[inline]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    #[inline]
    pub fn bid_count(&self) -> usize {
        self.bid_count
    }

    #[inline]
    pub fn ask_count(&self) -> usize {
        self.ask_count
    }

    // ========================================================================
    // Order Ingestion
    // ========================================================================

    /// Record one order line
    ///
    /// # Errors
    ///
    /// `MarketError::InvalidOrder` for a negative or non-finite quantity or
    /// price. Nothing is recorded in that case.
    pub fn add_order(
        &mut self,
        side: Side,
        quantity: f64,
        price: f64,
        participant: ParticipantId,
    ) -> Result<OrderId> {
        let entry = self.orders.vacant_entry();
        let id = OrderId(entry.key());
        let order = Order::new(id, side, quantity, price, participant)?;
        entry.insert(order);

        match side {
            Side::Buy => self.bid_count += 1,
            Side::Sell => self.ask_count += 1,
        }
        debug!(order = id.0, %side, quantity, price, %participant, "order recorded");
        Ok(id)
    }

    /// Record a bid (buy order)
    pub fn bid(&mut self, quantity: f64, price: f64, participant: ParticipantId) -> Result<OrderId> {
        self.add_order(Side::Buy, quantity, price, participant)
    }

    /// Record an ask (sell order)
    pub fn ask(&mut self, quantity: f64, price: f64, participant: ParticipantId) -> Result<OrderId> {
        self.add_order(Side::Sell, quantity, price, participant)
    }

    /// Record a batch of `(quantity, price, participant)` lines for one side.
    ///
    /// The whole batch is validated before anything is inserted: either
    /// every line is recorded or none is.
    ///
    /// # Returns
    ///
    /// The number of lines recorded
    pub fn extend<I>(&mut self, side: Side, lines: I) -> Result<usize>
    where
        I: IntoIterator<Item = (f64, f64, ParticipantId)>,
    {
        let lines: Vec<_> = lines.into_iter().collect();
        for (i, &(quantity, price, participant)) in lines.iter().enumerate() {
            Order::new(OrderId(self.orders.len() + i), side, quantity, price, participant)?;
        }

        self.orders.reserve(lines.len());
        for &(quantity, price, participant) in &lines {
            self.add_order(side, quantity, price, participant)?;
        }
        Ok(lines.len())
    }

    // ========================================================================
    // Views
    // ========================================================================

    /// Look up an order line by id
    #[inline]
    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.orders.get(id.0)
    }

    /// All order lines in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Order> + '_ {
        self.orders.iter().map(|(_, order)| order)
    }

    /// Order lines of one side in insertion order
    pub fn side(&self, side: Side) -> impl Iterator<Item = &Order> + '_ {
        self.iter().filter(move |order| order.side == side)
    }

    /// Snapshot of the book, optionally restricted to one side
    pub fn orders(&self, side: Option<Side>) -> Vec<Order> {
        match side {
            Some(side) => self.side(side).copied().collect(),
            None => self.iter().copied().collect(),
        }
    }

    /// Distinct participants of one side in first-appearance order
    pub fn participants(&self, side: Side) -> Vec<ParticipantId> {
        let mut seen = BTreeSet::new();
        self.side(side)
            .map(|order| order.participant)
            .filter(|participant| seen.insert(*participant))
            .collect()
    }

    /// Aggregated demand curve (bids, highest price first)
    pub fn demand_curve(&self) -> Curve {
        Curve::from_orders(Side::Buy, self.iter())
    }

    /// Aggregated supply curve (asks, lowest price first)
    pub fn supply_curve(&self) -> Curve {
        Curve::from_orders(Side::Sell, self.iter())
    }

    /// Clear all orders from the book
    pub fn clear(&mut self) {
        self.orders.clear();
        self.bid_count = 0;
        self.ask_count = 0;
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
