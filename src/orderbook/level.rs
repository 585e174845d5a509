//! Aggregated quantity at a single price.
//!
//! ## Design
//!
//! A `PriceLevel` merges every order line of one side whose price is equal
//! (within [`EPSILON`](crate::types::price::EPSILON)). The quantities are
//! summed for curve purposes but the ids of the merged lines are kept, so
//! the originating participants can always be recovered from the book.

use crate::types::{Order, OrderId};

/// A price level on a demand or supply curve.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceLevel {
    /// Price for this level (the first merged line's price)
    pub price: f64,

    /// Total quantity of all merged lines
    pub total_quantity: f64,

    /// Ids of the merged order lines, in insertion order
    pub orders: Vec<OrderId>,
}

impl PriceLevel {
    /// Create a new empty price level
    pub fn new(price: f64) -> Self {
        Self {
            price,
            total_quantity: 0.0,
            orders: Vec::new(),
        }
    }

    /// Create a level holding a single order line
    pub fn from_order(order: &Order) -> Self {
        let mut level = Self::new(order.price);
        level.push(order);
        level
    }

    /// Merge an order line into this level
    #[inline]
    pub fn push(&mut self, order: &Order) {
        self.total_quantity += order.quantity;
        self.orders.push(order.id);
    }

    /// Number of merged order lines
    #[inline]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Check if the price level is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
