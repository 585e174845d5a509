//! Order types for the market order book.
//!
//! An [`Order`] is a priced quantity on one side of the market, recorded on
//! behalf of a participant. Orders are immutable once recorded; the book
//! assigns the [`OrderId`] at insertion.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::price::{validate_price, validate_quantity};

// ============================================================================
// Side enum
// ============================================================================

/// Order side: Buy or Sell
///
/// Represented as u8 in fingerprints:
/// - Buy = 0
/// - Sell = 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buy order (bid)
    #[default]
    Buy,
    /// Sell order (ask)
    Sell,
}

impl Side {
    /// Convert to u8 for hashing
    pub fn to_u8(self) -> u8 {
        match self {
            Side::Buy => 0,
            Side::Sell => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => f.write_str("bid"),
            Side::Sell => f.write_str("ask"),
        }
    }
}

// ============================================================================
// Identifiers
// ============================================================================

/// Participant (buyer, seller or bidder) identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub u64);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<u64> for ParticipantId {
    fn from(id: u64) -> Self {
        ParticipantId(id)
    }
}

/// Order line identifier, assigned by the book in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub usize);

// ============================================================================
// Order struct
// ============================================================================

/// A priced order line.
///
/// ## Example
///
/// ```
/// use marketsim::types::{Order, OrderId, ParticipantId, Side};
///
/// // Participant 7 wants 10 units at up to 2.0 each
/// let order = Order::new(OrderId(0), Side::Buy, 10.0, 2.0, ParticipantId(7)).unwrap();
/// assert_eq!(order.side, Side::Buy);
/// assert_eq!(order.notional(), 20.0);
///
/// // Negative quantities are rejected, not clamped
/// assert!(Order::new(OrderId(1), Side::Sell, -1.0, 2.0, ParticipantId(8)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Order {
    /// Insertion sequence number within the book
    pub id: OrderId,

    /// Buy or sell
    pub side: Side,

    /// Units offered or requested
    pub quantity: f64,

    /// Per-unit limit price
    pub price: f64,

    /// Who placed the order
    pub participant: ParticipantId,
}

impl Order {
    /// Create a validated order
    ///
    /// # Errors
    ///
    /// `MarketError::InvalidOrder` if quantity or price is negative or not finite.
    pub fn new(
        id: OrderId,
        side: Side,
        quantity: f64,
        price: f64,
        participant: ParticipantId,
    ) -> Result<Self> {
        Ok(Self {
            id,
            side,
            quantity: validate_quantity(quantity)?,
            price: validate_price(price)?,
            participant,
        })
    }

    /// Price times quantity
    #[inline]
    pub fn notional(&self) -> f64 {
        self.price * self.quantity
    }

    /// Whether this order is willing to trade at `clearing`
    #[inline]
    pub fn accepts(&self, clearing: f64) -> bool {
        match self.side {
            Side::Buy => crate::types::price::bid_accepts(self.price, clearing),
            Side::Sell => crate::types::price::ask_accepts(self.price, clearing),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
