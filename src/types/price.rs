//! Price and quantity utilities.
//!
//! ## Overview
//!
//! Prices and quantities are `f64`. Fractional shares are a first-class
//! outcome of the rationing rules (a third of a unit, say), so every
//! comparison that decides equality, feasibility or "nothing left" goes
//! through the single tolerance [`EPSILON`] instead of `==`.
//!
//! ## Examples
//!
//! ```
//! use marketsim::types::price::{approx_eq, is_zero, EPSILON};
//!
//! assert!(approx_eq(0.1 + 0.2, 0.3));
//! assert!(is_zero(EPSILON / 2.0));
//! assert!(!is_zero(1e-6));
//! ```

use std::cmp::Ordering;

use crate::error::{MarketError, Result};

/// Tolerance for price equality, feasibility and zero-volume checks.
pub const EPSILON: f64 = 1e-9;

// ============================================================================
// Comparisons
// ============================================================================

/// Check whether two values are equal within [`EPSILON`]
#[inline]
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON
}

/// Check whether a quantity is zero within [`EPSILON`]
#[inline]
pub fn is_zero(value: f64) -> bool {
    value.abs() <= EPSILON
}

/// A buy line at `price` is willing to trade at `clearing`.
#[inline]
pub fn bid_accepts(price: f64, clearing: f64) -> bool {
    price >= clearing - EPSILON
}

/// A sell line at `price` is willing to trade at `clearing`.
#[inline]
pub fn ask_accepts(price: f64, clearing: f64) -> bool {
    price <= clearing + EPSILON
}

/// Total order for sorting prices descending (best bid first).
#[inline]
pub fn descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

/// Total order for sorting prices ascending (best ask first).
#[inline]
pub fn ascending(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

// ============================================================================
// Validation
// ============================================================================

/// Validate an order quantity
///
/// # Returns
///
/// * `Ok(quantity)` - if finite and non-negative
/// * `Err(MarketError::InvalidOrder)` - otherwise
pub fn validate_quantity(quantity: f64) -> Result<f64> {
    if quantity.is_finite() && quantity >= 0.0 {
        Ok(quantity)
    } else {
        Err(MarketError::InvalidOrder {
            field: "quantity",
            value: quantity,
        })
    }
}

/// Validate a per-unit price
pub fn validate_price(price: f64) -> Result<f64> {
    if price.is_finite() && price >= 0.0 {
        Ok(price)
    } else {
        Err(MarketError::InvalidOrder {
            field: "price",
            value: price,
        })
    }
}

// ============================================================================
// Weighted mean
// ============================================================================

/// Running quantity-weighted mean price.
///
/// Used for a participant's mean order price and for the settlement price
/// of a bargaining pair.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeightedPrice {
    /// Sum of quantities seen so far
    pub quantity: f64,
    /// Sum of price * quantity
    pub notional: f64,
}

impl WeightedPrice {
    /// Add `quantity` units at `price`
    #[inline]
    pub fn add(&mut self, price: f64, quantity: f64) {
        self.quantity += quantity;
        self.notional += price * quantity;
    }

    /// Mean price, or `None` when no quantity has been added
    pub fn mean(&self) -> Option<f64> {
        if is_zero(self.quantity) {
            None
        } else {
            Some(self.notional / self.quantity)
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
