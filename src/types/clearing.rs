//! Outcome of a pooled clearing-price search.

use std::fmt;

use serde::Serialize;

use crate::types::price::is_zero;

/// Clearing price, tradeable volume and residual imbalance.
///
/// Produced once per clearing call and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ClearingResult {
    /// Single price at which every trade of the pass settles
    pub price: f64,

    /// Quantity actually tradeable at `price`
    pub volume: f64,

    /// |feasible demand - feasible supply| at `price`
    pub gap: f64,
}

impl ClearingResult {
    pub fn new(price: f64, volume: f64, gap: f64) -> Self {
        Self { price, volume, gap }
    }

    /// The sentinel returned when one side of the book is empty
    pub fn empty() -> Self {
        Self::default()
    }

    /// Nothing can trade at this result
    pub fn is_empty(&self) -> bool {
        is_zero(self.volume)
    }
}

impl fmt::Display for ClearingResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "price={} volume={} gap={}",
            self.price, self.volume, self.gap
        )
    }
}
