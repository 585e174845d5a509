//! Pooled double-auction market.

use serde::Serialize;
use tracing::info;

use crate::engine::{allocate, compute_clearing_price, AllocationRule};
use crate::error::Result;
use crate::market::{Market, MarketConfig};
use crate::orderbook::OrderBook;
use crate::types::{Allocation, ClearingResult};

/// Result of one pooled clearing pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolClearing {
    pub result: ClearingResult,
    /// Empty when nothing could trade
    pub allocation: Allocation,
}

/// All bids and asks trade at one clearing price, then the volume is
/// rationed by an [`AllocationRule`].
#[derive(Debug, Clone, Default)]
pub struct PoolMarket {
    book: OrderBook,
    rule: AllocationRule,
}

impl PoolMarket {
    pub fn new(rule: AllocationRule) -> Self {
        Self {
            book: OrderBook::new(),
            rule,
        }
    }

    /// Build from an allocation rule name
    pub fn from_name(allocation: &str) -> Result<Self> {
        Ok(Self::new(allocation.parse()?))
    }

    pub fn from_config(config: &MarketConfig) -> Self {
        Self::new(config.allocation)
    }

    #[inline]
    pub fn rule(&self) -> AllocationRule {
        self.rule
    }
}

impl Market for PoolMarket {
    type Outcome = PoolClearing;

    fn book(&self) -> &OrderBook {
        &self.book
    }

    fn book_mut(&mut self) -> &mut OrderBook {
        &mut self.book
    }

    fn clear(&mut self) -> Result<PoolClearing> {
        let result = compute_clearing_price(&self.book);
        if result.is_empty() {
            info!(%result, "nothing to allocate");
            return Ok(PoolClearing {
                result,
                allocation: Allocation::default(),
            });
        }

        let allocation = allocate(self.rule, &self.book, &result);
        Ok(PoolClearing { result, allocation })
    }
}
