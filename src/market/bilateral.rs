//! Bilateral market: pair buyers with sellers, then bargain per pair.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::engine::{bargain, match_participants, BargainRule, MatchingRule};
use crate::error::Result;
use crate::market::{Market, MarketConfig};
use crate::orderbook::OrderBook;
use crate::types::{Allocation, Matching};

/// Result of one bilateral clearing pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BilateralClearing {
    pub matching: Matching,
    pub allocation: Allocation,
}

/// Every buyer trades only with the seller it is matched to.
///
/// Requires as many distinct sellers as buyers at clearing time. Random
/// choices draw from a ChaCha8 stream seeded at construction, so a market
/// rebuilt with the same seed and orders clears identically.
#[derive(Debug, Clone)]
pub struct BilateralMarket {
    book: OrderBook,
    matching: MatchingRule,
    bargaining: BargainRule,
    rng: ChaCha8Rng,
}

impl BilateralMarket {
    pub fn new(matching: MatchingRule, bargaining: BargainRule, seed: u64) -> Self {
        Self {
            book: OrderBook::new(),
            matching,
            bargaining,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Build from matching and bargaining rule names
    pub fn from_names(matching: &str, bargaining: &str, seed: u64) -> Result<Self> {
        Ok(Self::new(matching.parse()?, bargaining.parse()?, seed))
    }

    pub fn from_config(config: &MarketConfig) -> Self {
        Self::new(config.matching, config.bargaining, config.seed)
    }

    #[inline]
    pub fn matching_rule(&self) -> MatchingRule {
        self.matching
    }

    #[inline]
    pub fn bargain_rule(&self) -> BargainRule {
        self.bargaining
    }

    /// Restart the random stream
    pub fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }
}

impl Market for BilateralMarket {
    type Outcome = BilateralClearing;

    fn book(&self) -> &OrderBook {
        &self.book
    }

    fn book_mut(&mut self) -> &mut OrderBook {
        &mut self.book
    }

    /// # Errors
    ///
    /// [`MarketError::UnbalancedMarket`](crate::error::MarketError::UnbalancedMarket)
    /// when buyer and seller counts differ.
    fn clear(&mut self) -> Result<BilateralClearing> {
        let matching = match_participants(self.matching, &self.book, &mut self.rng)?;
        let allocation = bargain(self.bargaining, &self.book, &matching);
        Ok(BilateralClearing { matching, allocation })
    }
}
