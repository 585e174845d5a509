//! Rule selection for every market kind.
//!
//! A [`MarketConfig`] can be built in code, from rule names, or deserialized
//! (any serde format). Every rule name is validated while the config is
//! built, so an unknown name fails before any order is processed:
//!
//! ```
//! use marketsim::market::MarketConfig;
//! use marketsim::engine::MatchingRule;
//!
//! let config = MarketConfig::from_names("welfare", "maximum", "nash", "first-price").unwrap();
//! assert_eq!(config.matching, MatchingRule::MaximumWeight);
//!
//! assert!(MarketConfig::from_names("welfare", "maximum", "haggle", "first-price").is_err());
//! ```

use serde::{Deserialize, Serialize};

use crate::engine::{AllocationRule, AuctionRule, BargainRule, MatchingRule, PriceLadder};
use crate::error::Result;

/// Rules and parameters shared by market constructors.
///
/// Missing fields deserialize to their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Pooled markets: rationing after clearing
    pub allocation: AllocationRule,
    /// Bilateral markets: buyer/seller pairing
    pub matching: MatchingRule,
    /// Bilateral markets: per-pair settlement
    pub bargaining: BargainRule,
    /// One-sided markets: mechanism
    pub auction: AuctionRule,
    /// Seed for every random choice (random matching)
    pub seed: u64,
    /// English/Dutch price path
    pub ladder: PriceLadder,
}

impl MarketConfig {
    /// Build a config from rule names, with the default seed and ladder
    pub fn from_names(allocation: &str, matching: &str, bargaining: &str, auction: &str) -> Result<Self> {
        Ok(Self {
            allocation: allocation.parse()?,
            matching: matching.parse()?,
            bargaining: bargaining.parse()?,
            auction: auction.parse()?,
            ..Self::default()
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_ladder(mut self, ladder: PriceLadder) -> Self {
        self.ladder = ladder;
        self
    }

    /// Check parameters the rule names do not cover
    pub fn validate(&self) -> Result<()> {
        self.ladder.validate()
    }
}
