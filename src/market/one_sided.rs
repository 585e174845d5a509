//! One-sided auction market.

use crate::engine::{run_auction, AuctionRule, PriceLadder, SealedBids};
use crate::error::Result;
use crate::market::MarketConfig;
use crate::types::{Allocation, ParticipantId};

/// A single unit auctioned to sealed bidders.
///
/// Not a [`Market`](crate::market::Market): there is no order book, each
/// participant submits exactly one value.
#[derive(Debug, Clone, Default)]
pub struct OneSidedMarket {
    bids: SealedBids,
    rule: AuctionRule,
    ladder: PriceLadder,
}

impl OneSidedMarket {
    /// Create a market; fails if `ladder` is invalid
    pub fn new(rule: AuctionRule, ladder: PriceLadder) -> Result<Self> {
        ladder.validate()?;
        Ok(Self {
            bids: SealedBids::new(),
            rule,
            ladder,
        })
    }

    /// Build from an auction rule name with the default ladder
    pub fn from_name(auction: &str) -> Result<Self> {
        Self::new(auction.parse()?, PriceLadder::default())
    }

    pub fn from_config(config: &MarketConfig) -> Result<Self> {
        Self::new(config.auction, config.ladder)
    }

    #[inline]
    pub fn rule(&self) -> AuctionRule {
        self.rule
    }

    #[inline]
    pub fn bids(&self) -> &SealedBids {
        &self.bids
    }

    /// Submit `participant`'s sealed value
    pub fn submit(&mut self, participant: ParticipantId, value: f64) -> Result<()> {
        self.bids.insert(participant, value)
    }

    /// Run the auction; the allocation has buyer entries only
    pub fn clear(&self) -> Result<Allocation> {
        run_auction(self.rule, &self.bids, &self.ladder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MarketError;

    #[test]
    fn test_reverse_auction() {
        let mut market = OneSidedMarket::from_name("reverse").unwrap();
        market.submit(ParticipantId(1), 5.0).unwrap();
        market.submit(ParticipantId(4), 1.5).unwrap();

        let allocation = market.clear().unwrap();
        assert_eq!(allocation.buyers.len(), 1);
        assert_eq!(allocation.buyers[0].participant, ParticipantId(4));
        assert_eq!(allocation.buyers[0].price, Some(1.5));
    }

    #[test]
    fn test_double_is_rejected() {
        assert!(matches!(
            OneSidedMarket::from_name("double"),
            Err(MarketError::UnsupportedAuction { .. })
        ));
    }

    #[test]
    fn test_bad_ladder_in_config() {
        let config = MarketConfig::default().with_ladder(PriceLadder { start: None, step: -1.0 });
        assert!(matches!(
            OneSidedMarket::from_config(&config),
            Err(MarketError::InvalidLadder(_))
        ));
    }

    #[test]
    fn test_duplicate_submission() {
        let mut market = OneSidedMarket::new(AuctionRule::English, PriceLadder::default()).unwrap();
        market.submit(ParticipantId(1), 3.0).unwrap();

        assert!(market.submit(ParticipantId(1), 4.0).is_err());
        assert_eq!(market.bids().len(), 1);
    }
}
