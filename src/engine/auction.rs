//! One-sided auctions over sealed bids.
//!
//! These mechanisms ignore the order book: each participant submits a single
//! value and a single unit is sold.
//!
//! ## Rules
//!
//! - **First-price**: highest value wins and pays it
//! - **Second-price**: highest value wins and pays the highest value strictly
//!   below it (or its own value when no such bid exists)
//! - **Reverse**: lowest value wins and is paid it (procurement)
//! - **English**: ascending price ladder, last bidder standing wins
//! - **Dutch**: descending price ladder, first bidder to accept wins
//!
//! Sealed-bid ties split the unit equally: with `k` winners each receives
//! `1/k` units and pays `price / k`. Ladder auctions break ties by bid order.
//!
//! ## Example
//!
//! ```
//! use marketsim::engine::auction::{run_auction, AuctionRule, PriceLadder, SealedBids};
//! use marketsim::types::ParticipantId;
//!
//! let bids = SealedBids::from_pairs([
//!     (ParticipantId(1), 4.0),
//!     (ParticipantId(2), 7.0),
//!     (ParticipantId(3), 5.0),
//! ])
//! .unwrap();
//!
//! let allocation = run_auction(AuctionRule::SecondPrice, &bids, &PriceLadder::default()).unwrap();
//! assert_eq!(allocation.buyers[0].participant, ParticipantId(2));
//! assert_eq!(allocation.buyers[0].price, Some(5.0));
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{MarketError, Result};
use crate::types::price::{approx_eq, bid_accepts, EPSILON};
use crate::types::{Allocation, AllocationEntry, ParticipantId};

// ============================================================================
// Sealed bids
// ============================================================================

/// One value per participant, in submission order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SealedBids {
    bids: Vec<(ParticipantId, f64)>,
}

impl SealedBids {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect bids, failing on the first invalid or duplicate entry
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (ParticipantId, f64)>,
    {
        let mut bids = Self::new();
        for (participant, value) in pairs {
            bids.insert(participant, value)?;
        }
        Ok(bids)
    }

    /// Record `participant`'s bid.
    ///
    /// # Errors
    ///
    /// - [`MarketError::InvalidBid`] for a negative or non-finite value
    /// - [`MarketError::DuplicateBidder`] if the participant already bid
    pub fn insert(&mut self, participant: ParticipantId, value: f64) -> Result<()> {
        if !value.is_finite() || value < 0.0 {
            return Err(MarketError::InvalidBid { participant, value });
        }
        if self.get(participant).is_some() {
            return Err(MarketError::DuplicateBidder(participant));
        }
        self.bids.push((participant, value));
        Ok(())
    }

    pub fn get(&self, participant: ParticipantId) -> Option<f64> {
        self.bids
            .iter()
            .find(|(p, _)| *p == participant)
            .map(|&(_, value)| value)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ParticipantId, f64)> + '_ {
        self.bids.iter().copied()
    }

    /// Highest value, if any
    pub fn max_value(&self) -> Option<f64> {
        self.iter().map(|(_, v)| v).reduce(f64::max)
    }

    /// Lowest value, if any
    pub fn min_value(&self) -> Option<f64> {
        self.iter().map(|(_, v)| v).reduce(f64::min)
    }

    /// Participants bidding `value` (within tolerance), in bid order
    fn at(&self, value: f64) -> Vec<ParticipantId> {
        self.iter()
            .filter(|&(_, v)| approx_eq(v, value))
            .map(|(p, _)| p)
            .collect()
    }
}

// ============================================================================
// Price ladder
// ============================================================================

/// Discrete price path for English and Dutch auctions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceLadder {
    /// Opening price; `None` opens at the lowest (English) or the highest
    /// rounded up to a multiple of `step` (Dutch) bid
    pub start: Option<f64>,
    /// Price increment per round
    pub step: f64,
}

impl Default for PriceLadder {
    fn default() -> Self {
        Self {
            start: None,
            step: 1.0,
        }
    }
}

impl PriceLadder {
    pub fn new(start: Option<f64>, step: f64) -> Result<Self> {
        let ladder = Self { start, step };
        ladder.validate()?;
        Ok(ladder)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.step.is_finite() || self.step <= 0.0 {
            return Err(MarketError::InvalidLadder("step must be finite and positive"));
        }
        if let Some(start) = self.start {
            if !start.is_finite() || start < 0.0 {
                return Err(MarketError::InvalidLadder("start must be finite and non-negative"));
            }
        }
        Ok(())
    }

    /// Price after `round` steps up from `start`
    #[inline]
    fn up(&self, start: f64, round: u64) -> f64 {
        start + self.step * round as f64
    }

    /// Price after `round` steps down from `start`
    #[inline]
    fn down(&self, start: f64, round: u64) -> f64 {
        start - self.step * round as f64
    }

    /// Last ascending round whose price `value` still accepts, or `None` if
    /// it rejects the opening price.
    fn top_rung(&self, start: f64, value: f64) -> Option<u64> {
        if !bid_accepts(value, start) {
            return None;
        }
        let mut rung = ((value - start + EPSILON) / self.step).floor() as u64;
        if rung > 0 && !bid_accepts(value, self.up(start, rung)) {
            rung -= 1;
        } else if bid_accepts(value, self.up(start, rung + 1)) {
            rung += 1;
        }
        Some(rung)
    }

    /// First descending round whose price `value` accepts
    fn first_rung(&self, start: f64, value: f64) -> u64 {
        let mut rung = ((start - value - EPSILON) / self.step).ceil().max(0.0) as u64;
        if rung > 0 && bid_accepts(value, self.down(start, rung - 1)) {
            rung -= 1;
        } else if !bid_accepts(value, self.down(start, rung)) {
            rung += 1;
        }
        rung
    }
}

// ============================================================================
// Rules
// ============================================================================

/// One-sided auction mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AuctionRule {
    #[default]
    FirstPrice,
    SecondPrice,
    Reverse,
    English,
    Dutch,
}

named_rule!(AuctionRule, "auction", {
    FirstPrice => "first-price" | "first_price" | "first",
    SecondPrice => "second-price" | "second_price" | "second" | "vickrey",
    Reverse => "reverse" | "procurement",
    English => "english" | "ascending",
    Dutch => "dutch" | "descending",
});

impl std::str::FromStr for AuctionRule {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self> {
        if let Some(rule) = Self::lookup(s) {
            return Ok(rule);
        }
        if s.trim().eq_ignore_ascii_case("double") {
            return Err(MarketError::UnsupportedAuction {
                name: s.to_string(),
                hint: "double auctions clear through PoolMarket",
            });
        }
        Err(Self::unknown(s))
    }
}

/// Run `rule` over `bids`; only the buyer side of the result is filled.
///
/// An empty bid set yields an empty allocation.
pub fn run_auction(rule: AuctionRule, bids: &SealedBids, ladder: &PriceLadder) -> Result<Allocation> {
    ladder.validate()?;

    let buyers = match (bids.max_value(), bids.min_value()) {
        (Some(max), Some(min)) => match rule {
            AuctionRule::FirstPrice => split(bids.at(max), max),
            AuctionRule::SecondPrice => {
                let second = bids
                    .iter()
                    .map(|(_, v)| v)
                    .filter(|&v| v < max - EPSILON)
                    .reduce(f64::max)
                    .unwrap_or(max);
                split(bids.at(max), second)
            }
            AuctionRule::Reverse => split(bids.at(min), min),
            AuctionRule::English => english(bids, ladder, min),
            AuctionRule::Dutch => dutch(bids, ladder, max),
        },
        _ => {
            warn!(%rule, "auction has no bids");
            Vec::new()
        }
    };

    let allocation = Allocation::new(buyers, Vec::new());
    info!(
        %rule,
        bidders = bids.len(),
        winners = allocation.buyers.len(),
        "auction complete"
    );
    Ok(allocation)
}

/// One unit split equally among `winners`, each paying its share of `price`
fn split(winners: Vec<ParticipantId>, price: f64) -> Vec<AllocationEntry> {
    let share = 1.0 / winners.len() as f64;
    winners
        .into_iter()
        .map(|participant| AllocationEntry::priced(participant, share, price * share))
        .collect()
}

/// Rounds where every remaining bidder stays in are skipped: the price jumps
/// straight to the lowest remaining drop-out point.
fn english(bids: &SealedBids, ladder: &PriceLadder, lowest: f64) -> Vec<AllocationEntry> {
    let start = ladder.start.unwrap_or(lowest);
    let mut active: Vec<(ParticipantId, u64)> = bids
        .iter()
        .filter_map(|(p, v)| ladder.top_rung(start, v).map(|rung| (p, rung)))
        .collect();

    let mut round = 0;
    while active.len() > 1 {
        let floor = active.iter().map(|&(_, rung)| rung).min().unwrap_or(round);
        round = round.max(floor);
        let staying: Vec<(ParticipantId, u64)> = active
            .iter()
            .copied()
            .filter(|&(_, rung)| rung > round)
            .collect();
        if staying.is_empty() {
            break;
        }
        round += 1;
        debug!(price = ladder.up(start, round), remaining = staying.len(), "english round");
        active = staying;
    }

    match active.first() {
        Some(&(winner, _)) => vec![AllocationEntry::priced(winner, 1.0, ladder.up(start, round))],
        None => {
            warn!(start, "no bidder accepts the opening price");
            Vec::new()
        }
    }
}

fn dutch(bids: &SealedBids, ladder: &PriceLadder, highest: f64) -> Vec<AllocationEntry> {
    let start = ladder
        .start
        .unwrap_or_else(|| (highest / ladder.step).ceil() * ladder.step);

    // The highest bidder is always the first to accept
    let price = ladder.down(start, ladder.first_rung(start, highest));
    if price < -EPSILON {
        warn!(start, "price fell below zero without a taker");
        return Vec::new();
    }
    match bids.iter().find(|&(_, v)| bid_accepts(v, price)) {
        Some((winner, _)) => {
            debug!(price, %winner, "dutch bid accepted");
            vec![AllocationEntry::priced(winner, 1.0, price.max(0.0))]
        }
        None => Vec::new(),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
