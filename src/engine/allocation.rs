//! Post-clearing rationing rules.
//!
//! Once a clearing price is fixed, only *feasible* lines take part: bids
//! priced at or above the clearing price and asks priced at or below it.
//! Each rule then splits the clearing volume among the feasible participants
//! of each side. Every entry settles at the clearing price.
//!
//! | Rule | Unit of rationing | Shortage handling |
//! |------|-------------------|-------------------|
//! | Proportional | participant | scale everyone by volume / feasible total |
//! | Uniform | participant | equal split, may exceed a participant's request |
//! | Price-priority | participant, ranked by mean price | fill in rank order, last one clipped |
//! | Welfare | order line, ranked by price | fill best lines first, re-aggregate |
//!
//! For all four rules the units bought and the units sold both sum to the
//! clearing volume (the feasible totals on each side are at least the
//! volume by construction of the clearing search).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::orderbook::OrderBook;
use crate::types::price::{ascending, descending, is_zero, WeightedPrice};
use crate::types::{Allocation, AllocationEntry, ClearingResult, Order, ParticipantId, Side};

/// Rationing rule applied after the clearing price is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AllocationRule {
    /// Volume shared in proportion to each participant's feasible quantity
    Proportional,
    /// Volume split equally among feasible participants
    #[default]
    Uniform,
    /// Most eager participants (by mean price) filled first
    PricePriority,
    /// Best-priced order lines filled first
    Welfare,
}

named_rule!(AllocationRule, "allocation", {
    Proportional => "proportional",
    Uniform => "uniform",
    PricePriority => "price-priority" | "price" | "price_priority",
    Welfare => "welfare",
});

impl std::str::FromStr for AllocationRule {
    type Err = crate::error::MarketError;

    fn from_str(s: &str) -> crate::error::Result<Self> {
        Self::lookup(s).ok_or_else(|| Self::unknown(s))
    }
}

/// Apply `rule` to the feasible lines of `book` at `result`'s price.
pub fn allocate(rule: AllocationRule, book: &OrderBook, result: &ClearingResult) -> Allocation {
    let allocation = match rule {
        AllocationRule::Proportional => proportional(book, result),
        AllocationRule::Uniform => uniform(book, result),
        AllocationRule::PricePriority => price_priority(book, result),
        AllocationRule::Welfare => welfare(book, result),
    };
    info!(
        %rule,
        price = result.price,
        bought = allocation.total_bought(),
        sold = allocation.total_sold(),
        "allocation complete"
    );
    allocation
}

// ============================================================================
// Feasibility
// ============================================================================

/// Feasible order lines of one side, in insertion order
fn feasible_lines(book: &OrderBook, side: Side, price: f64) -> Vec<&Order> {
    book.side(side).filter(|order| order.accepts(price)).collect()
}

/// Feasible quantity and mean price per participant, keyed by id
fn feasible_by_participant(
    book: &OrderBook,
    side: Side,
    price: f64,
) -> BTreeMap<ParticipantId, WeightedPrice> {
    let mut feasible: BTreeMap<ParticipantId, WeightedPrice> = BTreeMap::new();
    for order in feasible_lines(book, side, price) {
        feasible
            .entry(order.participant)
            .or_default()
            .add(order.price, order.quantity);
    }
    feasible
}

// ============================================================================
// Proportional
// ============================================================================

/// Share the volume in proportion to feasible quantity.
pub fn proportional(book: &OrderBook, result: &ClearingResult) -> Allocation {
    let side = |side: Side| -> Vec<AllocationEntry> {
        let feasible = feasible_by_participant(book, side, result.price);
        let total: f64 = feasible.values().map(|w| w.quantity).sum();
        if is_zero(total) {
            warn!(%side, "no feasible quantity; allocating zero");
        }

        feasible
            .iter()
            .map(|(&participant, w)| {
                let units = if is_zero(total) {
                    0.0
                } else {
                    result.volume * (w.quantity / total)
                };
                AllocationEntry::priced(participant, units, result.price)
            })
            .collect()
    };

    Allocation::new(side(Side::Buy), side(Side::Sell))
}

// ============================================================================
// Uniform
// ============================================================================

/// Split the volume equally among feasible participants.
///
/// A participant may receive more than it asked for.
pub fn uniform(book: &OrderBook, result: &ClearingResult) -> Allocation {
    let side = |side: Side| -> Vec<AllocationEntry> {
        let feasible = feasible_by_participant(book, side, result.price);
        if feasible.is_empty() {
            warn!(%side, "no feasible participants; allocating zero");
            return Vec::new();
        }

        let share = result.volume / feasible.len() as f64;
        feasible
            .keys()
            .map(|&participant| AllocationEntry::priced(participant, share, result.price))
            .collect()
    };

    Allocation::new(side(Side::Buy), side(Side::Sell))
}

// ============================================================================
// Price-priority
// ============================================================================

/// Rank participants by quantity-weighted mean price and fill in order.
///
/// Buyers are ranked highest mean price first, sellers lowest mean price
/// first. Ties keep participant-id order. Participants past the point where
/// the volume runs out are listed with zero units.
pub fn price_priority(book: &OrderBook, result: &ClearingResult) -> Allocation {
    let side = |side: Side| -> Vec<AllocationEntry> {
        let mut ranked: Vec<(ParticipantId, f64, f64)> = feasible_by_participant(book, side, result.price)
            .into_iter()
            .map(|(participant, w)| (participant, w.mean().unwrap_or(result.price), w.quantity))
            .collect();
        match side {
            Side::Buy => ranked.sort_by(|a, b| descending(a.1, b.1)),
            Side::Sell => ranked.sort_by(|a, b| ascending(a.1, b.1)),
        }

        let mut remaining = result.volume;
        ranked
            .into_iter()
            .map(|(participant, _, quantity)| {
                let units = fill(&mut remaining, quantity);
                AllocationEntry::priced(participant, units, result.price)
            })
            .collect()
    };

    Allocation::new(side(Side::Buy), side(Side::Sell))
}

// ============================================================================
// Welfare
// ============================================================================

/// Fill the best-priced order lines first, then total per participant.
///
/// Serving the highest bids and lowest asks first maximises the realised
/// surplus for the given volume.
pub fn welfare(book: &OrderBook, result: &ClearingResult) -> Allocation {
    let side = |side: Side| -> Vec<AllocationEntry> {
        let mut lines = feasible_lines(book, side, result.price);
        match side {
            Side::Buy => lines.sort_by(|a, b| descending(a.price, b.price)),
            Side::Sell => lines.sort_by(|a, b| ascending(a.price, b.price)),
        }

        let mut filled: BTreeMap<ParticipantId, f64> = BTreeMap::new();
        let mut remaining = result.volume;
        for order in lines {
            let units = fill(&mut remaining, order.quantity);
            *filled.entry(order.participant).or_insert(0.0) += units;
        }

        filled
            .into_iter()
            .map(|(participant, units)| AllocationEntry::priced(participant, units, result.price))
            .collect()
    };

    Allocation::new(side(Side::Buy), side(Side::Sell))
}

/// Take up to `quantity` from the `remaining` budget
#[inline]
fn fill(remaining: &mut f64, quantity: f64) -> f64 {
    let units = quantity.min(*remaining).max(0.0);
    *remaining -= units;
    if is_zero(*remaining) {
        *remaining = 0.0;
    }
    units
}

// ============================================================================
// Unit Tests
// ============================================================================
