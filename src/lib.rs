//! # marketsim
//!
//! Double-auction and bilateral market simulation for comparing market
//! mechanisms.
//!
//! ## Architecture
//!
//! The library consists of:
//! - **Types**: Core data structures (Order, ClearingResult, Allocation, Matching)
//! - **OrderBook**: Append-only slab storage with derived demand/supply curves
//! - **Engine**: Clearing search, rationing, matching, bargaining and auctions
//! - **Market**: Pooled, bilateral and one-sided market sessions
//!
//! ## Design Principles
//!
//! 1. **Determinism**: Identical orders, rules and seed give identical results
//! 2. **Explicit Tolerance**: Float comparisons go through [`types::price::EPSILON`]
//! 3. **Closed Rule Sets**: Rule names are validated once, at construction
//! 4. **Synchronous Execution**: Every call is a bounded batch computation
//!
//! ## Example
//!
//! ```
//! use marketsim::{Market, ParticipantId, PoolMarket};
//!
//! let mut market = PoolMarket::from_name("welfare").unwrap();
//! market.bid(10.0, 2.0, ParticipantId(0)).unwrap();
//! market.bid(5.0, 1.0, ParticipantId(1)).unwrap();
//! market.ask(10.0, 5.0, ParticipantId(2)).unwrap();
//! market.ask(6.0, 0.45, ParticipantId(3)).unwrap();
//!
//! let outcome = market.clear().unwrap();
//! assert_eq!(outcome.result.price, 2.0);
//! assert_eq!(outcome.allocation.total_sold(), 6.0);
//! ```

// ============================================================================
// Module declarations
// ============================================================================

/// Error type and result alias
pub mod error;

/// Core data types: Order, ClearingResult, Allocation, Matching
pub mod types;

/// Order book: slab storage and demand/supply curves
pub mod orderbook;

/// Mechanism engine: clearing, allocation, matching, bargaining, auctions
pub mod engine;

/// Market sessions built on the engine
pub mod market;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use engine::{AllocationRule, AuctionRule, BargainRule, MatchingRule, PriceLadder, SealedBids};
pub use error::{MarketError, Result};
pub use market::{BilateralMarket, Market, MarketConfig, OneSidedMarket, PoolMarket};
pub use orderbook::{Curve, OrderBook, PriceLevel};
pub use types::{Allocation, AllocationEntry, ClearingResult, Matching, Order, OrderId, ParticipantId, Side};
