//! Market sessions.
//!
//! A market owns its order book (or sealed bids) and the rules it clears
//! with. Orders are ingested first; `clear` then runs over an immutable
//! snapshot of what was submitted.
//!
//! ## Components
//!
//! - [`PoolMarket`]: pooled double auction, clearing price then rationing
//! - [`BilateralMarket`]: one-to-one matching then per-pair bargaining
//! - [`OneSidedMarket`]: sealed-bid and ladder auctions for a single unit
//! - [`MarketConfig`]: rule selection shared by the three constructors

pub mod config;
pub mod pool;
pub mod bilateral;
pub mod one_sided;

pub use bilateral::{BilateralClearing, BilateralMarket};
pub use config::MarketConfig;
pub use one_sided::OneSidedMarket;
pub use pool::{PoolClearing, PoolMarket};

use crate::error::Result;
use crate::orderbook::OrderBook;
use crate::types::{OrderId, ParticipantId};

/// A double-sided market backed by an [`OrderBook`].
pub trait Market {
    /// What one clearing pass produces
    type Outcome;

    fn book(&self) -> &OrderBook;

    fn book_mut(&mut self) -> &mut OrderBook;

    /// Submit a buy line
    fn bid(&mut self, quantity: f64, price: f64, participant: ParticipantId) -> Result<OrderId> {
        self.book_mut().bid(quantity, price, participant)
    }

    /// Submit a sell line
    fn ask(&mut self, quantity: f64, price: f64, participant: ParticipantId) -> Result<OrderId> {
        self.book_mut().ask(quantity, price, participant)
    }

    /// Run one clearing pass over the current book
    fn clear(&mut self) -> Result<Self::Outcome>;
}
