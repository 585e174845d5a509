//! Core data types for market simulation
//!
//! ## Types
//!
//! - [`Order`]: A priced order line in the order book
//! - [`Side`]: Buy or Sell
//! - [`ClearingResult`]: Price, volume and gap of a pooled clearing
//! - [`Allocation`]: Buyer and seller results of one clearing invocation
//! - [`Matching`]: One-to-one buyer/seller pairing
//!
//! ## Floating-Point Tolerance
//!
//! All prices and quantities are `f64`; equality and feasibility tests use
//! the single tolerance in [`price::EPSILON`].

mod order;
mod clearing;
mod allocation;
mod matching;
pub mod price;

// Re-export all types at module level
pub use order::{Order, OrderId, ParticipantId, Side};
pub use clearing::ClearingResult;
pub use allocation::{Allocation, AllocationEntry};
pub use matching::Matching;
