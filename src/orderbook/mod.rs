//! Order book module.
//!
//! ## Architecture
//!
//! - **Slab-based storage**: append-only, O(1) insertion and lookup
//! - **Price levels**: same-price lines merged, originating ids kept
//! - **Curves**: demand (descending) and supply (ascending) with cumulative
//!   quantities, derived lazily per query
//!
//! ## Components
//!
//! - [`OrderBook`]: Insertion-ordered collection of order lines
//! - [`PriceLevel`]: Aggregated quantity at one price
//! - [`Curve`]: Sorted, cumulative demand or supply view
//!
//! ## Performance
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | Add order | O(1) |
//! | Build curve | O(n log n) |
//! | Feasible quantity at a price | O(log L) |
//!
//! *L = number of distinct price levels on that side*

pub mod level;
pub mod curve;
pub mod book;

pub use level::PriceLevel;
pub use curve::Curve;
pub use book::OrderBook;
