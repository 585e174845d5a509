//! Mechanism-design engine.
//!
//! ## Components
//!
//! - [`clearing`]: pooled double-auction clearing-price search
//! - [`allocation`]: rationing rules applied at a fixed clearing price
//! - [`preference`]: per-participant mean prices and pair utilities
//! - [`matching`]: one-to-one buyer/seller pairing rules
//! - [`bargaining`]: per-pair price/volume settlement
//! - [`auction`]: one-sided sealed-bid, ascending and descending auctions
//!
//! ## Design Principles
//!
//! 1. **Determinism**: same book, same rule, same seed, same result
//! 2. **Closed rule sets**: every rule family is an enum validated by name
//!    once, at construction
//! 3. **Synchronous Execution**: every call is a bounded computation over an
//!    immutable snapshot of the book
//!
//! ## Example
//!
//! ```
//! use marketsim::engine::allocation::{allocate, AllocationRule};
//! use marketsim::engine::clearing::compute_clearing_price;
//! use marketsim::orderbook::OrderBook;
//! use marketsim::types::ParticipantId;
//!
//! let mut book = OrderBook::new();
//! book.bid(10.0, 2.0, ParticipantId(0)).unwrap();
//! book.ask(6.0, 0.45, ParticipantId(3)).unwrap();
//!
//! let result = compute_clearing_price(&book);
//! let rule: AllocationRule = "proportional".parse().unwrap();
//! let allocation = allocate(rule, &book, &result);
//!
//! assert_eq!(allocation.total_bought(), 6.0);
//! assert_eq!(allocation.total_sold(), 6.0);
//! ```

/// Implements naming for a closed rule enum: canonical `name()`, the
/// `ALL` list, name lookup with aliases, `FromStr`, `Display`, and the
/// `String` conversions serde uses.
macro_rules! named_rule {
    ($rule:ident, $kind:literal, { $($variant:ident => $name:literal $(| $alias:literal)*),+ $(,)? }) => {
        impl $rule {
            /// Every rule of this family
            pub const ALL: &'static [$rule] = &[$($rule::$variant),+];

            /// Canonical name
            pub fn name(self) -> &'static str {
                match self {
                    $($rule::$variant => $name),+
                }
            }

            /// Look up a rule by canonical name or alias (case-insensitive)
            pub fn lookup(name: &str) -> Option<Self> {
                match name.trim().to_ascii_lowercase().as_str() {
                    $($name $(| $alias)* => Some($rule::$variant),)+
                    _ => None,
                }
            }

            fn unknown(name: &str) -> crate::error::MarketError {
                crate::error::MarketError::UnknownRule {
                    kind: $kind,
                    name: name.to_string(),
                }
            }
        }

        impl std::fmt::Display for $rule {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.name())
            }
        }

        impl TryFrom<String> for $rule {
            type Error = crate::error::MarketError;

            fn try_from(name: String) -> crate::error::Result<Self> {
                name.parse()
            }
        }

        impl From<$rule> for String {
            fn from(rule: $rule) -> String {
                rule.name().to_string()
            }
        }
    };
}

pub mod clearing;
pub mod allocation;
pub mod preference;
pub mod matching;
pub mod bargaining;
pub mod auction;

pub use allocation::{allocate, AllocationRule};
pub use auction::{run_auction, AuctionRule, PriceLadder, SealedBids};
pub use bargaining::{bargain, BargainRule};
pub use clearing::compute_clearing_price;
pub use matching::{match_participants, MatchingRule};
pub use preference::PreferenceTable;
