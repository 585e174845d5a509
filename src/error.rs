//! Error type shared by every market component.
//!
//! Only configuration and input-validation problems are errors. Degenerate
//! but well-formed situations (an empty side at clearing time, a bargaining
//! pair that cannot trade) are reported through results and `tracing`
//! events instead.

use thiserror::Error;

use crate::types::ParticipantId;

/// Errors raised by order ingestion, rule selection and matching.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MarketError {
    /// A quantity or price is negative, NaN or infinite.
    #[error("invalid order {field}: {value} (must be finite and non-negative)")]
    InvalidOrder {
        field: &'static str,
        value: f64,
    },

    /// A rule name that is not part of the closed set for its kind.
    #[error("unknown {kind} rule: {name:?}")]
    UnknownRule {
        kind: &'static str,
        name: String,
    },

    /// A recognised auction name that this market cannot run.
    #[error("auction {name:?} is not supported here: {hint}")]
    UnsupportedAuction {
        name: String,
        hint: &'static str,
    },

    /// Bilateral matching requires as many sellers as buyers.
    #[error("matching needs equal buyer and seller counts, got {buyers} buyers and {sellers} sellers")]
    UnbalancedMarket {
        buyers: usize,
        sellers: usize,
    },

    /// The same participant submitted two sealed bids.
    #[error("participant {0} already submitted a sealed bid")]
    DuplicateBidder(ParticipantId),

    /// A sealed bid value is negative, NaN or infinite.
    #[error("invalid sealed bid from participant {participant}: {value}")]
    InvalidBid {
        participant: ParticipantId,
        value: f64,
    },

    /// English/Dutch price ladder misconfiguration.
    #[error("invalid price ladder: {0}")]
    InvalidLadder(&'static str),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, MarketError>;
