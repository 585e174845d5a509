//! Per-participant allocations produced by rationing, bargaining and auctions.
//!
//! ## Fingerprint
//!
//! [`Allocation::digest`] is a SHA-256 hash over a canonical byte encoding
//! of every entry (side tag, participant id, units and price as IEEE-754
//! bits, little-endian). Two runs over the same book with the same rules
//! produce the same digest, which is how reproducibility is checked without
//! comparing floating-point tables by hand.

use std::fmt;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::types::{ParticipantId, Side};

/// Units granted to one participant and the price they settle at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AllocationEntry {
    /// Buyer or seller receiving the allocation
    pub participant: ParticipantId,

    /// Units bought (buyer side) or sold (seller side)
    pub units: f64,

    /// Settlement price.
    ///
    /// `None` when the price is undefined, e.g. a bargaining pair that
    /// traded nothing.
    pub price: Option<f64>,
}

impl AllocationEntry {
    pub fn new(participant: ParticipantId, units: f64, price: Option<f64>) -> Self {
        Self {
            participant,
            units,
            price,
        }
    }

    /// Entry at a known settlement price
    pub fn priced(participant: ParticipantId, units: f64, price: f64) -> Self {
        Self::new(participant, units, Some(price))
    }
}

/// Buyer and seller allocations of one clearing invocation.
///
/// Built fresh by each call; never shared.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Allocation {
    /// Buyer results (units bought)
    pub buyers: Vec<AllocationEntry>,

    /// Seller results (units sold)
    pub sellers: Vec<AllocationEntry>,
}

impl Allocation {
    pub fn new(buyers: Vec<AllocationEntry>, sellers: Vec<AllocationEntry>) -> Self {
        Self { buyers, sellers }
    }

    /// Both sides empty
    pub fn is_empty(&self) -> bool {
        self.buyers.is_empty() && self.sellers.is_empty()
    }

    /// Sum of units bought
    pub fn total_bought(&self) -> f64 {
        self.buyers.iter().map(|e| e.units).sum()
    }

    /// Sum of units sold
    pub fn total_sold(&self) -> f64 {
        self.sellers.iter().map(|e| e.units).sum()
    }

    /// First buyer entry for a participant
    pub fn buyer(&self, participant: ParticipantId) -> Option<&AllocationEntry> {
        self.buyers.iter().find(|e| e.participant == participant)
    }

    /// First seller entry for a participant
    pub fn seller(&self, participant: ParticipantId) -> Option<&AllocationEntry> {
        self.sellers.iter().find(|e| e.participant == participant)
    }

    /// SHA-256 fingerprint of the allocation
    pub fn digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();

        let sides = [(Side::Buy, &self.buyers), (Side::Sell, &self.sellers)];
        for (side, entries) in sides {
            hasher.update([side.to_u8()]);
            hasher.update((entries.len() as u64).to_le_bytes());
            for entry in entries.iter() {
                hasher.update(entry.participant.0.to_le_bytes());
                hasher.update(entry.units.to_bits().to_le_bytes());
                match entry.price {
                    Some(price) => {
                        hasher.update([1u8]);
                        hasher.update(price.to_bits().to_le_bytes());
                    }
                    None => hasher.update([0u8]),
                }
            }
        }

        let mut hash = [0u8; 32];
        hash.copy_from_slice(&hasher.finalize());
        hash
    }

    /// Get the fingerprint as a hex string
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest())
    }
}

impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sides = [("Units Bought", &self.buyers), ("Units Sold", &self.sellers)];
        for (label, entries) in sides {
            writeln!(f, "{:>8} {:>14} {:>10}", "User", label, "Price")?;
            for entry in entries.iter() {
                match entry.price {
                    Some(price) => writeln!(
                        f,
                        "{:>8} {:>14.6} {:>10.4}",
                        entry.participant, entry.units, price
                    )?,
                    None => writeln!(f, "{:>8} {:>14.6} {:>10}", entry.participant, entry.units, "-")?,
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
