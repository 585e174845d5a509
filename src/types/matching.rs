//! One-to-one buyer/seller pairing for bilateral markets.

use std::collections::HashSet;

use serde::Serialize;

use crate::types::ParticipantId;

/// A buyer-to-seller mapping in which every buyer and every seller appears
/// at most once.
///
/// Pairs are kept in the order the matching rule produced them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Matching {
    pairs: Vec<(ParticipantId, ParticipantId)>,
}

impl Matching {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            pairs: Vec::with_capacity(n),
        }
    }

    /// Record a pair.
    ///
    /// Returns `false` and leaves the matching untouched if either endpoint
    /// is already paired.
    pub fn insert(&mut self, buyer: ParticipantId, seller: ParticipantId) -> bool {
        if self.seller_of(buyer).is_some() || self.buyer_of(seller).is_some() {
            return false;
        }
        self.pairs.push((buyer, seller));
        true
    }

    /// Seller paired with `buyer`
    pub fn seller_of(&self, buyer: ParticipantId) -> Option<ParticipantId> {
        self.pairs.iter().find(|(b, _)| *b == buyer).map(|(_, s)| *s)
    }

    /// Buyer paired with `seller`
    pub fn buyer_of(&self, seller: ParticipantId) -> Option<ParticipantId> {
        self.pairs.iter().find(|(_, s)| *s == seller).map(|(b, _)| *b)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterate over (buyer, seller) pairs
    pub fn iter(&self) -> impl Iterator<Item = (ParticipantId, ParticipantId)> + '_ {
        self.pairs.iter().copied()
    }

    /// Pairs sorted by buyer id, for order-insensitive comparison
    pub fn sorted_pairs(&self) -> Vec<(ParticipantId, ParticipantId)> {
        let mut pairs = self.pairs.clone();
        pairs.sort();
        pairs
    }

    /// Check the one-to-one invariant
    pub fn is_one_to_one(&self) -> bool {
        let buyers: HashSet<_> = self.pairs.iter().map(|(b, _)| *b).collect();
        let sellers: HashSet<_> = self.pairs.iter().map(|(_, s)| *s).collect();
        buyers.len() == self.pairs.len() && sellers.len() == self.pairs.len()
    }
}

impl FromIterator<(ParticipantId, ParticipantId)> for Matching {
    fn from_iter<I: IntoIterator<Item = (ParticipantId, ParticipantId)>>(iter: I) -> Self {
        let mut matching = Matching::new();
        for (buyer, seller) in iter {
            matching.insert(buyer, seller);
        }
        matching
    }
}
