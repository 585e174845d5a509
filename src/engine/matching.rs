//! One-to-one buyer/seller pairing rules for bilateral markets.
//!
//! Every rule works on the [`PreferenceTable`] derived from the book and
//! requires as many sellers as buyers. The result always pairs each buyer
//! with exactly one seller.
//!
//! | Rule | Algorithm | Cost |
//! |------|-----------|------|
//! | Random | uniform shuffle of sellers, seeded RNG | O(n) |
//! | Greedy | all pairs by utility, take when both ends are free | O(n² log n) |
//! | Maximum-weight | Hungarian algorithm with potentials | O(n³) |
//! | Stable | buyer-proposing Gale–Shapley | O(n²) proposals |

use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::engine::preference::PreferenceTable;
use crate::error::Result;
use crate::orderbook::OrderBook;
use crate::types::price::descending;
use crate::types::Matching;

/// Pairing rule for bilateral markets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MatchingRule {
    /// Uniformly random permutation
    Random,
    /// Highest-utility pairs first
    Greedy,
    /// Exact maximum of total utility
    MaximumWeight,
    /// Buyer-optimal stable matching
    #[default]
    Stable,
}

named_rule!(MatchingRule, "matching", {
    Random => "random",
    Greedy => "greedy",
    MaximumWeight => "maximum-weight" | "maximum" | "maximum_weight" | "max-weight",
    Stable => "stable" | "gale-shapley",
});

impl std::str::FromStr for MatchingRule {
    type Err = crate::error::MarketError;

    fn from_str(s: &str) -> crate::error::Result<Self> {
        Self::lookup(s).ok_or_else(|| Self::unknown(s))
    }
}

/// Pair every buyer of `book` with one seller under `rule`.
///
/// `rng` is only consumed by [`MatchingRule::Random`].
///
/// # Errors
///
/// [`MarketError::UnbalancedMarket`](crate::error::MarketError::UnbalancedMarket)
/// when the numbers of distinct buyers and sellers differ.
pub fn match_participants<R>(rule: MatchingRule, book: &OrderBook, rng: &mut R) -> Result<Matching>
where
    R: Rng + ?Sized,
{
    let table = PreferenceTable::from_book(book);
    table.ensure_balanced()?;

    if table.buyers().is_empty() {
        warn!("no participants to match");
        return Ok(Matching::new());
    }

    let assignment = match rule {
        MatchingRule::Random => random(&table, rng),
        MatchingRule::Greedy => greedy(&table),
        MatchingRule::MaximumWeight => maximum_weight(&table),
        MatchingRule::Stable => stable(&table),
    };

    let matching: Matching = assignment
        .iter()
        .enumerate()
        .map(|(i, &j)| (table.buyers()[i].participant, table.sellers()[j].participant))
        .collect();

    info!(
        %rule,
        pairs = matching.len(),
        utility = total_utility(&table, &matching),
        "matching complete"
    );
    Ok(matching)
}

/// Sum of pair utilities of `matching` (pairs unknown to `table` count zero)
pub fn total_utility(table: &PreferenceTable, matching: &Matching) -> f64 {
    matching
        .iter()
        .filter_map(|(buyer, seller)| table.utility_between(buyer, seller))
        .sum()
}

// ============================================================================
// Rules
//
// Each returns `assignment[i] = j`: buyer index i is paired with seller
// index j. Tables are balanced and non-empty here.
// ============================================================================

/// Shuffle seller indices and zip them with buyers
pub fn random<R>(table: &PreferenceTable, rng: &mut R) -> Vec<usize>
where
    R: Rng + ?Sized,
{
    let mut sellers: Vec<usize> = (0..table.sellers().len()).collect();
    sellers.shuffle(rng);
    sellers
}

/// Greedy assignment over all pairs sorted by utility, buyer-major on ties
pub fn greedy(table: &PreferenceTable) -> Vec<usize> {
    let n = table.buyers().len();
    let mut pairs: Vec<(usize, usize)> = (0..n)
        .flat_map(|i| (0..n).map(move |j| (i, j)))
        .collect();
    pairs.sort_by(|&(a, b), &(c, d)| descending(table.utility(a, b), table.utility(c, d)));

    let mut assignment = vec![None; n];
    let mut taken = vec![false; n];
    let mut matched = 0;
    for (i, j) in pairs {
        if assignment[i].is_some() || taken[j] {
            continue;
        }
        debug!(buyer = i, seller = j, utility = table.utility(i, j), "greedy pair");
        assignment[i] = Some(j);
        taken[j] = true;
        matched += 1;
        if matched == n {
            break;
        }
    }

    // Every buyer is reached: each still has a free seller among its n pairs
    assignment.into_iter().map(|j| j.unwrap_or_default()).collect()
}

/// Hungarian algorithm (shortest augmenting paths with potentials) on the
/// negated utility matrix.
pub fn maximum_weight(table: &PreferenceTable) -> Vec<usize> {
    let n = table.buyers().len();
    let cost = |i: usize, j: usize| -table.utility(i, j);

    // 1-indexed; column 0 and row 0 are virtual
    let mut u = vec![0.0_f64; n + 1];
    let mut v = vec![0.0_f64; n + 1];
    let mut owner = vec![0_usize; n + 1];
    let mut way = vec![0_usize; n + 1];

    for row in 1..=n {
        owner[0] = row;
        let mut col0 = 0;
        let mut min_slack = vec![f64::INFINITY; n + 1];
        let mut used = vec![false; n + 1];

        loop {
            used[col0] = true;
            let row0 = owner[col0];
            let mut delta = f64::INFINITY;
            let mut col1 = 0;

            for col in 1..=n {
                if used[col] {
                    continue;
                }
                let slack = cost(row0 - 1, col - 1) - u[row0] - v[col];
                if slack < min_slack[col] {
                    min_slack[col] = slack;
                    way[col] = col0;
                }
                if min_slack[col] < delta {
                    delta = min_slack[col];
                    col1 = col;
                }
            }

            for col in 0..=n {
                if used[col] {
                    u[owner[col]] += delta;
                    v[col] -= delta;
                } else {
                    min_slack[col] -= delta;
                }
            }

            col0 = col1;
            if owner[col0] == 0 {
                break;
            }
        }

        // Flip the augmenting path
        loop {
            let col1 = way[col0];
            owner[col0] = owner[col1];
            col0 = col1;
            if col0 == 0 {
                break;
            }
        }
    }

    let mut assignment = vec![0; n];
    for col in 1..=n {
        if owner[col] != 0 {
            assignment[owner[col] - 1] = col - 1;
        }
    }
    assignment
}

/// Buyer-proposing Gale–Shapley
pub fn stable(table: &PreferenceTable) -> Vec<usize> {
    let n = table.buyers().len();
    let preferences: Vec<Vec<usize>> = (0..n).map(|i| table.buyer_ranking(i)).collect();

    // rank[j][i]: position of buyer i in seller j's list, lower is better
    let rank: Vec<Vec<usize>> = (0..n)
        .map(|j| {
            let mut rank = vec![0; n];
            for (position, i) in table.seller_ranking(j).into_iter().enumerate() {
                rank[i] = position;
            }
            rank
        })
        .collect();

    let mut next = vec![0_usize; n];
    let mut holder: Vec<Option<usize>> = vec![None; n];
    let mut free: VecDeque<usize> = (0..n).collect();

    while let Some(buyer) = free.pop_front() {
        // Balanced tables never exhaust a buyer's list
        let Some(&seller) = preferences[buyer].get(next[buyer]) else {
            continue;
        };
        next[buyer] += 1;

        match holder[seller] {
            None => {
                debug!(buyer, seller, "proposal held");
                holder[seller] = Some(buyer);
            }
            Some(current) if rank[seller][buyer] < rank[seller][current] => {
                debug!(buyer, seller, rejected = current, "proposal replaces holder");
                holder[seller] = Some(buyer);
                free.push_back(current);
            }
            Some(_) => {
                debug!(buyer, seller, "proposal rejected");
                free.push_back(buyer);
            }
        }
    }

    let mut assignment = vec![0; n];
    for (seller, buyer) in holder.into_iter().enumerate() {
        if let Some(buyer) = buyer {
            assignment[buyer] = seller;
        }
    }
    assignment
}

// ============================================================================
// Unit Tests
// ============================================================================
