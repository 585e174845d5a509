//! Stress tests for the marketsim clearing and matching engines.
//!
//! These tests verify:
//! 1. Large pooled books clear and conserve volume under every rule
//! 2. Determinism is preserved across runs (allocation digests)
//! 3. Matching rules stay one-to-one on large bilateral markets
//!
//! ## Running Stress Tests
//!
//! ```bash
//! # Run all stress tests (release mode recommended)
//! cargo test --release --test stress_test -- --nocapture
//!
//! # Run specific test
//! cargo test --release --test stress_test stress_pool_clearing -- --nocapture
//! ```

use std::time::Instant;

use marketsim::engine::matching::total_utility;
use marketsim::engine::{allocate, compute_clearing_price, match_participants, PreferenceTable};
use marketsim::{AllocationRule, MatchingRule, OrderBook, ParticipantId, Side};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// ============================================================================
// TEST CONSTANTS
// ============================================================================

/// Number of order lines for the pooled stress test
const STRESS_ORDER_COUNT: usize = 200_000;

/// Distinct participants per side in the pooled stress test
const STRESS_PARTICIPANTS: u64 = 5_000;

/// Participants per side for bilateral matching
const MATCHING_PARTICIPANTS: u64 = 120;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Generate a deterministic pooled book.
///
/// Uses a seeded RNG for reproducibility. Same seed = same book.
fn generate_book(count: usize, participants: u64, seed: u64) -> OrderBook {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut book = OrderBook::with_capacity(count);

    for _ in 0..count {
        let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
        // Prices around 50 with a +-20 spread, on a 0.01 tick
        let price = (rng.gen_range(3_000..=7_000) as f64) / 100.0;
        let quantity = rng.gen_range(0.1..10.0);
        let participant = ParticipantId(rng.gen_range(0..participants));

        book.add_order(side, quantity, price, participant)
            .expect("generated orders are valid");
    }

    book
}

/// Generate a balanced bilateral book: buyers `0..n`, sellers `n..2n`.
fn generate_bilateral_book(n: u64, seed: u64) -> OrderBook {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut book = OrderBook::new();

    for id in 0..n {
        for _ in 0..rng.gen_range(1..=3) {
            book.bid(rng.gen_range(1.0..5.0), rng.gen_range(30.0..70.0), ParticipantId(id))
                .expect("valid bid");
        }
        for _ in 0..rng.gen_range(1..=3) {
            book.ask(rng.gen_range(1.0..5.0), rng.gen_range(30.0..70.0), ParticipantId(n + id))
                .expect("valid ask");
        }
    }

    book
}

/// Clear a generated book under `rule` and return the allocation digest.
fn run_deterministic_sequence(seed: u64, rule: AllocationRule) -> [u8; 32] {
    let book = generate_book(20_000, 500, seed);
    let result = compute_clearing_price(&book);
    allocate(rule, &book, &result).digest()
}

// ============================================================================
// STRESS TESTS
// ============================================================================

/// Main stress test: clear a large pooled book under every allocation rule.
///
/// # Verification
/// - No panics during execution
/// - Volume is positive (the generated curves overlap)
/// - Bought and sold units both equal the clearing volume
#[test]
fn stress_pool_clearing() {
    println!("\n=== STRESS TEST: {} Order Lines ===\n", STRESS_ORDER_COUNT);

    let gen_start = Instant::now();
    let book = generate_book(STRESS_ORDER_COUNT, STRESS_PARTICIPANTS, 42);
    println!("  Generated in {:.2?}", gen_start.elapsed());
    println!("  Bid lines:         {:>12}", book.bid_count());
    println!("  Ask lines:         {:>12}", book.ask_count());

    let start = Instant::now();
    let result = compute_clearing_price(&book);
    println!("\n  Cleared in {:.2?}: {}", start.elapsed(), result);

    assert!(result.volume > 0.0, "Expected overlapping curves");

    let tolerance = 1e-6 * result.volume;
    for &rule in AllocationRule::ALL {
        let start = Instant::now();
        let allocation = allocate(rule, &book, &result);
        let elapsed = start.elapsed();

        println!(
            "  {:<16} {:>10.2?}  buyers={:<6} sellers={:<6}",
            rule.name(),
            elapsed,
            allocation.buyers.len(),
            allocation.sellers.len()
        );

        assert!(
            (allocation.total_bought() - result.volume).abs() < tolerance,
            "{rule}: bought {} vs volume {}",
            allocation.total_bought(),
            result.volume
        );
        assert!(
            (allocation.total_sold() - result.volume).abs() < tolerance,
            "{rule}: sold {} vs volume {}",
            allocation.total_sold(),
            result.volume
        );
    }

    println!("\n=== STRESS TEST PASSED ===\n");
}

/// Verify determinism: same seed produces the same allocation digest.
#[test]
fn verify_determinism() {
    println!("\n=== DETERMINISM TEST ===\n");

    const SEED: u64 = 12345;

    for &rule in AllocationRule::ALL {
        let digest1 = run_deterministic_sequence(SEED, rule);
        let digest2 = run_deterministic_sequence(SEED, rule);
        let digest3 = run_deterministic_sequence(SEED + 1, rule);

        println!("  {:<16} {}", rule.name(), hex::encode(digest1));

        assert_eq!(digest1, digest2, "{rule}: digests must match for determinism");
        assert_ne!(digest1, digest3, "{rule}: different seeds should produce different digests");
    }

    println!("\n=== DETERMINISM VERIFIED ===\n");
}

/// Every matching rule pairs everyone on a large bilateral market.
#[test]
fn stress_bilateral_matching() {
    println!("\n=== MATCHING STRESS TEST ({} per side) ===\n", MATCHING_PARTICIPANTS);

    let book = generate_bilateral_book(MATCHING_PARTICIPANTS, 7);
    let table = PreferenceTable::from_book(&book);

    let mut utilities = Vec::new();
    for &rule in MatchingRule::ALL {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let start = Instant::now();
        let matching = match_participants(rule, &book, &mut rng).expect("balanced book");
        let elapsed = start.elapsed();
        let utility = total_utility(&table, &matching);

        println!("  {:<16} {:>10.2?}  utility={:.2}", rule.name(), elapsed, utility);

        assert_eq!(matching.len(), MATCHING_PARTICIPANTS as usize);
        assert!(matching.is_one_to_one());
        utilities.push((rule, utility));
    }

    let best = utilities
        .iter()
        .find(|(rule, _)| *rule == MatchingRule::MaximumWeight)
        .map(|&(_, u)| u)
        .expect("maximum-weight was run");
    for (rule, utility) in utilities {
        assert!(utility <= best + 1e-6, "{rule} beat the optimum: {utility} > {best}");
    }

    println!("\n=== MATCHING STRESS PASSED ===\n");
}

/// Clearing time across book sizes.
#[test]
fn stress_scaling() {
    println!("\n=== SCALING TEST ===\n");

    let test_sizes = [1_000, 10_000, 100_000];

    println!("{:>12} {:>12} {:>12}", "Lines", "Clear", "Welfare");
    println!("{:-<12} {:-<12} {:-<12}", "", "", "");

    for &size in &test_sizes {
        let book = generate_book(size, (size / 10) as u64, 42);

        let start = Instant::now();
        let result = compute_clearing_price(&book);
        let clear_time = start.elapsed();

        let start = Instant::now();
        let allocation = allocate(AllocationRule::Welfare, &book, &result);
        let welfare_time = start.elapsed();

        println!("{:>12} {:>12.2?} {:>12.2?}", size, clear_time, welfare_time);
        assert!(allocation.total_bought() <= result.volume + 1e-6 * result.volume.max(1.0));
    }

    println!("\n=== SCALING TEST COMPLETE ===\n");
}
