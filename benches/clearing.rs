//! Benchmarks for the marketsim clearing and matching engines.
//!
//! ## Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//!
//! # Run specific benchmark
//! cargo bench -- clearing
//!
//! # Run with verbose output
//! cargo bench -- --verbose
//! ```
//!
//! Results are saved to `target/criterion/` with HTML reports.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use marketsim::engine::{allocate, compute_clearing_price, match_participants};
use marketsim::{AllocationRule, MatchingRule, OrderBook, ParticipantId, Side};

// ============================================================================
// HELPER FUNCTIONS - Deterministic book generation
// ============================================================================

/// Pooled book with `count` lines over `count / 10` participants.
fn generate_book(count: usize, seed: u64) -> OrderBook {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut book = OrderBook::with_capacity(count);
    let participants = (count as u64 / 10).max(1);

    for _ in 0..count {
        let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
        let price = (rng.gen_range(3_000..=7_000) as f64) / 100.0;
        let quantity = rng.gen_range(0.1..10.0);
        book.add_order(side, quantity, price, ParticipantId(rng.gen_range(0..participants)))
            .expect("generated orders are valid");
    }

    book
}

/// Balanced bilateral book with `n` participants per side.
fn generate_bilateral_book(n: u64, seed: u64) -> OrderBook {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut book = OrderBook::new();

    for id in 0..n {
        book.bid(rng.gen_range(1.0..5.0), rng.gen_range(30.0..70.0), ParticipantId(id))
            .expect("valid bid");
        book.ask(rng.gen_range(1.0..5.0), rng.gen_range(30.0..70.0), ParticipantId(n + id))
            .expect("valid ask");
    }

    book
}

// ============================================================================
// BENCHMARK: Clearing price search
// ============================================================================

fn bench_clearing(c: &mut Criterion) {
    let mut group = c.benchmark_group("clearing");
    group.measurement_time(Duration::from_secs(5));

    for size in [1_000, 10_000, 100_000] {
        let book = generate_book(size, 42);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("lines", size), &book, |b, book| {
            b.iter(|| black_box(compute_clearing_price(book)));
        });
    }

    group.finish();
}

// ============================================================================
// BENCHMARK: Allocation rules
// ============================================================================

fn bench_allocation(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocation");
    group.measurement_time(Duration::from_secs(5));

    let book = generate_book(10_000, 42);
    let result = compute_clearing_price(&book);

    for &rule in AllocationRule::ALL {
        group.bench_function(rule.name(), |b| {
            b.iter(|| black_box(allocate(rule, &book, &result)));
        });
    }

    group.finish();
}

// ============================================================================
// BENCHMARK: Matching rules
// ============================================================================

fn bench_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("matching");
    group.measurement_time(Duration::from_secs(5));
    group.sample_size(20);

    for n in [16_u64, 64, 256] {
        let book = generate_bilateral_book(n, 7);
        for &rule in MatchingRule::ALL {
            group.bench_with_input(BenchmarkId::new(rule.name(), n), &book, |b, book| {
                let mut rng = ChaCha8Rng::seed_from_u64(7);
                b.iter(|| black_box(match_participants(rule, book, &mut rng)));
            });
        }
    }

    group.finish();
}

// ============================================================================
// CRITERION ENTRY POINT
// ============================================================================

criterion_group!(benches, bench_clearing, bench_allocation, bench_matching);

criterion_main!(benches);
