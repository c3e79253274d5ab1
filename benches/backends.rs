//! Compares the three book backends on the same synthetic load: insert
//! throughput and a crossing match, mirroring the Python original's
//! `benchmarks/run_benchmarks.py` comparison of dict/SortedDict/heapq.

use criterion::{criterion_group, criterion_main, Criterion};

use order_book_engine::book::{Book, HashBook, HeapBook, SortedBook};
use order_book_engine::order::{Order, Side};
use order_book_engine::strategies;

fn populate<B: Book>(book: &mut B, depth: u64, orders_per_level: u64) {
    for price in 1..=depth {
        for i in 0..orders_per_level {
            let px = price as f64;
            book.add_order(Order::limit(price * 1_000 + i, price as f64, Side::Sell, px, 1))
                .unwrap();
            book.add_order(Order::limit(
                (depth + price) * 1_000 + i,
                price as f64,
                Side::Buy,
                px,
                1,
            ))
            .unwrap();
        }
    }
}

fn bench_add_order(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_order");
    group.bench_function("hash", |b| {
        b.iter(|| {
            let mut book = HashBook::new();
            populate(&mut book, 100, 10);
        })
    });
    group.bench_function("sorted", |b| {
        b.iter(|| {
            let mut book = SortedBook::new();
            populate(&mut book, 100, 10);
        })
    });
    group.bench_function("heap", |b| {
        b.iter(|| {
            let mut book = HeapBook::new();
            populate(&mut book, 100, 10);
        })
    });
    group.finish();
}

/// Mirrors `benchmark_limit_order_book_with_traders`/`benchmark_sorted_dict`/
/// `benchmark_heapq` in
/// `examples/original_source/benchmarks/run_benchmarks.py:34-86`: a mixed
/// pool of `MarketMaker`/`MomentumTrader`/`RandomTrader` feeds the same
/// order sequence into each backend so the add-path comparison reflects
/// realistic order flow instead of the synthetic ladder `populate` builds.
fn bench_add_order_with_traders(c: &mut Criterion) {
    let mut pool = strategies::trader_pool(10, 1, 100.0);
    let orders = strategies::simulate_traders(&mut pool, 1_000, 1, 0.0, 2);

    let mut group = c.benchmark_group("add_order_with_traders");
    group.bench_function("hash", |b| {
        b.iter(|| {
            let mut book = HashBook::new();
            for order in &orders {
                book.add_order(order.clone()).unwrap();
            }
        })
    });
    group.bench_function("sorted", |b| {
        b.iter(|| {
            let mut book = SortedBook::new();
            for order in &orders {
                book.add_order(order.clone()).unwrap();
            }
        })
    });
    group.bench_function("heap", |b| {
        b.iter(|| {
            let mut book = HeapBook::new();
            for order in &orders {
                book.add_order(order.clone()).unwrap();
            }
        })
    });
    group.finish();
}

fn bench_best_bid_ask(c: &mut Criterion) {
    let mut hash_book = HashBook::new();
    populate(&mut hash_book, 200, 5);
    let mut sorted_book = SortedBook::new();
    populate(&mut sorted_book, 200, 5);
    let mut heap_book = HeapBook::new();
    populate(&mut heap_book, 200, 5);

    let mut group = c.benchmark_group("best_bid_ask");
    group.bench_function("hash", |b| b.iter(|| hash_book.best_bid()));
    group.bench_function("sorted", |b| b.iter(|| sorted_book.best_bid()));
    group.bench_function("heap", |b| b.iter(|| heap_book.best_bid()));
    group.finish();
}

criterion_group!(benches, bench_add_order, bench_add_order_with_traders, bench_best_bid_ask);
criterion_main!(benches);
