//! `clap`-derived CLI surface: pick a backend, tune the synthetic stream,
//! and either run the latency benchmark or a short `simulate` demo that
//! prints trades as they happen. `simulate --traders` swaps the event
//! stream for a trader pool (`crate::strategies`) instead.

use clap::{Parser, Subcommand, ValueEnum};

use crate::book::{Book, HashBook, HeapBook, SortedBook};
use crate::latency::LatencyBench;
use crate::matching::Matcher;
use crate::order::Order;
use crate::strategies;
use crate::stream::{StreamConfig, StreamEvent, SyntheticEventStream};

#[derive(Parser)]
#[command(name = "order-book-engine")]
#[command(author, version, about = "A price-time priority limit order book matching engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum BackendKind {
    Hash,
    Sorted,
    Heap,
}

#[derive(Parser, Debug)]
pub struct StreamArgs {
    /// Number of events to generate.
    #[arg(long, default_value_t = 10_000)]
    pub events: usize,

    /// Events consumed and discarded before measurement starts.
    #[arg(long, default_value_t = 100)]
    pub warmup: usize,

    /// RNG seed; the same seed reproduces the same event sequence.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Probability that a given event is a cancel rather than an add.
    #[arg(long, default_value_t = 0.1)]
    pub cancel_prob: f64,

    /// Per-tick mid-price drift.
    #[arg(long, default_value_t = 0.0001)]
    pub drift: f64,

    /// Standard deviation of per-tick mid-price noise.
    #[arg(long, default_value_t = 0.01)]
    pub sigma: f64,

    /// Starting mid price.
    #[arg(long, default_value_t = 100.0)]
    pub mid_start: f64,

    /// Which book backend to drive.
    #[arg(long, value_enum, default_value_t = BackendKind::Sorted)]
    pub backend: BackendKind,

    /// Drive `simulate` from a mixed pool of `MarketMaker`/`MomentumTrader`/
    /// `RandomTrader` order generators instead of `SyntheticEventStream`.
    /// Ignored by `bench`.
    #[arg(long, default_value_t = false)]
    pub traders: bool,

    /// Size of the trader pool when `--traders` is set.
    #[arg(long, default_value_t = 10)]
    pub trader_count: usize,
}

impl From<&StreamArgs> for StreamConfig {
    fn from(args: &StreamArgs) -> Self {
        StreamConfig {
            n_events: args.events,
            mid_start: args.mid_start,
            drift: args.drift,
            sigma: args.sigma,
            cancel_prob: args.cancel_prob,
            seed: args.seed,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the latency harness and print a percentile report.
    Bench(StreamArgs),
    /// Replay the synthetic stream and print each trade as it occurs.
    Simulate(StreamArgs),
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Bench(args) => run_bench(args),
        Commands::Simulate(args) => run_simulate(args),
    }
}

fn run_bench(args: StreamArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.cancel_prob >= 0.0 && args.cancel_prob <= 1.0, "--cancel-prob must be in [0, 1], got {}", args.cancel_prob);
    let warmup = args.warmup;
    let backend = args.backend;
    let cfg = StreamConfig::from(&args);
    let stream = SyntheticEventStream::new(cfg);
    match backend {
        BackendKind::Hash => {
            let mut bench = LatencyBench::new(Matcher::new(HashBook::new()));
            bench.run(stream, warmup).pretty_print();
        }
        BackendKind::Sorted => {
            let mut bench = LatencyBench::new(Matcher::new(SortedBook::new()));
            bench.run(stream, warmup).pretty_print();
        }
        BackendKind::Heap => {
            let mut bench = LatencyBench::new(Matcher::new(HeapBook::new()));
            bench.run(stream, warmup).pretty_print();
        }
    }
    Ok(())
}

fn run_simulate(args: StreamArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.cancel_prob >= 0.0 && args.cancel_prob <= 1.0, "--cancel-prob must be in [0, 1], got {}", args.cancel_prob);
    let backend = args.backend;
    if args.traders {
        let orders = strategies::simulate_traders(
            &mut strategies::trader_pool(args.trader_count, args.seed, args.mid_start),
            args.events,
            1,
            0.0,
            args.seed,
        );
        match backend {
            BackendKind::Hash => simulate_orders(Matcher::new(HashBook::new()), orders),
            BackendKind::Sorted => simulate_orders(Matcher::new(SortedBook::new()), orders),
            BackendKind::Heap => simulate_orders(Matcher::new(HeapBook::new()), orders),
        }
        return Ok(());
    }

    let cfg = StreamConfig::from(&args);
    let stream = SyntheticEventStream::new(cfg);
    match backend {
        BackendKind::Hash => simulate_with(Matcher::new(HashBook::new()), stream),
        BackendKind::Sorted => simulate_with(Matcher::new(SortedBook::new()), stream),
        BackendKind::Heap => simulate_with(Matcher::new(HeapBook::new()), stream),
    }
    Ok(())
}

fn simulate_with<B: Book>(mut matcher: Matcher<B>, stream: SyntheticEventStream) {
    for event in stream {
        match event {
            StreamEvent::Add(order) => {
                let trades = matcher.submit(order);
                for trade in trades {
                    println!(
                        "trade: price={} qty={} maker={} taker={}",
                        trade.price, trade.qty, trade.maker_id, trade.taker_id
                    );
                }
            }
            StreamEvent::Cancel(id) => {
                if matcher.book.cancel_order(id) {
                    println!("cancel: order {id} removed");
                }
            }
        }
    }
    let depth = matcher.book.depth(5);
    println!("final depth: bids={:?} asks={:?}", depth.bids, depth.asks);
}

/// Same reporting as `simulate_with`, but driven by a flat list of orders
/// from a trader pool (`--traders`) rather than the event stream — traders
/// never cancel, mirroring `simulate_traders` in
/// `examples/original_source/benchmarks/run_benchmarks.py`.
fn simulate_orders<B: Book>(mut matcher: Matcher<B>, orders: Vec<Order>) {
    for order in orders {
        let trades = matcher.submit(order);
        for trade in trades {
            println!(
                "trade: price={} qty={} maker={} taker={}",
                trade.price, trade.qty, trade.maker_id, trade.taker_id
            );
        }
    }
    let depth = matcher.book.depth(5);
    println!("final depth: bids={:?} asks={:?}", depth.bids, depth.asks);
}
