//! Single-threaded latency harness: drives a `Matcher` from a
//! `SyntheticEventStream`, stopwatching each stage with `Instant` and
//! reducing the samples to percentiles, mean, min, and max.

use std::time::Instant;

use tracing::info;

use crate::book::Book;
use crate::matching::Matcher;
use crate::stream::{StreamEvent, SyntheticEventStream};

/// Nanosecond samples for one stage, reduced on demand by `stats()`.
#[derive(Debug, Default, Clone)]
pub struct Bucket {
    samples: Vec<u64>,
}

impl Bucket {
    fn push(&mut self, nanos: u64) {
        self.samples.push(nanos);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// `p50`/`p90`/`p99`/`p99.9`/median/mean/min/max over the collected
    /// samples. Percentiles use nearest-rank on samples sorted ascending.
    pub fn stats(&self) -> Option<BucketStats> {
        if self.samples.is_empty() {
            return None;
        }
        let mut sorted = self.samples.clone();
        sorted.sort_unstable();
        let n = sorted.len();
        let pct = |p: f64| -> u64 {
            let rank = ((p / 100.0) * n as f64).ceil() as usize;
            sorted[rank.saturating_sub(1).min(n - 1)]
        };
        let sum: u128 = sorted.iter().map(|&v| v as u128).sum();
        Some(BucketStats {
            p50: pct(50.0),
            p90: pct(90.0),
            p99: pct(99.0),
            p999: pct(99.9),
            median: sorted[n / 2],
            mean: (sum / n as u128) as u64,
            min: sorted[0],
            max: sorted[n - 1],
            count: n,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketStats {
    pub p50: u64,
    pub p90: u64,
    pub p99: u64,
    pub p999: u64,
    pub median: u64,
    pub mean: u64,
    pub min: u64,
    pub max: u64,
    pub count: usize,
}

#[derive(Debug, Default, Clone)]
pub struct LatencyReport {
    pub overall: Bucket,
    pub insert: Bucket,
    pub cancel: Bucket,
    pub match_stage: Bucket,
    pub trade_emit: Bucket,
    pub event_count: usize,
    pub wall_seconds: f64,
}

impl LatencyReport {
    pub fn throughput(&self) -> f64 {
        if self.wall_seconds > 0.0 {
            self.event_count as f64 / self.wall_seconds
        } else {
            0.0
        }
    }

    /// Plain-text table; the exact layout is not a stable format, just a
    /// human-readable summary.
    pub fn pretty_print(&self) {
        println!("Latency Percentiles by Stage:");
        Self::print_stage("Insert", &self.insert);
        Self::print_stage("Cancel", &self.cancel);
        Self::print_stage("Match", &self.match_stage);
        Self::print_stage("Trade Emit", &self.trade_emit);
        Self::print_stage("Overall", &self.overall);
        println!("Throughput: {:.2} events/sec", self.throughput());
        println!("Total Events: {}", self.event_count);
    }

    fn print_stage(label: &str, bucket: &Bucket) {
        match bucket.stats() {
            None => println!("{label}: No data"),
            Some(s) => {
                println!("{label}:");
                println!("  p50: {} ns", s.p50);
                println!("  p90: {} ns", s.p90);
                println!("  p99: {} ns", s.p99);
                println!("  p99.9: {} ns", s.p999);
                println!("  median: {} ns", s.median);
                println!("  mean: {} ns", s.mean);
                println!("  min: {} ns", s.min);
                println!("  max: {} ns", s.max);
            }
        }
    }
}

pub struct LatencyBench<B: Book> {
    matcher: Matcher<B>,
}

impl<B: Book> LatencyBench<B> {
    pub fn new(matcher: Matcher<B>) -> Self {
        LatencyBench { matcher }
    }

    /// Runs `warmup` events unmeasured, then the remainder of `stream`
    /// measured, returning the aggregated report. The stream is single-pass:
    /// warmup and measurement share the same iterator.
    pub fn run(&mut self, mut stream: SyntheticEventStream, warmup: usize) -> LatencyReport {
        for _ in 0..warmup {
            match stream.next() {
                Some(event) => self.apply(event),
                None => break,
            }
        }

        let mut report = LatencyReport::default();
        let wall_start = Instant::now();
        for event in stream {
            let t0 = Instant::now();
            self.apply_measured(event, &mut report);
            let elapsed = t0.elapsed().as_nanos() as u64;
            report.overall.push(elapsed);
            report.event_count += 1;
        }
        report.wall_seconds = wall_start.elapsed().as_secs_f64();
        info!(events = report.event_count, "latency run complete");
        report
    }

    fn apply(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Add(order) => {
                self.matcher.submit(order);
            }
            StreamEvent::Cancel(id) => {
                self.matcher.book.cancel_order(id);
            }
        }
    }

    fn apply_measured(&mut self, event: StreamEvent, report: &mut LatencyReport) {
        match event {
            StreamEvent::Add(order) => {
                use crate::order::OrderType;
                let is_limit = order.order_type == OrderType::Limit;
                let trades = if is_limit {
                    let t0 = Instant::now();
                    let insert_result = self.matcher.book.add_order(order);
                    report.insert.push(t0.elapsed().as_nanos() as u64);
                    if insert_result.is_err() {
                        return;
                    }
                    let t1 = Instant::now();
                    let trades = self.matcher.book.match_book();
                    report.match_stage.push(t1.elapsed().as_nanos() as u64);
                    trades
                } else {
                    self.matcher.submit(order)
                };
                for trade in trades {
                    let t2 = Instant::now();
                    let _ = std::hint::black_box(trade);
                    report.trade_emit.push(t2.elapsed().as_nanos() as u64);
                }
            }
            StreamEvent::Cancel(id) => {
                let t0 = Instant::now();
                self.matcher.book.cancel_order(id);
                report.cancel.push(t0.elapsed().as_nanos() as u64);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::HashBook;
    use crate::stream::StreamConfig;

    #[test]
    fn buckets_populate_only_for_their_event_kind() {
        let bench_matcher = Matcher::new(HashBook::new());
        let mut bench = LatencyBench::new(bench_matcher);
        let cfg = StreamConfig { n_events: 300, cancel_prob: 0.2, ..Default::default() };
        let report = bench.run(SyntheticEventStream::new(cfg), 50);

        assert_eq!(report.event_count, 250);
        assert!(report.overall.len() == report.event_count);
        assert!(report.insert.len() + report.cancel.len() <= report.event_count);
    }

    #[test]
    fn stats_are_none_for_empty_bucket() {
        let bucket = Bucket::default();
        assert!(bucket.stats().is_none());
    }

    #[test]
    fn stats_percentiles_are_ordered() {
        let mut bucket = Bucket::default();
        for v in 1..=100u64 {
            bucket.push(v);
        }
        let s = bucket.stats().unwrap();
        assert!(s.p50 <= s.p90);
        assert!(s.p90 <= s.p99);
        assert!(s.p99 <= s.p999);
        assert_eq!(s.min, 1);
        assert_eq!(s.max, 100);
    }
}
