//! Synthetic order flow for the latency harness and the CLI `simulate`
//! command: reproducible given a seed, single-pass, and the only component
//! allowed to invent timestamps and ids.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp, LogNormal, Normal};

use crate::order::{Order, Side};

#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Add(Order),
    Cancel(u64),
}

/// Configuration knobs, mirrored 1:1 by the CLI's `--events`/`--seed`/etc.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    pub n_events: usize,
    pub mid_start: f64,
    pub drift: f64,
    pub sigma: f64,
    pub cancel_prob: f64,
    pub seed: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        StreamConfig {
            n_events: 10_000,
            mid_start: 100.0,
            drift: 0.0001,
            sigma: 0.01,
            cancel_prob: 0.1,
            seed: 42,
        }
    }
}

pub struct SyntheticEventStream {
    cfg: StreamConfig,
    rng: StdRng,
    next_id: u64,
    mid: f64,
    ts: f64,
    emitted: usize,
    active_ids: Vec<u64>,
}

impl SyntheticEventStream {
    pub fn new(cfg: StreamConfig) -> Self {
        let rng = StdRng::seed_from_u64(cfg.seed);
        let mid = cfg.mid_start;
        SyntheticEventStream {
            cfg,
            rng,
            next_id: 1,
            mid,
            ts: 0.0,
            emitted: 0,
            active_ids: Vec::new(),
        }
    }
}

impl Iterator for SyntheticEventStream {
    type Item = StreamEvent;

    fn next(&mut self) -> Option<StreamEvent> {
        if self.emitted >= self.cfg.n_events {
            return None;
        }
        self.emitted += 1;

        // Exponential inter-arrival keeps ts strictly increasing.
        let inter_arrival = Exp::new(1.0).unwrap().sample(&mut self.rng);
        self.ts += inter_arrival.max(f64::EPSILON);

        self.mid += self.cfg.drift + Normal::new(0.0, self.cfg.sigma.max(1e-12)).unwrap().sample(&mut self.rng);

        if !self.active_ids.is_empty() && self.rng.random_bool(self.cfg.cancel_prob) {
            let idx = self.rng.random_range(0..self.active_ids.len());
            let id = self.active_ids[idx];
            return Some(StreamEvent::Cancel(id));
        }

        let side = if self.rng.random_bool(0.5) { Side::Buy } else { Side::Sell };
        let is_limit = self.rng.random_bool(0.9);
        let price = if is_limit {
            let jitter = Normal::new(0.0, 0.05).unwrap().sample(&mut self.rng);
            let signed = if matches!(side, Side::Buy) { jitter } else { -jitter };
            Some(self.mid + signed)
        } else {
            None
        };
        let qty = (LogNormal::new(1.5, 0.5).unwrap().sample(&mut self.rng).round() as u64).max(1);

        let id = self.next_id;
        self.next_id += 1;
        let order = match price {
            Some(p) => Order::limit(id, self.ts, side, p, qty),
            None => Order::market(id, self.ts, side, qty),
        };
        self.active_ids.push(id);
        Some(StreamEvent::Add(order))
    }
}
