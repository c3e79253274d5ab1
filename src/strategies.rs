//! Toy order generators feeding the criterion benches (`benches/backends.rs`)
//! and the CLI's `simulate --traders` path with more structured flow than raw
//! uniform noise. None of this is part of the engine's tested contract — each
//! generator just hands back one `Order` per call; `trader_pool`/
//! `simulate_traders` assemble a mixed pool of them the way
//! `examples/original_source/benchmarks/run_benchmarks.py`'s
//! `simulate_traders` does.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::order::{Order, Side};

pub trait OrderGenerator {
    fn generate(&mut self, id: u64, ts: f64) -> Order;
}

/// Quotes a fixed spread around a static mid, alternating which side it rests on.
pub struct MarketMaker {
    rng: StdRng,
    mid: f64,
    spread: f64,
}

impl MarketMaker {
    pub fn new(seed: u64, mid: f64, spread: f64) -> Self {
        MarketMaker { rng: StdRng::seed_from_u64(seed), mid, spread }
    }
}

impl OrderGenerator for MarketMaker {
    fn generate(&mut self, id: u64, ts: f64) -> Order {
        let side = if self.rng.random_bool(0.5) { Side::Buy } else { Side::Sell };
        let price = if matches!(side, Side::Buy) {
            self.mid - self.spread
        } else {
            self.mid + self.spread
        };
        let qty = self.rng.random_range(1..=5);
        Order::limit(id, ts, side, price, qty)
    }
}

/// Biased toward buying, simulating a trader chasing an uptrend.
pub struct MomentumTrader {
    rng: StdRng,
    mid: f64,
}

impl MomentumTrader {
    pub fn new(seed: u64, mid: f64) -> Self {
        MomentumTrader { rng: StdRng::seed_from_u64(seed), mid }
    }
}

impl OrderGenerator for MomentumTrader {
    fn generate(&mut self, id: u64, ts: f64) -> Order {
        let side = if self.rng.random_bool(0.7) { Side::Buy } else { Side::Sell };
        let price = self.mid + self.rng.random_range(-0.5..=0.5);
        let qty = self.rng.random_range(1..=3);
        Order::limit(id, ts, side, price, qty)
    }
}

/// Uniform side, price (within a small band around the mid), and quantity.
pub struct RandomTrader {
    rng: StdRng,
    mid: f64,
}

impl RandomTrader {
    pub fn new(seed: u64, mid: f64) -> Self {
        RandomTrader { rng: StdRng::seed_from_u64(seed), mid }
    }
}

impl OrderGenerator for RandomTrader {
    fn generate(&mut self, id: u64, ts: f64) -> Order {
        let side = if self.rng.random_bool(0.5) { Side::Buy } else { Side::Sell };
        let price = self.mid + self.rng.random_range(-1.0..=1.0);
        let qty = self.rng.random_range(1..=10);
        Order::limit(id, ts, side, price, qty)
    }
}

/// A round-robin pool of `count` traders cycling through the three types,
/// mirroring `TRADER_TYPES * (NUM_TRADERS // len(TRADER_TYPES))` in
/// `examples/original_source/benchmarks/run_benchmarks.py:19,36`.
pub fn trader_pool(count: usize, seed: u64, mid: f64) -> Vec<Box<dyn OrderGenerator>> {
    (0..count)
        .map(|i| -> Box<dyn OrderGenerator> {
            match i % 3 {
                0 => Box::new(MarketMaker::new(seed + i as u64, mid, 0.1)),
                1 => Box::new(MomentumTrader::new(seed + i as u64, mid)),
                _ => Box::new(RandomTrader::new(seed + i as u64, mid)),
            }
        })
        .collect()
}

/// Draws `num_orders` orders from a random member of `traders` each time,
/// grounded on `simulate_traders` in
/// `examples/original_source/benchmarks/run_benchmarks.py:23-30`: ids run
/// `start_id..start_id+num_orders`, timestamps tick forward by a fixed
/// increment per order (`timestamp = time.time() + i * 0.0001`) so they
/// stay strictly increasing without needing a real clock.
pub fn simulate_traders(
    traders: &mut [Box<dyn OrderGenerator>],
    num_orders: usize,
    start_id: u64,
    start_ts: f64,
    pick_seed: u64,
) -> Vec<Order> {
    let mut picker = StdRng::seed_from_u64(pick_seed);
    (0..num_orders)
        .map(|i| {
            let trader = &mut traders[picker.random_range(0..traders.len())];
            let id = start_id + i as u64;
            let ts = start_ts + i as f64 * 0.0001;
            trader.generate(id, ts)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_maker_quotes_around_mid() {
        let mut mm = MarketMaker::new(1, 100.0, 0.1);
        for i in 0..20 {
            let o = mm.generate(i, i as f64);
            let price = o.price.unwrap();
            assert!((price - 100.0).abs() <= 0.1 + 1e-9);
        }
    }

    #[test]
    fn generators_produce_positive_quantities() {
        let mut mom = MomentumTrader::new(2, 100.0);
        let mut rnd = RandomTrader::new(3, 100.0);
        for i in 0..20 {
            assert!(mom.generate(i, i as f64).qty > 0);
            assert!(rnd.generate(i, i as f64).qty > 0);
        }
    }

    #[test]
    fn trader_pool_cycles_through_all_three_types() {
        let pool = trader_pool(6, 7, 100.0);
        assert_eq!(pool.len(), 6);
    }

    #[test]
    fn simulate_traders_assigns_strictly_increasing_ids_and_timestamps() {
        let mut pool = trader_pool(9, 11, 100.0);
        let orders = simulate_traders(&mut pool, 50, 1, 0.0, 5);
        assert_eq!(orders.len(), 50);
        for (i, order) in orders.iter().enumerate() {
            assert_eq!(order.id, 1 + i as u64);
        }
        for w in orders.windows(2) {
            assert!(w[1].ts > w[0].ts);
        }
    }

    #[test]
    fn simulate_traders_is_reproducible_given_the_same_pick_seed() {
        let mut pool_a = trader_pool(9, 11, 100.0);
        let mut pool_b = trader_pool(9, 11, 100.0);
        let a = simulate_traders(&mut pool_a, 30, 1, 0.0, 5);
        let b = simulate_traders(&mut pool_b, 30, 1, 0.0, 5);
        for (oa, ob) in a.iter().zip(b.iter()) {
            assert_eq!(oa.id, ob.id);
            assert_eq!(oa.price, ob.price);
            assert_eq!(oa.qty, ob.qty);
        }
    }
}
