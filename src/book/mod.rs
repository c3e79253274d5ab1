//! The `Book` trait is the only boundary the matcher and the latency harness
//! depend on. Three index structures implement it with identical semantics;
//! swapping one for another never changes a byte of emitted output (see
//! `tests/backend_equivalence.rs`).

mod hash;
mod heap;
mod sorted;

pub use hash::HashBook;
pub use heap::HeapBook;
pub use sorted::SortedBook;

use crate::order::{Depth, Order, Side, Trade};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BookError {
    #[error("limit order {0} has no price (or price is NaN)")]
    InvalidOrder(u64),
}

/// Common contract for a two-sided price ladder with FIFO queues per level.
///
/// Implementors own the resting orders; callers own whatever `match_book`
/// returns. No implementation here ever blocks or panics on adversarial
/// input within this contract — see the error handling notes on each method.
pub trait Book {
    /// Rests a LIMIT order at the tail of its price level's queue. No-ops
    /// for MARKET orders (the matcher routes those directly, see
    /// `crate::matching`). Fails only when a LIMIT order has no price or a
    /// `NaN` price.
    fn add_order(&mut self, order: Order) -> Result<(), BookError>;

    /// Removes `id` from whichever side it rests on. Idempotent: the first
    /// call for a given id returns `true`, every subsequent call `false`.
    fn cancel_order(&mut self, id: u64) -> bool;

    /// Highest bid price and its aggregate remaining quantity, if any bids rest.
    fn best_bid(&mut self) -> Option<(f64, u64)>;

    /// Lowest ask price and its aggregate remaining quantity, if any asks rest.
    fn best_ask(&mut self) -> Option<(f64, u64)>;

    /// FIFO snapshot of the resting orders at `(side, price)`, empty if none.
    fn orders_at_price(&self, side: Side, price: f64) -> Vec<Order>;

    /// Top `k` price levels per side, nearest-to-touch first. Fewer than `k`
    /// levels are returned as-is when the ladder is shallower than `k`.
    fn depth(&mut self, k: usize) -> Depth;

    /// Crosses the book while `best_bid >= best_ask`, popping the head order
    /// at each crossing level and emitting one `Trade` per fill. Returns an
    /// empty vector when the two sides don't cross (including when either
    /// side is empty).
    fn match_book(&mut self) -> Vec<Trade>;

    /// Fills against the head of `(side, price)`'s queue for up to `qty`,
    /// in place: the head's remaining quantity is decremented, and it is
    /// popped (along with the level, if now empty) only once it reaches
    /// zero. Returns `(maker_id, maker_ts, filled_qty)`, or `None` if the
    /// level doesn't exist. This is the primitive the market-order path
    /// uses so a partial fill never reshuffles the rest of the queue.
    fn fill_head(&mut self, side: Side, price: f64, qty: u64) -> Option<(u64, f64, u64)>;
}

/// Total order over `f64` prices so they can key a `HashMap`/`BTreeMap`/
/// `BinaryHeap`. `NaN` is rejected at `add_order`, so every price that
/// reaches a backend is comparable; `partial_cmp` is safe to unwrap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct OrderedFloat(pub f64);

impl Eq for OrderedFloat {}

impl PartialOrd for OrderedFloat {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedFloat {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.partial_cmp(&other.0).expect("NaN price reached a backend")
    }
}

impl std::hash::Hash for OrderedFloat {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

/// Shared FIFO-queue bookkeeping used by every backend: splice an order out
/// of its `VecDeque` by id, summing remaining quantity as it goes so callers
/// don't have to re-scan for the aggregate.
pub(crate) fn remove_from_queue(queue: &mut std::collections::VecDeque<Order>, id: u64) -> bool {
    if let Some(pos) = queue.iter().position(|o| o.id == id) {
        queue.remove(pos);
        true
    } else {
        false
    }
}

pub(crate) fn aggregate_qty(queue: &std::collections::VecDeque<Order>) -> u64 {
    queue.iter().map(|o| o.qty).sum()
}
