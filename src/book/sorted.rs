//! Sorted-map backend: `BTreeMap<price, VecDeque<Order>>` per side, so
//! `best_bid`/`best_ask` are a single `last_key_value`/`first_key_value`
//! lookup instead of a full key scan.

use std::collections::{BTreeMap, VecDeque};

use super::{aggregate_qty, remove_from_queue, Book, BookError, OrderedFloat};
use crate::order::{Depth, Order, OrderType, Side, Trade};

#[derive(Debug, Default)]
pub struct SortedBook {
    bids: BTreeMap<OrderedFloat, VecDeque<Order>>,
    asks: BTreeMap<OrderedFloat, VecDeque<Order>>,
    index: HashMapIndex,
}

type HashMapIndex = std::collections::HashMap<u64, (Side, OrderedFloat)>;

impl SortedBook {
    pub fn new() -> Self {
        Self::default()
    }

    fn side_map(&mut self, side: Side) -> &mut BTreeMap<OrderedFloat, VecDeque<Order>> {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }
}

impl Book for SortedBook {
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
        self.side_map(side).entry(key).or_default().push_back(order);
        self.index.insert(id, (side, key));
        Ok(())
    }

    fn cancel_order(&mut self, id: u64) -> bool {
        let Some((side, price)) = self.index.remove(&id) else {
            return false;
        };
        let map = self.side_map(side);
        let Some(queue) = map.get_mut(&price) else {
            return false;
        };
        let removed = remove_from_queue(queue, id);
        if removed && queue.is_empty() {
            map.remove(&price);
        }
        removed
    }

    fn best_bid(&mut self) -> Option<(f64, u64)> {
        let (price, queue) = self.bids.last_key_value()?;
        Some((price.0, aggregate_qty(queue)))
    }

    fn best_ask(&mut self) -> Option<(f64, u64)> {
        let (price, queue) = self.asks.first_key_value()?;
        Some((price.0, aggregate_qty(queue)))
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
        let bids = self
            .bids
            .iter()
            .rev()
            .take(k)
            .map(|(p, q)| (p.0, aggregate_qty(q)))
            .collect();
        let asks = self
            .asks
            .iter()
            .take(k)
            .map(|(p, q)| (p.0, aggregate_qty(q)))
            .collect();
        Depth { bids, asks }
    }

    fn match_book(&mut self) -> Vec<Trade> {
        let mut trades = Vec::new();
        loop {
            let Some((&bid_key, _)) = self.bids.last_key_value() else {
                break;
            };
            let Some((&ask_key, _)) = self.asks.first_key_value() else {
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
        let map = self.side_map(side);
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
        }
        Some((maker_id, maker_ts, filled))
    }
}
