//! Hash-table backend: `HashMap<price, VecDeque<Order>>` per side.
//! `best_bid`/`best_ask` scan every key, which is the baseline this crate
//! measures the other two backends against.

use std::collections::{HashMap, VecDeque};

use super::{aggregate_qty, remove_from_queue, Book, BookError, OrderedFloat};
use crate::order::{Depth, Order, OrderType, Side, Trade};

#[derive(Debug, Default)]
pub struct HashBook {
    bids: HashMap<OrderedFloat, VecDeque<Order>>,
    asks: HashMap<OrderedFloat, VecDeque<Order>>,
    /// id -> (side, price), enough to find the order's queue directly.
    index: HashMap<u64, (Side, OrderedFloat)>,
}

impl HashBook {
    pub fn new() -> Self {
        Self::default()
    }

    fn side_map(&mut self, side: Side) -> &mut HashMap<OrderedFloat, VecDeque<Order>> {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    fn best(map: &HashMap<OrderedFloat, VecDeque<Order>>, side: Side) -> Option<(f64, u64)> {
        let best_key = match side {
            Side::Buy => map.keys().max(),
            Side::Sell => map.keys().min(),
        }?;
        let queue = map.get(best_key)?;
        Some((best_key.0, aggregate_qty(queue)))
    }
}

impl Book for HashBook {
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
        Self::best(&self.bids, Side::Buy)
    }

    fn best_ask(&mut self) -> Option<(f64, u64)> {
        Self::best(&self.asks, Side::Sell)
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
            .map(|(p, q)| (p.0, aggregate_qty(q)))
            .collect();
        bid_levels.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap());
        bid_levels.truncate(k);

        let mut ask_levels: Vec<(f64, u64)> = self
            .asks
            .iter()
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
            let Some((bid_price, _)) = Self::best(&self.bids, Side::Buy) else {
                break;
            };
            let Some((ask_price, _)) = Self::best(&self.asks, Side::Sell) else {
                break;
            };
            if bid_price < ask_price {
                break;
            }

            let bid_key = OrderedFloat(bid_price);
            let ask_key = OrderedFloat(ask_price);

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
                price: ask_price,
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::Order;

    #[test]
    fn no_cross_leaves_both_sides_resting() {
        let mut book = HashBook::new();
        book.add_order(Order::limit(1, 1.0, Side::Buy, 100.0, 10)).unwrap();
        book.add_order(Order::limit(2, 2.0, Side::Sell, 101.0, 5)).unwrap();
        assert_eq!(book.match_book(), vec![]);
        assert_eq!(book.best_bid(), Some((100.0, 10)));
        assert_eq!(book.best_ask(), Some((101.0, 5)));
    }

    #[test]
    fn exact_fill_empties_both_sides() {
        let mut book = HashBook::new();
        book.add_order(Order::limit(1, 1.0, Side::Buy, 100.0, 10)).unwrap();
        book.add_order(Order::limit(2, 2.0, Side::Sell, 100.0, 10)).unwrap();
        let trades = book.match_book();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].qty, 10);
        assert_eq!(trades[0].maker_id, 2);
        assert_eq!(trades[0].taker_id, 1);
        assert!(book.best_bid().is_none());
        assert!(book.best_ask().is_none());
        assert!(!book.cancel_order(1));
        assert!(!book.cancel_order(2));
    }

    #[test]
    fn rejects_limit_without_price() {
        let mut book = HashBook::new();
        let mut bad = Order::market(1, 1.0, Side::Buy, 1);
        bad.order_type = OrderType::Limit;
        assert_eq!(book.add_order(bad), Err(BookError::InvalidOrder(1)));
    }

    #[test]
    fn market_order_never_rests() {
        let mut book = HashBook::new();
        book.add_order(Order::market(1, 1.0, Side::Buy, 5)).unwrap();
        assert!(book.best_bid().is_none());
    }

    #[test]
    fn cancel_removes_empty_price_level() {
        let mut book = HashBook::new();
        book.add_order(Order::limit(1, 1.0, Side::Sell, 100.0, 5)).unwrap();
        assert!(book.cancel_order(1));
        assert!(book.orders_at_price(Side::Sell, 100.0).is_empty());
        assert!(book.best_ask().is_none());
    }
}
