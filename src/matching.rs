//! Dispatches an incoming order to the right path and returns the trades it
//! produced. The matcher is generic over `Book` — it never matches on a
//! concrete backend, so `Matcher<HashBook>`, `Matcher<SortedBook>` and
//! `Matcher<HeapBook>` are interchangeable (see `tests/backend_equivalence.rs`).

use tracing::{debug, trace};

use crate::book::{Book, BookError};
use crate::order::{Order, OrderType, Side, Trade};

pub struct Matcher<B: Book> {
    pub book: B,
}

impl<B: Book> Matcher<B> {
    pub fn new(book: B) -> Self {
        Matcher { book }
    }

    /// Single public entry point: route `order` by type and return whatever
    /// trades it caused. Limit orders that fail `InvalidOrder` validation
    /// produce no trades and are simply dropped (the error is logged, not
    /// propagated — see `BookError` for why that's the only failure mode).
    pub fn submit(&mut self, order: Order) -> Vec<Trade> {
        match order.order_type {
            OrderType::Limit => self.submit_limit(order),
            OrderType::Market => self.submit_market(order),
        }
    }

    fn submit_limit(&mut self, order: Order) -> Vec<Trade> {
        let id = order.id;
        match self.book.add_order(order) {
            Ok(()) => self.book.match_book(),
            Err(BookError::InvalidOrder(_)) => {
                debug!(order_id = id, "rejected limit order with no/NaN price");
                Vec::new()
            }
        }
    }

    /// Walks the opposite side from the best level outward, filling from
    /// the queue head in place (via `Book::fill_head`) until the incoming
    /// quantity is exhausted or the side runs dry. Any residual quantity is
    /// discarded silently — market orders never rest and never report a
    /// partial-fill failure.
    fn submit_market(&mut self, mut order: Order) -> Vec<Trade> {
        let mut trades = Vec::new();
        let opposite = order.side.opposite();

        while order.qty > 0 {
            let level = match opposite {
                Side::Buy => self.book.best_bid(),
                Side::Sell => self.book.best_ask(),
            };
            let Some((price, _)) = level else {
                trace!(order_id = order.id, remaining = order.qty, "market order exhausted book");
                break;
            };

            let Some((maker_id, maker_ts, filled)) = self.book.fill_head(opposite, price, order.qty) else {
                break;
            };

            trades.push(Trade {
                ts: order.ts.max(maker_ts),
                price,
                qty: filled,
                maker_id,
                taker_id: order.id,
            });

            order.qty -= filled;
        }

        trades
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::HashBook;

    fn matcher() -> Matcher<HashBook> {
        Matcher::new(HashBook::new())
    }

    #[test]
    fn market_walks_the_book_across_levels() {
        let mut m = matcher();
        m.submit(Order::limit(1, 1.0, Side::Sell, 100.0, 5));
        m.submit(Order::limit(2, 2.0, Side::Sell, 101.0, 3));

        let trades = m.submit(Order::market(3, 3.0, Side::Buy, 6));
        assert_eq!(trades.len(), 2);
        assert_eq!((trades[0].price, trades[0].qty, trades[0].maker_id), (100.0, 5, 1));
        assert_eq!((trades[1].price, trades[1].qty, trades[1].maker_id), (101.0, 1, 2));
        assert_eq!(m.book.best_ask(), Some((101.0, 2)));
    }

    #[test]
    fn market_order_residual_is_discarded_silently() {
        let mut m = matcher();
        m.submit(Order::limit(1, 1.0, Side::Sell, 100.0, 3));
        let trades = m.submit(Order::market(2, 2.0, Side::Buy, 10));
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].qty, 3);
        assert!(m.book.best_ask().is_none());
    }

    #[test]
    fn crossing_limit_matches_then_rests_remainder() {
        let mut m = matcher();
        m.submit(Order::limit(1, 1.0, Side::Sell, 105.0, 5));
        let trades = m.submit(Order::limit(2, 2.0, Side::Buy, 110.0, 3));
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].price, 105.0);
        assert_eq!(m.book.orders_at_price(Side::Sell, 105.0)[0].qty, 2);
        assert!(m.book.best_bid().is_none());
    }

    #[test]
    fn partial_market_fill_preserves_fifo_for_remaining_resting_order() {
        let mut m = matcher();
        m.submit(Order::limit(1, 1.0, Side::Sell, 100.0, 5));
        m.submit(Order::limit(2, 2.0, Side::Sell, 100.0, 5));
        let trades = m.submit(Order::market(3, 3.0, Side::Buy, 3));
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].maker_id, 1);
        let resting = m.book.orders_at_price(Side::Sell, 100.0);
        assert_eq!(resting.len(), 2);
        assert_eq!(resting[0].id, 1);
        assert_eq!(resting[0].qty, 2);
        assert_eq!(resting[1].id, 2);
        assert_eq!(resting[1].qty, 5);
    }
}
