//! Value types shared by every component: orders, trades, and the small
//! enums that tag them. Nothing in this module mutates anything outside of
//! itself — orders carry their own remaining quantity, but decrementing it is
//! the book's job, not this module's.

/// Which side of the book an order rests on (or, for a market order, which
/// side it takes liquidity from).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Limit orders carry a price and rest in the book; market orders never rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderType {
    Limit,
    Market,
}

/// An order as it arrives at the engine. `id` and `ts` are assigned by the
/// caller (the event stream, in this crate); `qty` is mutated in place by the
/// book as fills occur.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: u64,
    pub ts: f64,
    pub side: Side,
    pub order_type: OrderType,
    /// `Some` iff `order_type == Limit`.
    pub price: Option<f64>,
    pub qty: u64,
    pub owner: Option<String>,
    pub flags: Option<String>,
}

/// Orders are identified by `id` alone — two `Order` values with the same id
/// are the same order regardless of how much of its quantity has since filled.
impl PartialEq for Order {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Order {}

impl Order {
    /// Convenience constructor for a resting-eligible limit order.
    pub fn limit(id: u64, ts: f64, side: Side, price: f64, qty: u64) -> Self {
        Order {
            id,
            ts,
            side,
            order_type: OrderType::Limit,
            price: Some(price),
            qty,
            owner: None,
            flags: None,
        }
    }

    /// Convenience constructor for a market order (no price, never rests).
    pub fn market(id: u64, ts: f64, side: Side, qty: u64) -> Self {
        Order {
            id,
            ts,
            side,
            order_type: OrderType::Market,
            price: None,
            qty,
            owner: None,
            flags: None,
        }
    }
}

/// One fill between a resting maker and an incoming or crossing taker.
///
/// `price` is always the resting-ask price at the moment of the cross (see
/// the matching algorithm in `crate::matching`), which is why the field isn't
/// called `maker_price` — it's specifically the ask side's price, even when
/// the maker is the bid (a newly-added aggressive bid crosses a resting ask,
/// and the ask's price is what prints).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trade {
    pub ts: f64,
    pub price: f64,
    pub qty: u64,
    pub maker_id: u64,
    pub taker_id: u64,
}

/// Top-k aggregate quantity per price level, each side sorted toward the
/// touch (bids descending, asks ascending).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Depth {
    pub bids: Vec<(f64, u64)>,
    pub asks: Vec<(f64, u64)>,
}
