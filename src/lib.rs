//! A price-time priority limit order book matching engine: single-symbol,
//! in-memory, single-threaded. See `prelude` for the small public surface
//! most callers need; the `book`, `matching`, `stream`, `strategies`, and
//! `latency` modules are public for direct use and for the benches.

pub mod book;
pub mod cli;
pub mod latency;
pub mod matching;
pub mod order;
pub mod strategies;
pub mod stream;

pub mod prelude {
    pub use crate::book::{Book, BookError, HashBook, HeapBook, SortedBook};
    pub use crate::matching::Matcher;
    pub use crate::order::{Depth, Order, OrderType, Side, Trade};
    pub use crate::stream::{StreamConfig, StreamEvent, SyntheticEventStream};
}
