//! # tick-lob
//!
//! A single-instrument, single-threaded limit order book matching engine.
//!
//! ## Design Principles
//!
//! - **Single-Writer**: the book is an owned value mutated through
//!   `&mut self` only (no locks, no atomics)
//! - **Price-Time Priority**: aggressive prices first, FIFO within a level,
//!   executions at the resting order's price
//! - **O(1) Cancel**: intrusive doubly-linked levels addressed by pool index
//! - **Zero-Allocation Hot Path**: orders come from a pre-reserved pool,
//!   trades append into a pre-reserved journal
//!
//! ## Architecture
//!
//! ```text
//! [CSV Reader] --> [Msg stream] --> [Book::process]
//!                                        |
//!                              [Trade journal + queries]
//! ```

pub mod book;
pub mod ladder;
pub mod message;
pub mod pool;
pub mod price_level;
pub mod reader;

// Re-exports for convenience
pub use book::Book;
pub use ladder::Ladder;
pub use message::{Msg, MsgType, OrderId, Price, Qty, Reject, Side, Timestamp, Trade};
pub use pool::{Order, OrderPool, PoolIndex, NULL_INDEX};
pub use price_level::PriceLevel;
