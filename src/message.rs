//! Message and trade record types.
//!
//! Messages are the pre-parsed input stream consumed by the book.
//! Trades are the executions it produces.

use serde::Serialize;
use thiserror::Error;

/// Price in integer ticks.
pub type Price = i64;

/// Quantity in integer lots.
pub type Qty = i64;

/// Client-supplied order identifier, unique across a session.
pub type OrderId = u64;

/// Opaque nanosecond timestamp, passed through from input to trades.
pub type Timestamp = u64;

/// Order side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Side {
    Buy = 0,
    Sell = 1,
}

impl Side {
    /// Returns the opposite side.
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Message kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum MsgType {
    /// New limit order: match what crosses, rest the remainder.
    NewLimit = 0,
    /// New market order: sweep the opposite side, drop the remainder.
    NewMarket = 1,
    /// Cancel a resting order by id.
    Cancel = 2,
}

/// One inbound message.
#[derive(Clone, Copy, Debug)]
pub struct Msg {
    pub msg_type: MsgType,
    /// Ignored for Cancel.
    pub side: Side,
    pub id: OrderId,
    /// Meaningful for NewLimit only.
    pub price: Price,
    /// Lots requested; 0 for Cancel.
    pub qty: Qty,
    pub ts: Timestamp,
}

impl Msg {
    #[inline]
    pub const fn new_limit(id: OrderId, side: Side, price: Price, qty: Qty) -> Self {
        Self { msg_type: MsgType::NewLimit, side, id, price, qty, ts: 0 }
    }

    #[inline]
    pub const fn new_market(id: OrderId, side: Side, qty: Qty) -> Self {
        Self { msg_type: MsgType::NewMarket, side, id, price: 0, qty, ts: 0 }
    }

    #[inline]
    pub const fn cancel(id: OrderId) -> Self {
        Self { msg_type: MsgType::Cancel, side: Side::Buy, id, price: 0, qty: 0, ts: 0 }
    }

    #[inline]
    pub const fn at(mut self, ts: Timestamp) -> Self {
        self.ts = ts;
        self
    }
}

/// One execution.
///
/// `price` is always the resting (passive) order's price. `ts` is the
/// timestamp of the incoming message that triggered the match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Trade {
    pub buy_id: OrderId,
    pub sell_id: OrderId,
    pub price: Price,
    pub qty: Qty,
    pub ts: Timestamp,
}

/// Why the book refused a message.
///
/// Cancels of unknown ids are not rejections; they are no-ops by design.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Reject {
    #[error("order id {0} is already resting")]
    DuplicateOrderId(OrderId),
    #[error("quantity {0} is not positive")]
    InvalidQuantity(Qty),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_opposite() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
    }

    #[test]
    fn msg_constructors() {
        let limit = Msg::new_limit(1, Side::Buy, 100, 10).at(42);
        assert_eq!(limit.msg_type, MsgType::NewLimit);
        assert_eq!(limit.price, 100);
        assert_eq!(limit.ts, 42);

        let market = Msg::new_market(2, Side::Sell, 5);
        assert_eq!(market.msg_type, MsgType::NewMarket);
        assert_eq!(market.price, 0);

        let cancel = Msg::cancel(3);
        assert_eq!(cancel.msg_type, MsgType::Cancel);
        assert_eq!(cancel.qty, 0);
    }

    #[test]
    fn reject_display() {
        assert_eq!(
            Reject::DuplicateOrderId(7).to_string(),
            "order id 7 is already resting"
        );
        assert_eq!(
            Reject::InvalidQuantity(-3).to_string(),
            "quantity -3 is not positive"
        );
    }
}
