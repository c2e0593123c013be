//! The order book: pool, ladder, locator, and the matching engine itself.
//!
//! One `process` call runs to completion before the next is accepted; all
//! state is owned by the `Book` value and mutated only through `&mut self`,
//! so concurrent driving is impossible by construction.

use rustc_hash::FxHashMap;

use crate::ladder::Ladder;
use crate::message::{Msg, MsgType, OrderId, Price, Qty, Reject, Side, Timestamp, Trade};
use crate::pool::{OrderPool, PoolIndex, DEFAULT_POOL_CAPACITY, NULL_INDEX};

/// Single-instrument limit order book with price-time priority matching.
pub struct Book {
    pool: OrderPool,
    ladder: Ladder,
    /// Resting orders only: id -> pool slot. Market orders never enter.
    locator: FxHashMap<OrderId, PoolIndex>,
    trades: Vec<Trade>,
    record_trades: bool,
    total_messages: u64,
    total_trades: u64,
}

impl Book {
    /// Empty book with the default pre-reserved pool capacity.
    pub fn new() -> Self {
        Self::with_pool_capacity(DEFAULT_POOL_CAPACITY)
    }

    /// Empty book with an explicit pool capacity, for tests and benchmarks.
    pub fn with_pool_capacity(capacity: usize) -> Self {
        Self {
            pool: OrderPool::with_capacity(capacity),
            ladder: Ladder::new(),
            locator: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            trades: Vec::with_capacity(capacity),
            record_trades: true,
            total_messages: 0,
            total_trades: 0,
        }
    }

    /// Consume one message.
    ///
    /// Rejections leave the book untouched (apart from the message counter).
    /// A cancel for an unknown id is a successful no-op, not a rejection.
    pub fn process(&mut self, msg: &Msg) -> Result<(), Reject> {
        self.total_messages += 1;
        match msg.msg_type {
            MsgType::NewLimit => self.new_limit(msg),
            MsgType::NewMarket => self.new_market(msg),
            MsgType::Cancel => {
                self.cancel(msg.id);
                Ok(())
            }
        }
    }

    // ========================================================================
    // Message handlers
    // ========================================================================

    fn new_limit(&mut self, msg: &Msg) -> Result<(), Reject> {
        if msg.qty <= 0 {
            return Err(Reject::InvalidQuantity(msg.qty));
        }
        if self.locator.contains_key(&msg.id) {
            return Err(Reject::DuplicateOrderId(msg.id));
        }

        let index = self.pool.alloc();
        self.pool.get_mut(index).init(msg.id, msg.side, msg.price, msg.qty);

        self.sweep(index, Some(msg.price), msg.ts);

        if self.pool.get(index).qty > 0 {
            self.rest(index);
        }
        Ok(())
    }

    fn new_market(&mut self, msg: &Msg) -> Result<(), Reject> {
        if msg.qty <= 0 {
            return Err(Reject::InvalidQuantity(msg.qty));
        }

        // Transient: the record backs the sweep but is never indexed, so
        // any unfilled remainder is dropped with it.
        let index = self.pool.alloc();
        self.pool.get_mut(index).init(msg.id, msg.side, 0, msg.qty);

        self.sweep(index, None, msg.ts);
        Ok(())
    }

    fn cancel(&mut self, id: OrderId) {
        // Unknown id: filled, already canceled, or never seen. All three
        // are observationally the same, so the cancel is idempotent.
        let Some(index) = self.locator.remove(&id) else {
            return;
        };

        let (side, price) = {
            let order = self.pool.get(index);
            (order.side, order.price)
        };

        if let Some(level) = self.ladder.level_mut(side, price) {
            if level.remove(&mut self.pool, index) {
                self.ladder.remove_level(side, price);
            }
        }
    }

    // ========================================================================
    // Matching
    // ========================================================================

    /// Cross the incoming order against the opposite side until it is
    /// exhausted, the opposite side runs dry, or (for limits) the best
    /// opposite price stops crossing.
    fn sweep(&mut self, incoming: PoolIndex, limit: Option<Price>, ts: Timestamp) {
        let side = self.pool.get(incoming).side;
        let maker_side = side.opposite();

        while self.pool.get(incoming).qty > 0 {
            let Some(best) = self.ladder.best_price(maker_side) else {
                break;
            };
            if let Some(limit) = limit {
                let crosses = match side {
                    Side::Buy => best <= limit,
                    Side::Sell => best >= limit,
                };
                if !crosses {
                    break;
                }
            }
            self.fill_at_level(incoming, side, best, ts);
        }
    }

    /// Fill against the FIFO queue at one opposite-side price.
    ///
    /// Trades execute at `price`, the resting side's price. A fully filled
    /// maker is unlinked and dropped from the locator; a partially filled
    /// maker keeps head position, which also means the taker is spent.
    fn fill_at_level(&mut self, incoming: PoolIndex, taker_side: Side, price: Price, ts: Timestamp) {
        let maker_side = taker_side.opposite();

        loop {
            let (taker_qty, taker_id) = {
                let taker = self.pool.get(incoming);
                (taker.qty, taker.id)
            };
            if taker_qty == 0 {
                break;
            }

            let Some(level) = self.ladder.level_mut(maker_side, price) else {
                break;
            };
            let head = level.front();
            if head == NULL_INDEX {
                break;
            }

            let (maker_id, maker_qty) = {
                let maker = self.pool.get(head);
                (maker.id, maker.qty)
            };
            let fill = taker_qty.min(maker_qty);
            let maker_left = maker_qty - fill;

            self.pool.get_mut(incoming).qty -= fill;
            self.pool.get_mut(head).qty = maker_left;
            level.update_qty(maker_qty, maker_left);

            self.total_trades += 1;
            if self.record_trades {
                let (buy_id, sell_id) = match taker_side {
                    Side::Buy => (taker_id, maker_id),
                    Side::Sell => (maker_id, taker_id),
                };
                self.trades.push(Trade { buy_id, sell_id, price, qty: fill, ts });
            }

            if maker_left == 0 {
                let emptied = level.remove(&mut self.pool, head);
                self.locator.remove(&maker_id);
                if emptied {
                    self.ladder.remove_level(maker_side, price);
                    break;
                }
            } else {
                break;
            }
        }
    }

    /// Rest the residual of a limit order, lazily creating its level.
    fn rest(&mut self, index: PoolIndex) {
        let (id, side, price) = {
            let order = self.pool.get(index);
            (order.id, order.side, order.price)
        };
        let level = self.ladder.get_or_create(side, price);
        level.push_back(&mut self.pool, index);
        self.locator.insert(id, index);
    }

    // ========================================================================
    // Read-only queries
    // ========================================================================

    /// Greatest bid price, or `None` when no bids rest.
    #[inline]
    pub fn best_bid(&self) -> Option<Price> {
        self.ladder.best_price(Side::Buy)
    }

    /// Least ask price, or `None` when no asks rest.
    #[inline]
    pub fn best_ask(&self) -> Option<Price> {
        self.ladder.best_price(Side::Sell)
    }

    /// Resting quantity at the best bid, 0 when no bids rest.
    #[inline]
    pub fn best_bid_qty(&self) -> Qty {
        self.ladder.best_level(Side::Buy).map_or(0, |level| level.cached_qty)
    }

    /// Resting quantity at the best ask, 0 when no asks rest.
    #[inline]
    pub fn best_ask_qty(&self) -> Qty {
        self.ladder.best_level(Side::Sell).map_or(0, |level| level.cached_qty)
    }

    /// Total resting bid quantity. Linear in the number of bid levels.
    pub fn total_bid_qty(&self) -> Qty {
        self.ladder.total_qty(Side::Buy)
    }

    /// Total resting ask quantity. Linear in the number of ask levels.
    pub fn total_ask_qty(&self) -> Qty {
        self.ladder.total_qty(Side::Sell)
    }

    /// Recorded executions, oldest first.
    #[inline]
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// Empty the trade journal without touching the book.
    pub fn clear_trades(&mut self) {
        self.trades.clear();
    }

    /// Messages consumed, including rejected ones.
    #[inline]
    pub fn total_messages(&self) -> u64 {
        self.total_messages
    }

    /// Executions matched since construction; unaffected by `clear_trades`
    /// and counted even when recording is off.
    #[inline]
    pub fn total_trades(&self) -> u64 {
        self.total_trades
    }

    /// Number of resting orders.
    #[inline]
    pub fn order_count(&self) -> usize {
        self.locator.len()
    }

    /// Populated level counts as (bids, asks).
    pub fn level_counts(&self) -> (usize, usize) {
        (self.ladder.depth(Side::Buy), self.ladder.depth(Side::Sell))
    }

    /// Resting quantity and order count at one price.
    pub fn depth_at(&self, side: Side, price: Price) -> (Qty, u32) {
        self.ladder
            .level(side, price)
            .map_or((0, 0), |level| (level.cached_qty, level.count))
    }

    /// The (id, qty) pairs resting at one price, in time priority order.
    pub fn level_orders(&self, side: Side, price: Price) -> Vec<(OrderId, Qty)> {
        let mut out = Vec::new();
        if let Some(level) = self.ladder.level(side, price) {
            let mut cursor = level.front();
            while cursor != NULL_INDEX {
                let order = self.pool.get(cursor);
                out.push((order.id, order.qty));
                cursor = order.next;
            }
        }
        out
    }

    /// Prices of every populated level on a side, best first.
    pub fn level_prices(&self, side: Side) -> Vec<Price> {
        self.ladder.levels(side).map(|(price, _)| price).collect()
    }

    /// Toggle trade recording. The trade counter keeps running either way.
    pub fn set_trade_recording(&mut self, enabled: bool) {
        self.record_trades = enabled;
    }

    /// Pre-fault the pool so steady-state processing never page-faults.
    pub fn warm_up(&mut self) {
        self.pool.warm_up();
    }
}

impl Default for Book {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Book {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Book")
            .field("best_bid", &self.best_bid())
            .field("best_ask", &self.best_ask())
            .field("resting_orders", &self.locator.len())
            .field("total_messages", &self.total_messages)
            .field("total_trades", &self.total_trades)
            .finish()
    }
}
