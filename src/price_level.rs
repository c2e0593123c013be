//! A FIFO queue of the orders resting at one price.
//!
//! Intrusive doubly-linked list threaded through the pool's `prev`/`next`
//! fields. Append, unlink, and head access are all O(1).

use crate::message::Qty;
use crate::pool::{OrderPool, PoolIndex, NULL_INDEX};

/// Orders sharing one price on one side, oldest (highest time priority)
/// at `head`.
///
/// `cached_qty` is maintained incrementally on insert, unlink, and partial
/// fill, so depth queries never walk the list. Invariant: it always equals
/// the sum of `qty` over the linked orders.
#[derive(Clone, Copy, Debug)]
pub struct PriceLevel {
    pub head: PoolIndex,
    pub tail: PoolIndex,
    pub count: u32,
    pub cached_qty: Qty,
}

impl PriceLevel {
    #[inline]
    pub const fn new() -> Self {
        Self {
            head: NULL_INDEX,
            tail: NULL_INDEX,
            count: 0,
            cached_qty: 0,
        }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.head == NULL_INDEX
    }

    /// Head order without unlinking it, or `NULL_INDEX` when empty.
    #[inline]
    pub const fn front(&self) -> PoolIndex {
        self.head
    }

    /// Append at the tail (newest, lowest time priority). O(1).
    pub fn push_back(&mut self, pool: &mut OrderPool, index: PoolIndex) {
        let qty = pool.get(index).qty;
        let tail = self.tail;

        let order = pool.get_mut(index);
        order.next = NULL_INDEX;
        order.prev = tail;

        if tail == NULL_INDEX {
            debug_assert!(self.head == NULL_INDEX);
            self.head = index;
        } else {
            pool.get_mut(tail).next = index;
        }
        self.tail = index;

        self.count += 1;
        self.cached_qty += qty;
    }

    /// Unlink an order from anywhere in the queue. O(1).
    ///
    /// Patches the neighbors' links and adjusts `head`/`tail` at the
    /// endpoints; safe when the order is the only element. Subtracts the
    /// order's current `qty` from the cache. Returns `true` when the level
    /// emptied, in which case the caller erases it from the side index.
    pub fn remove(&mut self, pool: &mut OrderPool, index: PoolIndex) -> bool {
        let (prev, next, qty) = {
            let order = pool.get(index);
            (order.prev, order.next, order.qty)
        };

        if prev != NULL_INDEX {
            pool.get_mut(prev).next = next;
        } else {
            debug_assert_eq!(self.head, index);
            self.head = next;
        }

        if next != NULL_INDEX {
            pool.get_mut(next).prev = prev;
        } else {
            debug_assert_eq!(self.tail, index);
            self.tail = prev;
        }

        let order = pool.get_mut(index);
        order.prev = NULL_INDEX;
        order.next = NULL_INDEX;

        self.count -= 1;
        self.cached_qty -= qty;
        self.head == NULL_INDEX
    }

    /// Unlink and return the head order. O(1).
    pub fn pop_front(&mut self, pool: &mut OrderPool) -> Option<PoolIndex> {
        if self.head == NULL_INDEX {
            return None;
        }
        let index = self.head;
        self.remove(pool, index);
        Some(index)
    }

    /// Refresh `cached_qty` after a resting order's `qty` changed in place
    /// (partial fill of the head).
    #[inline]
    pub fn update_qty(&mut self, old_qty: Qty, new_qty: Qty) {
        self.cached_qty += new_qty - old_qty;
    }
}

impl Default for PriceLevel {
    fn default() -> Self {
        Self::new()
    }
}
