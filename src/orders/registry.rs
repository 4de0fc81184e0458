//! Registry of this agent's orders at the exchange.
//!
//! Lifecycle per id:
//! `Pending -> PartiallyFilled -> ... -> Closed`, or `Pending -> Closed`.
//! A closed order is dropped from the registry entirely.
//!
//! Cancelling does not close an order. A cancelled order leaves the
//! outstanding set but stays registered until the exchange reports it
//! terminal, so fills that race the cancel are still attributed to a side.

use crate::gateway::{Lifespan, OrderId, Price, Side, Volume};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Lifecycle state of a tracked order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OrderState {
    Pending,
    PartiallyFilled,
    Closed,
}

/// An order this agent inserted and has not yet seen terminate.
#[derive(Debug, Clone, Serialize)]
pub struct TrackedOrder {
    pub id: OrderId,
    pub side: Side,
    pub price: Price,
    pub volume: Volume,
    pub lifespan: Lifespan,
    pub state: OrderState,
    pub filled_volume: Volume,
    /// A cancel has been sent; no longer counted as outstanding.
    pub cancel_requested: bool,
}

impl TrackedOrder {
    /// A freshly inserted order.
    pub fn new(id: OrderId, side: Side, price: Price, volume: Volume, lifespan: Lifespan) -> Self {
        Self {
            id,
            side,
            price,
            volume,
            lifespan,
            state: OrderState::Pending,
            filled_volume: 0,
            cancel_requested: false,
        }
    }

    /// Counts against the outstanding-order cap.
    pub fn is_outstanding(&self) -> bool {
        self.state != OrderState::Closed && !self.cancel_requested
    }
}

/// Result of applying an exchange status report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTransition {
    pub side: Side,
    pub from: OrderState,
    pub to: OrderState,
}

/// Tracks every order this agent has resting or in flight.
#[derive(Debug, Default)]
pub struct OrderRegistry {
    orders: BTreeMap<OrderId, TrackedOrder>,
    active_bid: Option<OrderId>,
    active_ask: Option<OrderId>,
}

impl OrderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a newly inserted order and make it the active slot for its side.
    pub fn register(&mut self, order: TrackedOrder) {
        match order.side {
            Side::Buy => self.active_bid = Some(order.id),
            Side::Sell => self.active_ask = Some(order.id),
        }
        self.orders.insert(order.id, order);
    }

    /// Look up a tracked order.
    pub fn get(&self, id: OrderId) -> Option<&TrackedOrder> {
        self.orders.get(&id)
    }

    /// Side of a tracked order, `None` if the id is not ours or already closed.
    pub fn side_of(&self, id: OrderId) -> Option<Side> {
        self.orders.get(&id).map(|o| o.side)
    }

    /// Id of the most recently inserted buy, until it closes.
    pub fn active_bid(&self) -> Option<OrderId> {
        self.active_bid
    }

    /// Id of the most recently inserted sell, until it closes.
    pub fn active_ask(&self) -> Option<OrderId> {
        self.active_ask
    }

    /// Number of tracked orders, including those with a cancel in flight.
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Whether no orders are tracked.
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Number of orders counting against the outstanding cap.
    pub fn outstanding_count(&self) -> usize {
        self.orders.values().filter(|o| o.is_outstanding()).count()
    }

    /// Collect every outstanding id (oldest first), then mark each as
    /// cancel-requested. The caller sends the cancels.
    pub fn drain_outstanding(&mut self) -> Vec<OrderId> {
        let ids: Vec<OrderId> = self
            .orders
            .values()
            .filter(|o| o.is_outstanding())
            .map(|o| o.id)
            .collect();

        for id in &ids {
            if let Some(order) = self.orders.get_mut(id) {
                order.cancel_requested = true;
            }
        }

        ids
    }

    /// Attribute a fill to a tracked order. Returns its side.
    pub fn record_fill(&mut self, id: OrderId, volume: Volume) -> Option<Side> {
        let order = self.orders.get_mut(&id)?;
        order.filled_volume = order.filled_volume.saturating_add(volume);
        Some(order.side)
    }

    /// Apply an exchange status report.
    ///
    /// `remaining_volume == 0` closes the order and drops it; otherwise a
    /// non-zero fill marks it partially filled. Unknown ids return `None`.
    pub fn apply_status(
        &mut self,
        id: OrderId,
        fill_volume: Volume,
        remaining_volume: Volume,
    ) -> Option<StatusTransition> {
        let (from, side) = self.orders.get(&id).map(|o| (o.state, o.side))?;

        if remaining_volume == 0 {
            self.close(id);
            return Some(StatusTransition {
                side,
                from,
                to: OrderState::Closed,
            });
        }

        let order = self.orders.get_mut(&id)?;
        if fill_volume > 0 {
            order.state = OrderState::PartiallyFilled;
        }

        Some(StatusTransition {
            side,
            from,
            to: order.state,
        })
    }

    fn close(&mut self, id: OrderId) {
        if self.active_bid == Some(id) {
            self.active_bid = None;
        } else if self.active_ask == Some(id) {
            self.active_ask = None;
        }
        if let Some(order) = self.orders.remove(&id) {
            debug!(order_id = id, side = ?order.side, filled = order.filled_volume, "Order closed");
        }
    }
}
