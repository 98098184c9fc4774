//! Order types and the order lifecycle state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Monotonic, 1-based order id assigned by the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderAction {
    Buy,
    Sell,
}

impl OrderAction {
    /// Signed direction: buys add to a position, sells subtract.
    pub fn sign(&self) -> i64 {
        match self {
            OrderAction::Buy => 1,
            OrderAction::Sell => -1,
        }
    }

    pub fn opposite(&self) -> OrderAction {
        match self {
            OrderAction::Buy => OrderAction::Sell,
            OrderAction::Sell => OrderAction::Buy,
        }
    }
}

/// What kind of order and its price parameters.
///
/// Each variant carries only its relevant fields; the trailing stop owns a
/// mutable watermark that exists for no other type. The watermark is seeded
/// on the first evaluation after placement and only ever moves favorably
/// (down for a buy trail, up for a sell trail).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OrderKind {
    /// Fill at the opposing side of the live quote.
    Market,
    /// Fill at `limit` or better.
    Limit { limit: f64 },
    /// Fill once the opposing side breaches `stop`.
    Stop { stop: f64 },
    /// Fill once price retraces `offset` from the best level seen since
    /// placement.
    TrailingStop { offset: f64, watermark: Option<f64> },
}

/// Order lifecycle states.
///
/// `Accepted → Pending` happens when a parent order fills; `Filled` and
/// `Cancelled` are terminal and accept no further transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderState {
    /// Contingent child waiting for its parent to fill.
    Accepted,
    /// Live, evaluated for fills on every tick.
    Pending,
    Filled,
    Cancelled,
}

impl OrderState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderState::Filled | OrderState::Cancelled)
    }
}

/// A single execution against an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    pub shares: i64,
    pub price: f64,
    pub commission: f64,
    /// Set when this execution closes or reduces an opposing position.
    pub realized_pnl: Option<f64>,
}

/// A single order. Created by `Broker::place_order`, mutated only by the
/// broker's tick-evaluation and cancellation paths, and retained for history
/// in its owning position after reaching a terminal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Contingent link: this order activates only once its parent fills.
    pub parent_id: Option<OrderId>,
    pub symbol: String,
    pub action: OrderAction,
    pub kind: OrderKind,
    pub shares: i64,
    pub state: OrderState,
    pub opened_at: DateTime<Utc>,
    pub filled_at: Option<DateTime<Utc>>,
    /// Executions keyed by broker-wide execution id. A BTreeMap keeps the
    /// iteration order deterministic for hashing and replay comparison.
    pub executions: BTreeMap<u64, Execution>,
}

impl Order {
    /// Whether the order can still transition (not filled/cancelled).
    pub fn is_open(&self) -> bool {
        !self.state.is_terminal()
    }

    /// Shares filled so far across all executions.
    pub fn filled_shares(&self) -> i64 {
        self.executions.values().map(|e| e.shares).sum()
    }

    pub fn remaining_shares(&self) -> i64 {
        self.shares - self.filled_shares()
    }

    /// Share-weighted average fill price, or `None` before any execution.
    pub fn avg_fill_price(&self) -> Option<f64> {
        let filled = self.filled_shares();
        if filled == 0 {
            return None;
        }
        let notional: f64 = self
            .executions
            .values()
            .map(|e| e.price * e.shares as f64)
            .sum();
        Some(notional / filled as f64)
    }

    /// Total commission paid across executions.
    pub fn total_commission(&self) -> f64 {
        self.executions.values().map(|e| e.commission).sum()
    }
}
