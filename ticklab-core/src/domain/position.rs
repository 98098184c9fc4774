//! Position — the net open exposure in one symbol.

use super::order::OrderId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Net exposure in one symbol, composed of one or more orders.
///
/// The broker keeps at most one open position per symbol. `size` is the
/// signed sum of filled order shares (positive long, negative short); a
/// position closes when that sum returns to exactly zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    /// Ids of every order placed against this position, in insertion order.
    /// Orders are never deleted; terminal orders stay here for history.
    pub order_ids: Vec<OrderId>,
    pub size: i64,
    /// Strategy-opaque payload; the broker never inspects it.
    pub data: serde_json::Value,
    /// First close reason wins; later close calls never overwrite it.
    pub close_reason: Option<String>,
    pub is_closing: bool,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl Position {
    pub fn new(symbol: String, opened_at: DateTime<Utc>) -> Self {
        Self {
            symbol,
            order_ids: Vec::new(),
            size: 0,
            data: serde_json::Value::Null,
            close_reason: None,
            is_closing: false,
            opened_at,
            closed_at: None,
        }
    }

    pub fn is_long(&self) -> bool {
        self.size > 0
    }

    pub fn is_short(&self) -> bool {
        self.size < 0
    }

    pub fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }

    /// Record a close reason, keeping the first one ever supplied.
    pub fn record_close_reason(&mut self, reason: Option<&str>) {
        if self.close_reason.is_none() {
            self.close_reason = reason.map(str::to_string);
        }
    }
}
