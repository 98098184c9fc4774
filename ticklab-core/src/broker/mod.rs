//! Broker — order lifecycle, fill simulation, and position bookkeeping.
//!
//! The broker is the state machine at the heart of the simulation. It
//! accepts order placement requests, evaluates open orders against the
//! tracker's quote snapshot on every tick, and maintains positions with
//! commission-aware realized PnL.
//!
//! Order state machine: `Pending → Filled`, `Pending → Cancelled`,
//! `Accepted → Pending` (on parent fill), `Accepted → Cancelled` (parent
//! cancelled or position closed first). `Filled`/`Cancelled` are terminal.
//!
//! The broker never throws during normal simulation: unknown order ids,
//! double closes, and fills against an unset quote all degrade to no-ops
//! or skip-fill, because the driving loop must never abort mid-stream on
//! one bad tick.

mod clock;
mod fills;

pub use clock::MarketClock;

use crate::domain::{
    Execution, Order, OrderAction, OrderId, OrderKind, OrderState, Position, Symbol,
};
use crate::tracker::Tracker;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// An order placement request. No validation beyond structural shape: a
/// zero or negative share count is accepted and simply never fills.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub symbol: Symbol,
    pub action: OrderAction,
    pub kind: OrderKind,
    pub shares: i64,
    pub parent_id: Option<OrderId>,
}

impl OrderRequest {
    pub fn market(symbol: impl Into<Symbol>, action: OrderAction, shares: i64) -> Self {
        Self {
            symbol: symbol.into(),
            action,
            kind: OrderKind::Market,
            shares,
            parent_id: None,
        }
    }

    pub fn limit(symbol: impl Into<Symbol>, action: OrderAction, shares: i64, limit: f64) -> Self {
        Self {
            symbol: symbol.into(),
            action,
            kind: OrderKind::Limit { limit },
            shares,
            parent_id: None,
        }
    }

    pub fn stop(symbol: impl Into<Symbol>, action: OrderAction, shares: i64, stop: f64) -> Self {
        Self {
            symbol: symbol.into(),
            action,
            kind: OrderKind::Stop { stop },
            shares,
            parent_id: None,
        }
    }

    pub fn trailing_stop(
        symbol: impl Into<Symbol>,
        action: OrderAction,
        shares: i64,
        offset: f64,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            action,
            kind: OrderKind::TrailingStop {
                offset,
                watermark: None,
            },
            shares,
            parent_id: None,
        }
    }

    /// Make this order contingent on a parent: it stays `Accepted` and is
    /// excluded from fill evaluation until the parent fills.
    pub fn with_parent(mut self, parent: OrderId) -> Self {
        self.parent_id = Some(parent);
        self
    }
}

/// Simulated brokerage: order and position books for one simulation run.
///
/// Exclusive ownership per run — one broker per simulation instance,
/// mutated in place tick by tick, no concurrent readers.
#[derive(Debug)]
pub struct Broker {
    clock: MarketClock,
    commission_per_order: f64,
    order_execution_delay_ms: i64,
    next_order_id: u64,
    next_execution_id: u64,
    /// All orders ever placed, keyed by id. Ids are monotonic, so value
    /// iteration is insertion order.
    orders: BTreeMap<OrderId, Order>,
    /// Pending orders eligible for fill evaluation.
    open_orders: BTreeSet<OrderId>,
    /// Every position ever opened, completed and open alike.
    positions: Vec<Position>,
    /// At most one open position per symbol, by index into `positions`.
    open_positions: HashMap<Symbol, usize>,
    /// Owning position of each order, by index into `positions`.
    order_position: HashMap<OrderId, usize>,
}

impl Broker {
    pub fn new(clock: MarketClock, commission_per_order: f64, order_execution_delay_ms: i64) -> Self {
        Self {
            clock,
            commission_per_order,
            order_execution_delay_ms,
            next_order_id: 1,
            next_execution_id: 1,
            orders: BTreeMap::new(),
            open_orders: BTreeSet::new(),
            positions: Vec::new(),
            open_positions: HashMap::new(),
            order_position: HashMap::new(),
        }
    }

    // ── Order placement ────────────────────────────────────────────────

    /// Place an order. Assigns the next monotonic id, timestamps it from
    /// the injected clock, and appends it to the symbol's open position
    /// (creating one if the symbol has none).
    pub fn place_order(&mut self, request: OrderRequest) -> OrderId {
        let id = OrderId(self.next_order_id);
        self.next_order_id += 1;

        let state = if request.parent_id.is_some() {
            OrderState::Accepted
        } else {
            OrderState::Pending
        };
        let now = self.clock.now();

        let order = Order {
            id,
            parent_id: request.parent_id,
            symbol: request.symbol.clone(),
            action: request.action,
            kind: request.kind,
            shares: request.shares,
            state,
            opened_at: now,
            filled_at: None,
            executions: BTreeMap::new(),
        };

        let position_index = match self.open_positions.get(&request.symbol) {
            Some(&index) => index,
            None => {
                let index = self.positions.len();
                self.positions
                    .push(Position::new(request.symbol.clone(), now));
                self.open_positions.insert(request.symbol.clone(), index);
                index
            }
        };
        self.positions[position_index].order_ids.push(id);
        self.order_position.insert(id, position_index);

        if state == OrderState::Pending {
            self.open_orders.insert(id);
        }

        debug!(
            order = %id,
            symbol = %request.symbol,
            action = ?request.action,
            shares = request.shares,
            ?state,
            "order placed"
        );
        self.orders.insert(id, order);
        id
    }

    // ── Tick handling ──────────────────────────────────────────────────

    /// Evaluate every open order on `symbol` against the current tracker
    /// snapshot. Orders placed or activated during this call are first
    /// evaluated on the next tick.
    pub fn handle_tick(&mut self, symbol: &str, tracker: &Tracker) {
        let now_ms = self.clock.unix_millis();
        let candidates: Vec<OrderId> = self
            .open_orders
            .iter()
            .copied()
            .filter(|id| self.orders[id].symbol == symbol)
            .collect();

        for id in candidates {
            let Some(order) = self.orders.get_mut(&id) else {
                continue;
            };
            if order.state != OrderState::Pending {
                continue;
            }
            // Minimum dwell before fill eligibility, in simulated time.
            if now_ms - order.opened_at.timestamp_millis() < self.order_execution_delay_ms {
                continue;
            }
            if let Some(price) = fills::evaluate(order, tracker) {
                self.fill_order(id, price);
            }
        }
    }

    /// Execute a fill: record the execution (commission and, when the fill
    /// reduces an opposing position, realized PnL), transition the order to
    /// `Filled`, activate its children, and settle the owning position.
    fn fill_order(&mut self, id: OrderId, price: f64) {
        let now = self.clock.now();
        let position_index = self.order_position[&id];

        let (shares, signed, symbol) = {
            let order = &self.orders[&id];
            (
                order.remaining_shares(),
                order.action.sign() * order.remaining_shares(),
                order.symbol.clone(),
            )
        };

        // Realized PnL when this fill closes or reduces opposing exposure.
        let realized_pnl = {
            let position = &self.positions[position_index];
            let direction = position.size.signum();
            if direction != 0 && direction != signed.signum() {
                let closed = position.size.abs().min(shares);
                self.entry_avg_price(position, direction)
                    .map(|entry| (price - entry) * closed as f64 * direction as f64)
            } else {
                None
            }
        };

        let execution_id = self.next_execution_id;
        self.next_execution_id += 1;

        let order = self
            .orders
            .get_mut(&id)
            .expect("filled order exists in the book");
        order.executions.insert(
            execution_id,
            Execution {
                shares,
                price,
                commission: self.commission_per_order,
                realized_pnl,
            },
        );
        order.state = OrderState::Filled;
        order.filled_at = Some(now);
        self.open_orders.remove(&id);

        debug!(
            order = %id,
            symbol = %symbol,
            shares,
            price,
            realized_pnl,
            "order filled"
        );

        // Parent fill activates contingent children.
        let children: Vec<OrderId> = self
            .orders
            .values()
            .filter(|o| o.parent_id == Some(id) && o.state == OrderState::Accepted)
            .map(|o| o.id)
            .collect();
        for child in children {
            if let Some(order) = self.orders.get_mut(&child) {
                order.state = OrderState::Pending;
                self.open_orders.insert(child);
                debug!(order = %child, parent = %id, "child order activated");
            }
        }

        // Settle the owning position.
        let position = &mut self.positions[position_index];
        position.size += signed;
        if position.size == 0 && !position.is_closed() {
            position.closed_at = Some(now);
            self.open_positions.remove(&symbol);
            debug!(
                symbol = %symbol,
                reason = position.close_reason.as_deref(),
                "position closed"
            );
        }
    }

    /// Share-weighted average price of the position's entry-side
    /// executions (those matching the position's direction).
    fn entry_avg_price(&self, position: &Position, direction: i64) -> Option<f64> {
        let mut shares = 0i64;
        let mut notional = 0.0f64;
        for order_id in &position.order_ids {
            let order = &self.orders[order_id];
            if order.action.sign() != direction {
                continue;
            }
            for execution in order.executions.values() {
                shares += execution.shares;
                notional += execution.price * execution.shares as f64;
            }
        }
        (shares != 0).then(|| notional / shares as f64)
    }

    // ── Cancellation and closing ───────────────────────────────────────

    /// Cancel a single order if it is still open. Unknown or terminal ids
    /// are a no-op. Cancelling a parent cascades to its open children.
    pub fn close_order(&mut self, id: OrderId) {
        let Some(order) = self.orders.get_mut(&id) else {
            return;
        };
        if order.state.is_terminal() {
            return;
        }
        order.state = OrderState::Cancelled;
        self.open_orders.remove(&id);
        debug!(order = %id, "order cancelled");

        let children: Vec<OrderId> = self
            .orders
            .values()
            .filter(|o| o.parent_id == Some(id) && !o.state.is_terminal())
            .map(|o| o.id)
            .collect();
        for child in children {
            self.close_order(child);
        }
    }

    /// Cancel every open order across all symbols.
    pub fn close_open_orders(&mut self) {
        let open: Vec<OrderId> = self
            .orders
            .values()
            .filter(|o| o.is_open())
            .map(|o| o.id)
            .collect();
        for id in open {
            self.close_order(id);
        }
    }

    /// Close the symbol's open position: cancel its open orders, then
    /// flatten the remaining size with an offsetting market order. Safe
    /// no-op on unknown symbols and already-closing positions; the close
    /// reason recorded is the one from the first call.
    pub fn close_position(&mut self, symbol: &str, reason: Option<&str>) {
        let Some(&index) = self.open_positions.get(symbol) else {
            return;
        };
        {
            let position = &mut self.positions[index];
            if position.is_closing {
                return;
            }
            position.record_close_reason(reason);
            position.is_closing = true;
        }
        debug!(symbol = %symbol, reason, "closing position");

        let open: Vec<OrderId> = self
            .orders
            .values()
            .filter(|o| o.symbol == symbol && o.is_open())
            .map(|o| o.id)
            .collect();
        for id in open {
            self.close_order(id);
        }

        let size = self.positions[index].size;
        if size == 0 {
            // Nothing to flatten: the position never filled, or is already
            // flat. Close it directly.
            let now = self.clock.now();
            let position = &mut self.positions[index];
            position.closed_at = Some(now);
            self.open_positions.remove(symbol);
            debug!(symbol = %symbol, "flat position closed");
            return;
        }

        let action = if size > 0 {
            OrderAction::Sell
        } else {
            OrderAction::Buy
        };
        self.place_order(OrderRequest::market(symbol, action, size.abs()));
    }

    // ── Read accessors ─────────────────────────────────────────────────

    /// Whether any open (non-terminal) order exists for the symbol.
    pub fn has_open_orders(&self, symbol: &str) -> bool {
        self.orders
            .values()
            .any(|o| o.symbol == symbol && o.is_open())
    }

    pub fn has_open_position(&self, symbol: &str) -> bool {
        self.open_positions.contains_key(symbol)
    }

    /// Signed size of the symbol's open position; zero when none is open.
    pub fn position_size(&self, symbol: &str) -> i64 {
        self.open_positions
            .get(symbol)
            .map(|&index| self.positions[index].size)
            .unwrap_or(0)
    }

    /// The symbol's open position. Unknown symbols yield `None`, never an
    /// error.
    pub fn open_position(&self, symbol: &str) -> Option<&Position> {
        self.open_positions
            .get(symbol)
            .map(|&index| &self.positions[index])
    }

    /// Strategy-opaque payload slot on the symbol's open position.
    pub fn position_data_mut(&mut self, symbol: &str) -> Option<&mut serde_json::Value> {
        self.open_positions
            .get(symbol)
            .map(|&index| &mut self.positions[index].data)
    }

    pub fn order(&self, id: OrderId) -> Option<&Order> {
        self.orders.get(&id)
    }

    /// All orders across symbols, in insertion order.
    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    /// All positions, completed and open, in insertion order.
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Consume the broker and take the order/position books.
    pub fn into_books(self) -> (Vec<Order>, Vec<Position>) {
        (self.orders.into_values().collect(), self.positions)
    }
}
