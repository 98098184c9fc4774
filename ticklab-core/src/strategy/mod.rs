//! Strategy interface and the restricted broker facade.
//!
//! Strategies are plugged in as trait objects rather than loaded
//! dynamically by name: the driving loop invokes `on_tick` once per
//! primary-symbol tick with read access to the tracker snapshot and a
//! facade over the broker. Strategies never mutate tracker or broker state
//! directly.

use crate::broker::{Broker, OrderRequest};
use crate::domain::{OrderId, Symbol, Tick};
use crate::tracker::Tracker;

/// Restricted broker facade handed to strategies.
///
/// Exposes order placement, cancellation, and position queries — nothing
/// that would let a strategy reach into the books.
pub struct BrokerHandle<'a> {
    broker: &'a mut Broker,
}

impl<'a> BrokerHandle<'a> {
    pub fn new(broker: &'a mut Broker) -> Self {
        Self { broker }
    }

    pub fn place_order(&mut self, request: OrderRequest) -> OrderId {
        self.broker.place_order(request)
    }

    pub fn has_open_orders(&self, symbol: &str) -> bool {
        self.broker.has_open_orders(symbol)
    }

    pub fn position_size(&self, symbol: &str) -> i64 {
        self.broker.position_size(symbol)
    }

    pub fn close_position(&mut self, symbol: &str, reason: Option<&str>) {
        self.broker.close_position(symbol, reason)
    }

    pub fn close_order(&mut self, id: OrderId) {
        self.broker.close_order(id)
    }
}

/// A trading strategy driven tick by tick.
pub trait Strategy {
    /// Called once before the first tick, with the primary symbol.
    fn init(&mut self, _primary: &str) {}

    /// Additional symbols whose ticks the simulation should track beyond
    /// the primary (e.g. an index the strategy reads for context).
    fn extra_symbols(&self) -> Vec<Symbol> {
        Vec::new()
    }

    /// Optional pre-trade gate: scanners use this to report whether the
    /// setup condition currently holds.
    fn is_setup(&self, _tracker: &Tracker) -> bool {
        true
    }

    /// Invoked once per primary-symbol tick, after the tracker and broker
    /// have both processed it.
    fn on_tick(&mut self, tick: &Tick, tracker: &Tracker, broker: &mut BrokerHandle<'_>);
}

/// Inert strategy: observes every tick and never trades. Useful as a
/// baseline in tests and benches.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStrategy;

impl Strategy for NullStrategy {
    fn on_tick(&mut self, _tick: &Tick, _tracker: &Tracker, _broker: &mut BrokerHandle<'_>) {}
}
