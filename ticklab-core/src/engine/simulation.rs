//! The market driver: one simulation run over a sequential tick stream.
//!
//! Strictly sequential and single-threaded — each tick is fully processed
//! (clock advance, tracker update, broker tick handling, strategy callback)
//! before the next one is considered. Parallelism belongs to the layer
//! above, which runs independent simulation instances with isolated state.

use crate::broker::{Broker, MarketClock};
use crate::config::SimConfig;
use crate::domain::{Order, Position, SessionHours, Symbol, Tick};
use crate::fingerprint::RunFingerprint;
use crate::strategy::{BrokerHandle, Strategy};
use crate::tracker::Tracker;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SimulationError {
    /// The one precondition failure in the core: a simulation cannot be
    /// initialized without ticks to drive it.
    #[error("no ticks provided")]
    EmptyTickBatch,
}

/// The completed books of a finished run, handed to the caller (and any
/// external store) as plain data.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub orders: Vec<Order>,
    pub positions: Vec<Position>,
    /// Digest of config + tick stream + books; equal runs hash equally.
    pub fingerprint: String,
}

/// One simulation instance: a broker, one tracker per symbol, an injected
/// clock, and a strategy, driven over a fixed tick batch.
pub struct Simulation {
    config: SimConfig,
    hours: SessionHours,
    primary: Symbol,
    clock: MarketClock,
    broker: Broker,
    trackers: HashMap<Symbol, Tracker>,
    strategy: Box<dyn Strategy>,
    ticks: Vec<Tick>,
}

impl Simulation {
    /// Build a simulation over `ticks`, which must be non-empty and in
    /// non-decreasing `(time, index)` order (see `merge_ticks`).
    pub fn new(
        config: SimConfig,
        hours: SessionHours,
        primary: impl Into<Symbol>,
        ticks: Vec<Tick>,
        mut strategy: Box<dyn Strategy>,
    ) -> Result<Self, SimulationError> {
        if ticks.is_empty() {
            return Err(SimulationError::EmptyTickBatch);
        }
        let primary = primary.into();
        strategy.init(&primary);

        let clock = MarketClock::new();
        let broker = Broker::new(
            clock.clone(),
            config.commission_per_order,
            config.order_execution_delay_ms,
        );

        let mut trackers = HashMap::new();
        trackers.insert(
            primary.clone(),
            Tracker::with_max_bars(primary.clone(), config.max_bars),
        );
        for symbol in strategy.extra_symbols() {
            trackers.insert(
                symbol.clone(),
                Tracker::with_max_bars(symbol, config.max_bars),
            );
        }

        Ok(Self {
            config,
            hours,
            primary,
            clock,
            broker,
            trackers,
            strategy,
            ticks,
        })
    }

    pub fn primary(&self) -> &str {
        &self.primary
    }

    pub fn tracker(&self, symbol: &str) -> Option<&Tracker> {
        self.trackers.get(symbol)
    }

    /// Run the batch to completion and return the books.
    pub fn run(mut self) -> RunResult {
        let ticks = std::mem::take(&mut self.ticks);
        let mut fingerprint = RunFingerprint::new(&self.config);
        debug!(
            primary = %self.primary,
            ticks = ticks.len(),
            "simulation starting"
        );

        for tick in &ticks {
            fingerprint.absorb_tick(tick);
            self.clock.advance_to_unix(tick.time);

            let max_bars = self.config.max_bars;
            let tracker = self
                .trackers
                .entry(tick.symbol.clone())
                .or_insert_with(|| Tracker::with_max_bars(tick.symbol.clone(), max_bars));
            tracker.update(tick, &self.hours);
            self.broker.handle_tick(&tick.symbol, tracker);

            if tick.symbol == self.primary {
                let tracker = &self.trackers[&self.primary];
                let mut handle = BrokerHandle::new(&mut self.broker);
                self.strategy.on_tick(tick, tracker, &mut handle);
            }
        }

        let (orders, positions) = self.broker.into_books();
        let fingerprint = fingerprint.finish(&orders, &positions);
        debug!(
            orders = orders.len(),
            positions = positions.len(),
            %fingerprint,
            "simulation finished"
        );
        RunResult {
            orders,
            positions,
            fingerprint,
        }
    }
}
