//! Replay determinism and conservation properties.
//!
//! The core contract: replaying the same tick sequence against fresh state
//! reproduces byte-identical order/fill/position output. These tests drive
//! the full loop with a trading strategy over synthetic streams and check
//! the invariants from the outside: identical fingerprints, size
//! conservation, and parent/child ordering.

use std::collections::HashMap;

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use ticklab_core::broker::OrderRequest;
use ticklab_core::config::SimConfig;
use ticklab_core::domain::{
    Order, OrderAction, OrderId, OrderState, SessionHours, Tick, TickKind,
};
use ticklab_core::engine::{RunResult, Simulation};
use ticklab_core::strategy::{BrokerHandle, Strategy};
use ticklab_core::tracker::Tracker;

const SYMBOL: &str = "ZZZZ";

fn hours() -> SessionHours {
    SessionHours {
        premarket_open: 0,
        open: 0,
        close: i64::MAX,
    }
}

/// Random-walk quote/trade stream with a seeded generator, so every seed
/// names one exact stream.
fn synthetic_ticks(seed: u64, len: usize) -> Vec<Tick> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut price: f64 = 100.0;
    let mut ticks = Vec::with_capacity(len * 3);
    for i in 0..len {
        let time = 1_000 + i as i64;
        price = (price + rng.gen_range(-0.5..0.5)).max(1.0);
        ticks.push(Tick {
            time,
            index: 0,
            symbol: SYMBOL.into(),
            kind: TickKind::Ask,
            size: 0,
            value: price + 0.05,
        });
        ticks.push(Tick {
            time,
            index: 1,
            symbol: SYMBOL.into(),
            kind: TickKind::Bid,
            size: 0,
            value: price - 0.05,
        });
        ticks.push(Tick {
            time,
            index: 2,
            symbol: SYMBOL.into(),
            kind: TickKind::Trade,
            size: rng.gen_range(1..500),
            value: price,
        });
    }
    ticks
}

/// Deterministic trading strategy: enters periodically with a trailing
/// stop attached, exits half a cycle later if still in.
struct PulseTrader {
    interval: usize,
    count: usize,
}

impl PulseTrader {
    fn new(interval: usize) -> Self {
        Self { interval, count: 0 }
    }
}

impl Strategy for PulseTrader {
    fn on_tick(&mut self, tick: &Tick, _tracker: &Tracker, broker: &mut BrokerHandle<'_>) {
        if tick.kind != TickKind::Trade {
            return;
        }
        self.count += 1;
        let phase = self.count % self.interval;
        let flat = broker.position_size(SYMBOL) == 0;
        if phase == 0 && flat && !broker.has_open_orders(SYMBOL) {
            let entry = broker.place_order(OrderRequest::market(SYMBOL, OrderAction::Buy, 100));
            broker.place_order(
                OrderRequest::trailing_stop(SYMBOL, OrderAction::Sell, 100, 0.5)
                    .with_parent(entry),
            );
        } else if phase == self.interval / 2 && !flat {
            broker.close_position(SYMBOL, Some("pulse exit"));
        }
    }
}

fn run_once(seed: u64, len: usize) -> RunResult {
    let config = SimConfig {
        commission_per_order: 1.0,
        ..SimConfig::default()
    };
    Simulation::new(
        config,
        hours(),
        SYMBOL,
        synthetic_ticks(seed, len),
        Box::new(PulseTrader::new(10)),
    )
    .expect("synthetic batch is non-empty")
    .run()
}

fn orders_by_id(result: &RunResult) -> HashMap<OrderId, &Order> {
    result.orders.iter().map(|o| (o.id, o)).collect()
}

// ── Golden determinism run ─────────────────────────────────────────────

#[test]
fn replaying_a_fixed_stream_reproduces_the_books() {
    let a = run_once(42, 400);
    let b = run_once(42, 400);

    assert_eq!(a.fingerprint, b.fingerprint);
    assert_eq!(
        serde_json::to_string(&a.orders).unwrap(),
        serde_json::to_string(&b.orders).unwrap()
    );
    assert_eq!(
        serde_json::to_string(&a.positions).unwrap(),
        serde_json::to_string(&b.positions).unwrap()
    );
    // The strategy actually traded; an empty run proves nothing.
    assert!(a.orders.iter().any(|o| o.state == OrderState::Filled));
}

// ── Properties ─────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn two_runs_always_agree(seed in any::<u64>(), len in 50usize..250) {
        let a = run_once(seed, len);
        let b = run_once(seed, len);
        prop_assert_eq!(a.fingerprint, b.fingerprint);
    }

    #[test]
    fn position_size_is_the_signed_sum_of_fills(seed in any::<u64>(), len in 50usize..250) {
        let result = run_once(seed, len);
        let orders = orders_by_id(&result);

        for position in &result.positions {
            let signed: i64 = position
                .order_ids
                .iter()
                .map(|id| {
                    let order = orders[id];
                    order.action.sign() * order.filled_shares()
                })
                .sum();
            prop_assert_eq!(position.size, signed);
            if position.is_closed() {
                prop_assert_eq!(position.size, 0);
            }
        }
    }

    #[test]
    fn children_never_fill_before_their_parent(seed in any::<u64>(), len in 50usize..250) {
        let result = run_once(seed, len);
        let orders = orders_by_id(&result);

        for order in &result.orders {
            let Some(parent_id) = order.parent_id else { continue };
            let parent = orders[&parent_id];
            match order.state {
                OrderState::Filled => {
                    // A filled child requires a parent filled no later.
                    prop_assert_eq!(parent.state, OrderState::Filled);
                    prop_assert!(parent.filled_at <= order.filled_at);
                }
                OrderState::Accepted => {
                    // Still dormant: the parent cannot have filled.
                    prop_assert!(parent.state != OrderState::Filled);
                }
                _ => {}
            }
        }
    }

    #[test]
    fn filled_orders_fill_completely(seed in any::<u64>(), len in 50usize..250) {
        let result = run_once(seed, len);
        for order in &result.orders {
            match order.state {
                OrderState::Filled => {
                    prop_assert_eq!(order.remaining_shares(), 0);
                    prop_assert!(order.filled_at.is_some());
                }
                _ => prop_assert!(order.executions.is_empty()),
            }
        }
    }
}
