//! A full trading-day flow: pre-market extrema arm a breakout entry, a
//! trailing stop child protects it, and the books settle deterministically.

use ticklab_core::broker::OrderRequest;
use ticklab_core::config::SimConfig;
use ticklab_core::domain::{
    BarPeriod, OrderAction, OrderState, SessionHours, Tick, TickKind,
};
use ticklab_core::engine::Simulation;
use ticklab_core::strategy::{BrokerHandle, Strategy};
use ticklab_core::tracker::Tracker;

const SYMBOL: &str = "QQQQ";

// 1970-01-01 session: pre-market 04:00, open 09:30, close 16:00 UTC.
fn hours() -> SessionHours {
    SessionHours {
        premarket_open: 4 * 3600,
        open: 9 * 3600 + 1800,
        close: 16 * 3600,
    }
}

fn tick(time: i64, index: u32, kind: TickKind, size: i64, value: f64) -> Tick {
    Tick {
        time,
        index,
        symbol: SYMBOL.into(),
        kind,
        size,
        value,
    }
}

/// The day's tick tape: two pre-market trades topping out at 2.0, then an
/// in-session breakout through that high, a run-up, and a pullback that
/// trips the trailing stop.
fn tape() -> Vec<Tick> {
    let open = hours().open;
    vec![
        tick(15_000, 0, TickKind::Trade, 100, 1.9),
        tick(15_060, 0, TickKind::Trade, 50, 2.0),
        // Open: first in-session trade below the pre-market high.
        tick(open, 0, TickKind::Ask, 0, 2.05),
        tick(open, 1, TickKind::Bid, 0, 1.95),
        tick(open, 2, TickKind::Trade, 200, 1.98),
        // Breakout trade above the 2.0 pre-market high arms the entry.
        tick(open + 60, 0, TickKind::Ask, 0, 2.15),
        tick(open + 60, 1, TickKind::Bid, 0, 2.05),
        tick(open + 60, 2, TickKind::Trade, 300, 2.1),
        // Entry fills here at the ask; the trailing child then seeds off
        // the bid.
        tick(open + 120, 0, TickKind::Ask, 0, 2.2),
        tick(open + 120, 1, TickKind::Bid, 0, 2.1),
        // Run-up: the watermark follows the rising bid.
        tick(open + 180, 0, TickKind::Ask, 0, 2.45),
        tick(open + 180, 1, TickKind::Bid, 0, 2.4),
        tick(open + 240, 0, TickKind::Ask, 0, 2.55),
        tick(open + 240, 1, TickKind::Bid, 0, 2.5),
        // Pullback below watermark − offset trips the stop at the live bid.
        tick(open + 300, 0, TickKind::Ask, 0, 2.35),
        tick(open + 300, 1, TickKind::Bid, 0, 2.28),
        tick(open + 360, 0, TickKind::Trade, 150, 2.3),
    ]
}

/// Buys the pre-market-high breakout once, protected by a trailing stop.
struct BreakoutTrader {
    entered: bool,
}

impl BreakoutTrader {
    fn new() -> Self {
        Self { entered: false }
    }
}

impl Strategy for BreakoutTrader {
    fn is_setup(&self, tracker: &Tracker) -> bool {
        tracker
            .premarket_high
            .is_some_and(|high| tracker.last > high)
    }

    fn on_tick(&mut self, _tick: &Tick, tracker: &Tracker, broker: &mut BrokerHandle<'_>) {
        if self.entered || !self.is_setup(tracker) {
            return;
        }
        self.entered = true;
        let entry = broker.place_order(OrderRequest::market(SYMBOL, OrderAction::Buy, 100));
        broker.place_order(
            OrderRequest::trailing_stop(SYMBOL, OrderAction::Sell, 100, 0.2).with_parent(entry),
        );
    }
}

#[test]
fn breakout_entry_rides_the_trend_and_stops_out() {
    let sim = Simulation::new(
        SimConfig::default(),
        hours(),
        SYMBOL,
        tape(),
        Box::new(BreakoutTrader::new()),
    )
    .unwrap();
    let result = sim.run();

    assert_eq!(result.orders.len(), 2);
    let entry = &result.orders[0];
    let stop = &result.orders[1];

    assert_eq!(entry.action, OrderAction::Buy);
    assert_eq!(entry.state, OrderState::Filled);
    assert_eq!(entry.avg_fill_price(), Some(2.2));

    assert_eq!(stop.parent_id, Some(entry.id));
    assert_eq!(stop.state, OrderState::Filled);
    assert_eq!(stop.avg_fill_price(), Some(2.28));
    assert!(entry.filled_at <= stop.filled_at);

    // Watermark peaked at bid 2.5; the 2.28 bid is the first one at or
    // below 2.5 − 0.2, and the fill realizes (2.28 − 2.20) × 100.
    let realized: f64 = stop
        .executions
        .values()
        .filter_map(|e| e.realized_pnl)
        .sum();
    assert!((realized - 8.0).abs() < 1e-9, "realized {realized}");

    // The stop flattened the position; nothing closed it explicitly.
    assert_eq!(result.positions.len(), 1);
    let position = &result.positions[0];
    assert!(position.is_closed());
    assert_eq!(position.size, 0);
    assert_eq!(position.close_reason, None);
    assert!(!position.is_closing);
}

#[test]
fn the_tape_builds_session_state_and_bars() {
    // Replay the same tape straight into a tracker: the simulation's view
    // of pre-market and session fields is exactly this.
    let mut tracker = Tracker::new(SYMBOL);
    let h = hours();
    for t in tape() {
        tracker.update(&t, &h);
    }

    assert_eq!(tracker.premarket_high, Some(2.0));
    assert_eq!(tracker.premarket_low, Some(1.9));
    assert_eq!(tracker.premarket_volume, 150);
    assert_eq!(tracker.open, Some(1.98));
    assert_eq!(tracker.high, Some(2.3));
    assert_eq!(tracker.low, Some(1.98));
    assert_eq!(tracker.last, 2.3);
    assert_eq!(tracker.volume, 800);

    // Five trades, each in its own minute bucket.
    assert_eq!(tracker.bars(BarPeriod::M1).bars().len(), 5);
    // Pre-market trades share one 5-minute bucket; 9:30/9:31 share another.
    assert_eq!(tracker.bars(BarPeriod::M5).bars().len(), 3);
    assert_eq!(tracker.bars(BarPeriod::Daily).bars().len(), 1);
    let daily = tracker.bars(BarPeriod::Daily).last().unwrap();
    assert_eq!(daily.time, "1970-01-01");
    assert_eq!(daily.open, 1.9);
    assert_eq!(daily.high, 2.3);
    assert_eq!(daily.low, 1.9);
    assert_eq!(daily.close, 2.3);
    assert_eq!(daily.volume, 800);
}
