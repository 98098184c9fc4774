//! Tracker — rolling market state for one symbol.
//!
//! Converts a sequential tick stream into (a) an instantaneous snapshot
//! (bid/ask/last, session open/high/low/volume, pre-market extrema) and
//! (b) m1/m5/daily OHLCV bars. Pure state update: the tracker knows nothing
//! about orders, and each tracker is owned by exactly one simulation
//! context, mutated in place tick by tick.

mod series;

pub use series::BarSeries;

use crate::domain::{BarPeriod, MinuteBar, SessionHours, Tick, TickKind};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Default cap on retained bars per period.
pub const DEFAULT_MAX_BARS: usize = 250;

/// Rolling market state for one symbol.
///
/// `bid`/`ask`/`last` are zero until the first matching tick arrives; the
/// broker treats a zero quote side as "no quote yet" and skips fills against
/// it. Session and pre-market fields are `None` until seeded by the first
/// qualifying trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tracker {
    pub symbol: String,
    pub bid: f64,
    pub ask: f64,
    pub last: f64,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub volume: i64,
    pub premarket_high: Option<f64>,
    pub premarket_low: Option<f64>,
    pub premarket_volume: i64,
    m1: BarSeries,
    m5: BarSeries,
    daily: BarSeries,
}

impl Tracker {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self::with_max_bars(symbol, DEFAULT_MAX_BARS)
    }

    pub fn with_max_bars(symbol: impl Into<String>, max_bars: usize) -> Self {
        Self {
            symbol: symbol.into(),
            bid: 0.0,
            ask: 0.0,
            last: 0.0,
            open: None,
            high: None,
            low: None,
            volume: 0,
            premarket_high: None,
            premarket_low: None,
            premarket_volume: 0,
            m1: BarSeries::new(BarPeriod::M1, max_bars),
            m5: BarSeries::new(BarPeriod::M5, max_bars),
            daily: BarSeries::new(BarPeriod::Daily, max_bars),
        }
    }

    pub fn bars(&self, period: BarPeriod) -> &BarSeries {
        match period {
            BarPeriod::M1 => &self.m1,
            BarPeriod::M5 => &self.m5,
            BarPeriod::Daily => &self.daily,
        }
    }

    /// Fold one tick into the snapshot and bar series.
    ///
    /// Quote updates apply regardless of session. Trades always update
    /// `last`, `volume`, and the bar series; the session fields they touch
    /// depend on where the tick falls relative to `hours`. Never errors:
    /// degenerate input flows through the matching arm harmlessly.
    pub fn update(&mut self, tick: &Tick, hours: &SessionHours) {
        match tick.kind {
            TickKind::Bid => self.bid = tick.value,
            TickKind::Ask => self.ask = tick.value,
            // Explicit overrides from the feed, independent of the
            // trade-driven extrema below.
            TickKind::High => self.high = Some(tick.value),
            TickKind::Low => self.low = Some(tick.value),
            TickKind::VolumeDelta => self.volume += tick.value as i64,
            TickKind::Trade => self.apply_trade(tick, hours),
        }
        trace!(
            symbol = %self.symbol,
            kind = ?tick.kind,
            value = tick.value,
            "tracker updated"
        );
    }

    /// Secondary entry point: fold a pre-aggregated minute bar into the
    /// m1/m5/daily series in the same extend-or-append manner.
    pub fn apply_minute_bar(&mut self, minute: &MinuteBar) {
        self.m1.apply_minute_bar(minute);
        self.m5.apply_minute_bar(minute);
        self.daily.apply_minute_bar(minute);
        self.last = minute.close;
        self.volume += minute.volume;
    }

    fn apply_trade(&mut self, tick: &Tick, hours: &SessionHours) {
        self.last = tick.value;
        self.volume += tick.size;

        if tick.time < hours.open {
            if tick.time >= hours.premarket_open {
                self.premarket_high = Some(match self.premarket_high {
                    Some(h) => h.max(tick.value),
                    None => tick.value,
                });
                self.premarket_low = Some(match self.premarket_low {
                    Some(l) => l.min(tick.value),
                    None => tick.value,
                });
                self.premarket_volume += tick.size;
            }
        } else if tick.time <= hours.close {
            if self.open.is_none() {
                self.open = Some(tick.value);
            }
            self.high = Some(match self.high {
                Some(h) => h.max(tick.value),
                None => tick.value,
            });
            self.low = Some(match self.low {
                Some(l) => l.min(tick.value),
                None => tick.value,
            });
        }

        self.m1.apply_trade(tick.time, tick.value, tick.size);
        self.m5.apply_trade(tick.time, tick.value, tick.size);
        self.daily.apply_trade(tick.time, tick.value, tick.size);
    }
}
