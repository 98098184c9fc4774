//! Rolling bar series for one period: append-or-extend-last with a bounded
//! ring.

use crate::domain::{Bar, BarPeriod, MinuteBar};
use serde::{Deserialize, Serialize};

/// Time-bucketed bars at one resolution.
///
/// Invariants: the array is append-only except for in-place mutation of the
/// last bar while its bucket is current; interior bars are never touched.
/// Once the configured cap is exceeded the oldest bars are evicted from the
/// front, after insertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarSeries {
    period: BarPeriod,
    bars: Vec<Bar>,
    /// Bucket start of the last bar, kept so a label comparison is never
    /// needed to decide append-vs-extend.
    last_bucket: Option<i64>,
    max_bars: usize,
}

impl BarSeries {
    pub fn new(period: BarPeriod, max_bars: usize) -> Self {
        Self {
            period,
            bars: Vec::new(),
            last_bucket: None,
            max_bars,
        }
    }

    pub fn period(&self) -> BarPeriod {
        self.period
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Fold one trade into the series.
    pub fn apply_trade(&mut self, time: i64, price: f64, size: i64) {
        let bucket = self.period.bucket_start(time);
        if self.last_bucket != Some(bucket) {
            self.bars.push(Bar {
                time: self.period.label(bucket),
                open: price,
                high: price,
                low: price,
                close: price,
                volume: 0,
            });
            self.last_bucket = Some(bucket);
        }
        // The unwrap cannot fail: a bar was just pushed if none existed.
        let bar = self.bars.last_mut().expect("series has a last bar");
        bar.close = price;
        bar.high = bar.high.max(price);
        bar.low = bar.low.min(price);
        bar.volume += size;
        self.evict();
    }

    /// Fold a pre-aggregated minute bar into the series: max/min OHLC
    /// combine, first-open kept, last-close taken, volume summed.
    pub fn apply_minute_bar(&mut self, minute: &MinuteBar) {
        let bucket = self.period.bucket_start(minute.time);
        if self.last_bucket != Some(bucket) {
            self.bars.push(Bar {
                time: self.period.label(bucket),
                open: minute.open,
                high: minute.high,
                low: minute.low,
                close: minute.close,
                volume: minute.volume,
            });
            self.last_bucket = Some(bucket);
        } else {
            let bar = self.bars.last_mut().expect("series has a last bar");
            bar.high = bar.high.max(minute.high);
            bar.low = bar.low.min(minute.low);
            bar.close = minute.close;
            bar.volume += minute.volume;
        }
        self.evict();
    }

    fn evict(&mut self) {
        while self.bars.len() > self.max_bars {
            self.bars.remove(0);
        }
    }
}
