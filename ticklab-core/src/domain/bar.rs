//! Bar — OHLCV aggregate over a fixed time bucket.

use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Tracked bar resolutions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BarPeriod {
    M1,
    M5,
    Daily,
}

impl BarPeriod {
    /// Bucket length in seconds. Daily buckets snap to start-of-day (UTC),
    /// which integer division by 86_400 also yields.
    pub fn seconds(&self) -> i64 {
        match self {
            BarPeriod::M1 => 60,
            BarPeriod::M5 => 300,
            BarPeriod::Daily => 86_400,
        }
    }

    /// Start of the bucket containing `time` (unix seconds).
    pub fn bucket_start(&self, time: i64) -> i64 {
        time - time.rem_euclid(self.seconds())
    }

    /// Human-readable bucket label: minute resolution for intraday periods,
    /// date only for daily.
    pub fn label(&self, bucket_start: i64) -> String {
        let dt = Utc
            .timestamp_opt(bucket_start, 0)
            .single()
            .unwrap_or_default();
        match self {
            BarPeriod::M1 | BarPeriod::M5 => dt.format("%Y-%m-%d %H:%M").to_string(),
            BarPeriod::Daily => dt.format("%Y-%m-%d").to_string(),
        }
    }
}

/// One OHLCV bar. `time` is the formatted bucket label; only the most recent
/// bar of a series is ever mutated (until its bucket closes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub time: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// A pre-aggregated minute bar from an external source, fed to the tracker
/// in place of raw ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinuteBar {
    /// Unix timestamp (seconds) of the minute this bar covers.
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}
