//! Tick — a single timestamped market event for one symbol.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// What kind of market event a tick carries.
///
/// `Trade` drives last-price, session high/low, volume, and bar building.
/// `Bid`/`Ask` overwrite the quote sides unconditionally. `High`/`Low` are
/// explicit overrides from an upstream feed (independent of trade-driven
/// tracking), and `VolumeDelta` is an absolute volume increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickKind {
    Trade,
    Bid,
    Ask,
    High,
    Low,
    VolumeDelta,
}

/// A single market event. Immutable input: neither the tracker nor the
/// broker holds on to a tick beyond the call that processes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Unix timestamp in seconds.
    pub time: i64,
    /// Source-relative sequence number, used to break timestamp ties.
    pub index: u32,
    pub symbol: String,
    pub kind: TickKind,
    /// Trade size or volume increment; zero for pure quote updates.
    pub size: i64,
    /// Price for Trade/Bid/Ask/High/Low; volume amount for VolumeDelta.
    pub value: f64,
}

impl Tick {
    /// Total order key for merging multi-source streams deterministically:
    /// two ticks sharing a timestamp are ordered by their source index.
    pub fn merge_key(&self) -> i64 {
        self.time * 1_000_000 + self.index as i64
    }

    /// The tick's timestamp as a UTC datetime.
    pub fn date_time(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.time, 0).single().unwrap_or_default()
    }
}
