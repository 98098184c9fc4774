//! Injected simulated clock.
//!
//! The broker never reads wall-clock time: the driving loop advances this
//! clock to each tick's timestamp before handing the tick over, so
//! "current market time" is always the timestamp of the tick being
//! processed.

use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Shared simulated-time handle. Cloning yields another handle onto the
/// same instant; the driver advances it, the broker only reads.
#[derive(Debug, Clone, Default)]
pub struct MarketClock {
    millis: Arc<AtomicI64>,
}

impl MarketClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current simulated time from a Unix-seconds tick timestamp.
    pub fn advance_to_unix(&self, secs: i64) {
        self.millis.store(secs * 1_000, Ordering::Relaxed);
    }

    pub fn advance_to(&self, time: DateTime<Utc>) {
        self.millis.store(time.timestamp_millis(), Ordering::Relaxed);
    }

    pub fn unix_millis(&self) -> i64 {
        self.millis.load(Ordering::Relaxed)
    }

    /// Current simulated market time.
    pub fn now(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.unix_millis())
            .single()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_same_instant() {
        let clock = MarketClock::new();
        let other = clock.clone();
        clock.advance_to_unix(1_700_000_000);
        assert_eq!(other.unix_millis(), 1_700_000_000_000);
        assert_eq!(other.now().timestamp(), 1_700_000_000);
    }
}
