//! Trading-session boundaries and market-state classification.
//!
//! The core has no calendar or timezone knowledge: callers compute the three
//! Unix-second boundaries for the relevant day and pass them into every
//! tracker/broker call that needs session awareness.

use serde::{Deserialize, Serialize};

/// Session boundaries for one calendar day, in Unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionHours {
    /// Pre-market open (e.g. 04:00 local, converted upstream).
    pub premarket_open: i64,
    /// Regular session open.
    pub open: i64,
    /// Regular session close.
    pub close: i64,
}

/// Where a timestamp falls relative to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketState {
    Open,
    PreMarket,
    Closed,
}

/// Classify `time` against the session boundaries. Pure and total: every
/// input maps to exactly one state.
pub fn market_state(time: i64, hours: &SessionHours) -> MarketState {
    if time >= hours.open && time <= hours.close {
        MarketState::Open
    } else if time >= hours.premarket_open && time < hours.open {
        MarketState::PreMarket
    } else {
        MarketState::Closed
    }
}
