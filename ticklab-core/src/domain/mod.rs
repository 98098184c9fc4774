//! Domain types for the simulation core.

pub mod bar;
pub mod order;
pub mod position;
pub mod session;
pub mod tick;

pub use bar::{Bar, BarPeriod, MinuteBar};
pub use order::{Execution, Order, OrderAction, OrderId, OrderKind, OrderState};
pub use position::Position;
pub use session::{market_state, MarketState, SessionHours};
pub use tick::{Tick, TickKind};

/// Symbol type alias
pub type Symbol = String;
