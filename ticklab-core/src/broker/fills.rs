//! Fill evaluation: one exhaustive match over order kind and action.
//!
//! Every order type is evaluated against the tracker's live quote snapshot,
//! never against the raw triggering tick, so all orders see a consistent
//! bid/ask view. A zero quote side means no quote has arrived yet; nothing
//! fills against it.

use crate::domain::{Order, OrderAction, OrderKind};
use crate::tracker::Tracker;

/// Decide whether `order` fills at the current snapshot, returning the fill
/// price. Mutates the trailing watermark as a side effect: the watermark is
/// seeded on the first evaluation after placement and afterwards only ever
/// moves favorably (down for a buy trail, up for a sell trail).
pub(super) fn evaluate(order: &mut Order, tracker: &Tracker) -> Option<f64> {
    // A non-positive share count never matches any fill rule; such orders
    // stay pending until cancelled.
    if order.shares <= 0 {
        return None;
    }

    let bid = tracker.bid;
    let ask = tracker.ask;
    let action = order.action;

    match (&mut order.kind, action) {
        // Market orders fill at the opposing side of the quote.
        (OrderKind::Market, OrderAction::Buy) => quoted(ask),
        (OrderKind::Market, OrderAction::Sell) => quoted(bid),

        // Limit orders fill at-or-better.
        (OrderKind::Limit { limit }, OrderAction::Buy) => {
            quoted(ask).filter(|&p| p <= *limit)
        }
        (OrderKind::Limit { limit }, OrderAction::Sell) => {
            quoted(bid).filter(|&p| p >= *limit)
        }

        // Stop orders fire once the opposing side breaches the stop level.
        (OrderKind::Stop { stop }, OrderAction::Buy) => {
            quoted(ask).filter(|&p| p >= *stop)
        }
        (OrderKind::Stop { stop }, OrderAction::Sell) => {
            quoted(bid).filter(|&p| p <= *stop)
        }

        // Trailing stops: ratchet the watermark favorably, then check the
        // retrace. Fill price is the live quote at trigger time, not
        // watermark ± offset — a gap past the trigger fills at the gap.
        (OrderKind::TrailingStop { offset, watermark }, OrderAction::Buy) => {
            let price = quoted(ask)?;
            let mark = match watermark {
                Some(mark) => {
                    *mark = mark.min(price);
                    *mark
                }
                None => {
                    *watermark = Some(price);
                    price
                }
            };
            (price >= mark + *offset).then_some(price)
        }
        (OrderKind::TrailingStop { offset, watermark }, OrderAction::Sell) => {
            let price = quoted(bid)?;
            let mark = match watermark {
                Some(mark) => {
                    *mark = mark.max(price);
                    *mark
                }
                None => {
                    *watermark = Some(price);
                    price
                }
            };
            (price <= mark - *offset).then_some(price)
        }
    }
}

fn quoted(side: f64) -> Option<f64> {
    (side > 0.0).then_some(side)
}
