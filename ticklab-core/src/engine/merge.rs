//! Deterministic merge of multi-source tick streams.

use crate::domain::Tick;

/// Merge several per-source tick streams into one sequence ordered by the
/// composite `(time, index)` key. The sort is stable, so ticks sharing a
/// merge key keep their source-relative order — the property that makes
/// replays byte-identical when trades and quotes come from separate feeds.
pub fn merge_ticks(sources: Vec<Vec<Tick>>) -> Vec<Tick> {
    let mut merged: Vec<Tick> = sources.into_iter().flatten().collect();
    merged.sort_by_key(Tick::merge_key);
    merged
}
