//! Run fingerprinting for reproducibility.
//!
//! Determinism is the core contract: replaying the same tick sequence
//! against the same configuration must reproduce identical order and
//! position output. The fingerprint makes that checkable as a single hash
//! comparison — it digests the canonical JSON of the config, every tick as
//! it streams through, and finally the completed books.

use crate::config::SimConfig;
use crate::domain::{Order, Position, Tick};

/// Incremental BLAKE3 digest over a simulation run.
#[derive(Debug, Clone)]
pub struct RunFingerprint {
    hasher: blake3::Hasher,
}

impl RunFingerprint {
    pub fn new(config: &SimConfig) -> Self {
        let mut hasher = blake3::Hasher::new();
        // Struct field order is stable, so serde_json output is canonical.
        let canonical =
            serde_json::to_vec(config).expect("config serialization cannot fail");
        hasher.update(&canonical);
        Self { hasher }
    }

    /// Digest one tick in stream order.
    pub fn absorb_tick(&mut self, tick: &Tick) {
        let bytes = serde_json::to_vec(tick).expect("tick serialization cannot fail");
        self.hasher.update(&bytes);
    }

    /// Digest the completed books and produce the final hex digest.
    pub fn finish(mut self, orders: &[Order], positions: &[Position]) -> String {
        let orders_bytes =
            serde_json::to_vec(orders).expect("order serialization cannot fail");
        let positions_bytes =
            serde_json::to_vec(positions).expect("position serialization cannot fail");
        self.hasher.update(&orders_bytes);
        self.hasher.update(&positions_bytes);
        self.hasher.finalize().to_hex().to_string()
    }
}
