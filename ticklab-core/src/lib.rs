//! TickLab Core — deterministic tick-driven backtest engine.
//!
//! This crate contains the heart of the simulation:
//! - Domain types (ticks, bars, orders, positions, session boundaries)
//! - Tick tracker: rolling quote/session snapshot + m1/m5/daily bars
//! - Simulated broker: order lifecycle state machine, fill evaluation,
//!   position bookkeeping with commission-aware realized PnL
//! - Sequential market driver with injected simulated clock
//! - Strategy trait and restricted broker facade
//! - Run fingerprinting for reproducibility checks

pub mod broker;
pub mod config;
pub mod domain;
pub mod engine;
pub mod fingerprint;
pub mod strategy;
pub mod tracker;
