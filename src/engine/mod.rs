//! DIP metrics engine.
//!
//! The engine is a small set of pure functions: validate a `CostInputs`, then
//! derive a `DipMetrics`. Everything else in the crate (catalogs, reports,
//! TUI) only feeds inputs in or renders outputs.

pub mod metrics;

pub use metrics::*;
