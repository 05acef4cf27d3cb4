//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - case inputs and derived metrics (`CostInputs`, `DipMetrics`)
//! - input metadata used for validation and forms (`InputField`)
//! - small configuration enums (`InsurancePool`, `CatalogKind`)

pub mod types;

pub use types::*;
