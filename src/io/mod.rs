//! Input/output helpers.
//!
//! - catalog CSV ingest + validation (`ingest`)
//! - detail-table CSV export (`export`)
//! - result snapshot JSON read/write (`snapshot`)

pub mod export;
pub mod ingest;
pub mod snapshot;

pub use export::*;
pub use snapshot::*;
