//! Analysis modules.
//!
//! Derived metrics over the trend series returned by the analysis service.

pub mod aggregator;

pub use aggregator::*;
