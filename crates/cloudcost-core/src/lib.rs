//! Core types, traits, and utilities for cloudcost
//!
//! This crate provides the foundational types, error handling,
//! credential configuration, and the billing-source boundary used
//! by all other cloudcost crates.

pub mod aggregation_types;
pub mod config;
pub mod error;
pub mod filters;
pub mod provider;
pub mod types;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use error::{CloudcostError, Result};
pub use types::{CostRecord, Dimension, DimensionKey, Granularity, PeriodLabel};
