//! AWS Cost Explorer billing source for cloudcost
//!
//! This crate implements the `BillingSource` trait on top of the
//! Cost Explorer API, including request construction and pagination.

pub mod cost_explorer;

pub use cost_explorer::CostExplorerSource;
