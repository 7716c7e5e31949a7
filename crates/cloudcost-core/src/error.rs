//! Error types for cloudcost
//!
//! This module defines the error types used throughout the cloudcost library.
//! All errors are derived from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! Every variant is fatal to a run: the report is either produced in full
//! or not at all.
//!
//! # Example
//!
//! ```
//! use cloudcost_core::error::{CloudcostError, Result};
//!
//! fn example_function() -> Result<()> {
//!     // This will automatically convert io::Error to CloudcostError
//!     let _file = std::fs::read_to_string("nonexistent.txt")?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Main error type for cloudcost operations
#[derive(Error, Debug)]
pub enum CloudcostError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Required credential or region setting is missing
    #[error("Configuration error: {0}")]
    Config(String),

    /// The billing service call failed
    #[error("Billing query failed: {0}")]
    Query(String),

    /// The billing service returned data we cannot interpret
    #[error("Malformed billing response: {0}")]
    MalformedResponse(String),

    /// A cost amount could not be read as a number
    #[error("Invalid cost amount '{value}' for {keys} in period {period}")]
    InvalidAmount {
        /// Period the amount belongs to
        period: String,
        /// Grouping keys of the offending group, joined for display
        keys: String,
        /// The raw amount string
        value: String,
    },

    /// No billing periods were returned, so no current period exists
    #[error("No billing periods returned for the requested date range")]
    NoPeriods,

    /// Template loading or rendering failed
    #[error("Template error: {0}")]
    Template(String),

    /// Invalid date format
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenience type alias for Results in cloudcost
pub type Result<T> = std::result::Result<T, CloudcostError>;
