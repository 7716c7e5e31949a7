//! cloudcost - Month-over-month AWS cost reports from Cost Explorer data
//!
//! This library provides functionality to:
//! - Flatten grouped billing responses into cost records
//! - Aggregate records per period with previous-period comparison
//! - Assemble the three report tables, dropdowns and forecast into one bundle
//! - Drive the whole query → aggregate → assemble flow against any
//!   [`BillingSource`](cloudcost_core::provider::BillingSource)
//!
//! # Examples
//!
//! ```no_run
//! use cloudcost::pipeline::ReportPipeline;
//! use cloudcost_aws::CostExplorerSource;
//! use cloudcost_core::config::BillingConfig;
//! use cloudcost_render::{HtmlRenderer, OutputFormatter};
//!
//! #[tokio::main]
//! async fn main() -> cloudcost::Result<()> {
//!     let config = BillingConfig::from_env()?;
//!     let source = CostExplorerSource::new(&config).await;
//!
//!     let today = chrono::Utc::now().date_naive();
//!     let bundle = ReportPipeline::new().run(&source, today, today).await?;
//!     let html = HtmlRenderer::embedded().format_report(&bundle)?;
//!     std::fs::write("report.html", html)?;
//!     Ok(())
//! }
//! ```

pub mod aggregation;
pub mod cli;
pub mod flatten;
pub mod pipeline;
pub mod report;

// Re-export commonly used types
pub use cloudcost_core::error;
pub use cloudcost_core::types;
pub use cloudcost_core::{CloudcostError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
