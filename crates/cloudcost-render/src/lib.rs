//! Output rendering for cloudcost
//!
//! This crate turns a `ReportBundle` into the final HTML document, a JSON
//! dump, or a terminal summary table.

pub mod output;

pub use output::{HtmlRenderer, JsonFormatter, OutputFormatter, TableFormatter};
