//! CLI interface for cloudcost
//!
//! This module defines the command-line interface using clap. Credentials and
//! region fall back to the standard AWS environment variables, so a bare
//! `cloudcost` works in any shell where the AWS CLI does.
//!
//! # Example
//!
//! ```bash
//! # Write the HTML report to the default location
//! cloudcost
//!
//! # Last 90 days up to a fixed date, with a terminal summary
//! cloudcost --lookback-days 90 --until 2024-06-30 --summary
//!
//! # Dump the report data as JSON
//! cloudcost --json > report.json
//! ```

use chrono::NaiveDate;
use clap::Parser;
use cloudcost_core::config::{ACCESS_KEY_ID_VAR, BillingConfig, REGION_VAR, SECRET_ACCESS_KEY_VAR};
use cloudcost_core::error::{CloudcostError, Result};
use std::path::PathBuf;

/// Default location of the generated report
pub const DEFAULT_OUTPUT_PATH: &str = "templates/aws_cost_report.html";

/// Generate a month-over-month AWS cost report
#[derive(Parser, Debug, Clone)]
#[command(name = "cloudcost")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// AWS access key id
    #[arg(long, env = ACCESS_KEY_ID_VAR, hide_env_values = true)]
    pub access_key_id: Option<String>,

    /// AWS secret access key
    #[arg(long, env = SECRET_ACCESS_KEY_VAR, hide_env_values = true)]
    pub secret_access_key: Option<String>,

    /// AWS region used for the Cost Explorer client
    #[arg(long, env = REGION_VAR)]
    pub region: Option<String>,

    /// Where to write the HTML report
    #[arg(long, short = 'o', default_value = DEFAULT_OUTPUT_PATH)]
    pub output: PathBuf,

    /// Render with this template instead of the built-in one
    #[arg(long, short = 't')]
    pub template: Option<PathBuf>,

    /// Number of days of history to report on
    #[arg(long, default_value_t = crate::pipeline::DEFAULT_LOOKBACK_DAYS,
          value_parser = clap::value_parser!(i64).range(1..))]
    pub lookback_days: i64,

    /// End of the history window (YYYY-MM-DD, default: today in UTC)
    #[arg(long)]
    pub until: Option<String>,

    /// Print the report data as JSON instead of writing HTML
    #[arg(long)]
    pub json: bool,

    /// Print a summary table of the current period
    #[arg(long)]
    pub summary: bool,

    /// Only show warnings and errors
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

impl Cli {
    /// Credentials and region, failing if any is missing
    pub fn billing_config(&self) -> Result<BillingConfig> {
        BillingConfig::from_cli(
            self.access_key_id.as_deref(),
            self.secret_access_key.as_deref(),
            self.region.as_deref(),
        )
    }

    /// End of the history window: `--until` if given, otherwise `today`
    pub fn history_end(&self, today: NaiveDate) -> Result<NaiveDate> {
        match &self.until {
            Some(until) => parse_date_filter(until),
            None => Ok(today),
        }
    }
}

/// Parse a date filter in YYYY-MM-DD format
pub fn parse_date_filter(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|_| {
        CloudcostError::InvalidDate(format!(
            "Invalid date format '{date_str}', expected YYYY-MM-DD"
        ))
    })
}
