//! End-to-end report pipeline
//!
//! Issues the billing queries for the three report sections plus the
//! forecast, one after another, and feeds each response through
//! flatten → aggregate before assembling the final bundle. Any failure
//! aborts the run.
//!
//! | Section | Grouped by | Filter | Aggregated by | Totals |
//! |---------|-----------|--------|---------------|--------|
//! | overall | service, usage type | record type not credit/refund | service | no |
//! | ec2 | usage type, instance type | EC2 compute service | instance type | yes |
//! | rds | instance type | RDS service | instance type | yes |

use crate::aggregation::{self, Aggregator, Grouping};
use crate::flatten::{distinct_values, flatten, parse_amount};
use crate::report::{self, ReportInputs};
use chrono::{Datelike, Duration, NaiveDate};
use cloudcost_core::aggregation_types::{AggregatedRow, ReportBundle};
use cloudcost_core::error::{CloudcostError, Result};
use cloudcost_core::filters::FilterExpression;
use cloudcost_core::provider::{BillingSource, CostQuery, ForecastQuery};
use cloudcost_core::types::{Dimension, PeriodLabel};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info};

/// Service name of EC2 compute in billing data
pub const EC2_COMPUTE_SERVICE: &str = "Amazon Elastic Compute Cloud - Compute";

/// Service name of RDS in billing data
pub const RDS_SERVICE: &str = "Amazon Relational Database Service";

/// Record types excluded from the overall section
pub const EXCLUDED_RECORD_TYPES: [&str; 2] = ["Credit", "Refund"];

/// Default history window in days
pub const DEFAULT_LOOKBACK_DAYS: i64 = 365;

/// One table of the report and the query that feeds it
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSection {
    pub name: &'static str,
    pub group_by: Vec<Dimension>,
    pub filter: FilterExpression,
    pub grouping: Grouping,
    pub with_totals: bool,
    /// Dimension whose distinct values populate the section's dropdown
    pub dropdown: Dimension,
}

impl ReportSection {
    /// All services, credits and refunds excluded
    pub fn overall() -> Self {
        Self {
            name: "overall",
            group_by: vec![Dimension::Service, Dimension::UsageType],
            filter: FilterExpression::dimension_not_in(
                Dimension::RecordType,
                EXCLUDED_RECORD_TYPES,
            ),
            grouping: Grouping::By(Dimension::Service),
            with_totals: false,
            dropdown: Dimension::Service,
        }
    }

    /// EC2 compute by instance type
    pub fn ec2() -> Self {
        Self {
            name: "ec2",
            group_by: vec![Dimension::UsageType, Dimension::InstanceType],
            filter: FilterExpression::dimension_in(Dimension::Service, [EC2_COMPUTE_SERVICE]),
            grouping: Grouping::By(Dimension::InstanceType),
            with_totals: true,
            dropdown: Dimension::InstanceType,
        }
    }

    /// RDS by instance type
    pub fn rds() -> Self {
        Self {
            name: "rds",
            group_by: vec![Dimension::InstanceType],
            filter: FilterExpression::dimension_in(Dimension::Service, [RDS_SERVICE]),
            grouping: Grouping::By(Dimension::InstanceType),
            with_totals: true,
            dropdown: Dimension::InstanceType,
        }
    }

    /// Monthly cost query for this section over `[start, end)`
    pub fn query(&self, start: NaiveDate, end: NaiveDate) -> CostQuery {
        CostQuery::monthly(start, end)
            .with_group_by(self.group_by.clone())
            .with_filter(self.filter.clone())
    }
}

/// Aggregated output of one section
#[derive(Debug, Clone)]
pub struct SectionResult {
    pub rows: Vec<AggregatedRow>,
    /// Sorted distinct values of the section's dropdown dimension
    pub dropdown: Vec<String>,
    pub periods: BTreeSet<PeriodLabel>,
}

/// History window `[today - lookback_days, today)`
pub fn history_window(today: NaiveDate, lookback_days: i64) -> Result<(NaiveDate, NaiveDate)> {
    if lookback_days <= 0 {
        return Err(CloudcostError::InvalidArgument(format!(
            "lookback must be at least one day, got {lookback_days}"
        )));
    }
    let start = Duration::try_days(lookback_days)
        .and_then(|lookback| today.checked_sub_signed(lookback))
        .ok_or_else(|| {
            CloudcostError::InvalidDate(format!("{today} minus {lookback_days} days"))
        })?;
    Ok((start, today))
}

/// Forecast window from `today` to the first day of next month
pub fn forecast_window(today: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
    let (year, month) = if today.month() == 12 {
        (today.year() + 1, 1)
    } else {
        (today.year(), today.month() + 1)
    };
    let end = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| CloudcostError::InvalidDate(format!("{year}-{month:02}-01")))?;
    Ok((today, end))
}

/// Runs every query and builds the report bundle
#[derive(Debug, Clone)]
pub struct ReportPipeline {
    lookback_days: i64,
    show_progress: bool,
}

impl Default for ReportPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPipeline {
    pub fn new() -> Self {
        Self {
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            show_progress: false,
        }
    }

    pub fn with_lookback_days(mut self, lookback_days: i64) -> Self {
        self.lookback_days = lookback_days;
        self
    }

    /// Enable or disable the progress spinner
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    fn spinner(&self) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} [{elapsed_precise}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Some(pb)
    }

    /// Query, flatten and aggregate one section
    pub async fn run_section<S>(
        &self,
        source: &S,
        section: &ReportSection,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<SectionResult>
    where
        S: BillingSource + ?Sized,
    {
        let buckets = source
            .query_cost_and_usage(&section.query(start, end))
            .await?;
        let records = flatten(&buckets, &section.group_by)?;
        let dropdown = distinct_values(&records, section.dropdown);
        let rows = Aggregator::new(section.grouping)
            .with_totals(section.with_totals)
            .aggregate(&records);
        let periods = aggregation::periods(&rows);

        debug!(
            "Section {}: {} record(s), {} row(s), {} period(s)",
            section.name,
            records.len(),
            rows.len(),
            periods.len()
        );

        Ok(SectionResult {
            rows,
            dropdown,
            periods,
        })
    }

    /// Fetch and parse the forecast for the rest of the current month
    pub async fn forecast<S>(&self, source: &S, today: NaiveDate) -> Result<rust_decimal::Decimal>
    where
        S: BillingSource + ?Sized,
    {
        let (start, end) = forecast_window(today)?;
        let total = source
            .query_forecast(&ForecastQuery::monthly(start, end))
            .await?;
        parse_amount(&total.amount).ok_or_else(|| CloudcostError::InvalidAmount {
            period: format!("{start}..{end}"),
            keys: "forecast".to_string(),
            value: total.amount.clone(),
        })
    }

    /// Run the whole pipeline
    ///
    /// History covers the `lookback_days` before `history_end`. The forecast
    /// runs from `forecast_from` to the end of that month and must not start
    /// in the past, so callers pass the real current date here.
    pub async fn run<S>(
        &self,
        source: &S,
        history_end: NaiveDate,
        forecast_from: NaiveDate,
    ) -> Result<ReportBundle>
    where
        S: BillingSource + ?Sized,
    {
        let (start, end) = history_window(history_end, self.lookback_days)?;
        info!("Building cost report for {} to {}", start, end);

        let progress = self.spinner();
        let step = |message: &'static str| {
            if let Some(pb) = &progress {
                pb.set_message(message);
            }
        };

        step("Fetching overall costs");
        let overall = self
            .run_section(source, &ReportSection::overall(), start, end)
            .await?;

        step("Fetching cost forecast");
        let forecast_cost = self.forecast(source, forecast_from).await?;

        step("Fetching EC2 costs");
        let ec2 = self
            .run_section(source, &ReportSection::ec2(), start, end)
            .await?;

        step("Fetching RDS costs");
        let rds = self
            .run_section(source, &ReportSection::rds(), start, end)
            .await?;

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        info!(
            "Aggregated {} overall, {} EC2 and {} RDS row(s)",
            overall.rows.len(),
            ec2.rows.len(),
            rds.rows.len()
        );

        report::assemble(ReportInputs {
            overall_summary: overall.rows,
            ec2_summary: ec2.rows,
            rds_summary: rds.rows,
            services: overall.dropdown,
            instances: ec2.dropdown,
            rds_instances: rds.dropdown,
            periods: overall.periods,
            forecast_cost,
        })
    }
}

/// Write the rendered document, creating parent directories as needed
pub fn write_document(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)?;
    info!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}
