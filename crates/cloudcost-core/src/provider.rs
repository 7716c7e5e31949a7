//! Billing source trait and boundary types
//!
//! This module defines the `BillingSource` trait that billing backends
//! implement, along with the raw response shapes they return. Responses stay
//! close to the wire: amounts are still strings and keys are still positional,
//! so that parsing and validation happen in one place downstream.

use crate::error::Result;
use crate::filters::FilterExpression;
use crate::types::{Dimension, Granularity};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Cost metric requested from the billing service
pub const UNBLENDED_COST: &str = "UnblendedCost";

/// Forecast metric name
pub const UNBLENDED_COST_FORECAST: &str = "UNBLENDED_COST";

/// Historical cost query
#[derive(Debug, Clone, PartialEq)]
pub struct CostQuery {
    /// Inclusive start date
    pub start: NaiveDate,
    /// Exclusive end date
    pub end: NaiveDate,
    pub granularity: Granularity,
    /// Grouping dimensions, in the order keys come back in each group
    pub group_by: Vec<Dimension>,
    pub filter: Option<FilterExpression>,
    pub metric: &'static str,
}

impl CostQuery {
    /// Monthly unblended-cost query over `[start, end)`
    pub fn monthly(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            granularity: Granularity::Monthly,
            group_by: Vec::new(),
            filter: None,
            metric: UNBLENDED_COST,
        }
    }

    pub fn with_group_by(mut self, group_by: impl Into<Vec<Dimension>>) -> Self {
        self.group_by = group_by.into();
        self
    }

    pub fn with_filter(mut self, filter: FilterExpression) -> Self {
        self.filter = Some(filter);
        self
    }
}

/// Cost forecast query
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastQuery {
    /// Inclusive start date, no earlier than today
    pub start: NaiveDate,
    /// Exclusive end date
    pub end: NaiveDate,
    pub granularity: Granularity,
    pub metric: &'static str,
    /// Prediction interval level in percent
    pub prediction_interval_level: i32,
}

impl ForecastQuery {
    pub fn monthly(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            granularity: Granularity::Monthly,
            metric: UNBLENDED_COST_FORECAST,
            prediction_interval_level: 95,
        }
    }
}

/// One group inside a time bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostGroup {
    /// Key values, positionally matching the query's `group_by`
    pub keys: Vec<String>,
    /// Cost amount as returned by the service
    pub amount: String,
}

/// Costs for one time period
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeBucket {
    /// Start date of the bucket as returned by the service
    pub period: String,
    pub groups: Vec<CostGroup>,
}

/// Forecasted total for a date range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastTotal {
    /// Forecast amount as returned by the service
    pub amount: String,
}

/// Trait for billing data backends.
///
/// Implementations issue one request per call (following pagination
/// internally) and surface any failure as an error; there is no retry.
#[async_trait]
pub trait BillingSource: Send + Sync {
    /// Fetch time-bucketed, grouped costs.
    async fn query_cost_and_usage(&self, query: &CostQuery) -> Result<Vec<TimeBucket>>;

    /// Fetch the forecasted total cost.
    async fn query_forecast(&self, query: &ForecastQuery) -> Result<ForecastTotal>;
}
