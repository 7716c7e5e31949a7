//! Common test utilities and helpers for cloudcost tests
//!
//! Provides an in-memory billing source that answers cost queries from a
//! list of line items, applying the query's filter and group-by the way the
//! real service does.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use cloudcost::error::{CloudcostError, Result};
use cloudcost::pipeline::{EC2_COMPUTE_SERVICE, RDS_SERVICE};
use cloudcost_core::provider::{
    BillingSource, CostGroup, CostQuery, ForecastQuery, ForecastTotal, TimeBucket,
};
use cloudcost_core::types::Dimension;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;
use std::sync::Mutex;

/// One raw billing line
#[derive(Debug, Clone)]
pub struct LineItem {
    pub period: String,
    pub service: String,
    pub usage_type: String,
    pub instance_type: Option<String>,
    pub record_type: String,
    pub amount: String,
}

impl LineItem {
    pub fn usage(period: &str, service: &str, usage_type: &str, amount: &str) -> Self {
        Self {
            period: period.to_string(),
            service: service.to_string(),
            usage_type: usage_type.to_string(),
            instance_type: None,
            record_type: "Usage".to_string(),
            amount: amount.to_string(),
        }
    }

    pub fn ec2(period: &str, instance_type: &str, amount: &str) -> Self {
        Self::usage(
            period,
            EC2_COMPUTE_SERVICE,
            &format!("BoxUsage:{instance_type}"),
            amount,
        )
        .with_instance_type(instance_type)
    }

    pub fn rds(period: &str, instance_type: &str, amount: &str) -> Self {
        Self::usage(
            period,
            RDS_SERVICE,
            &format!("InstanceUsage:{instance_type}"),
            amount,
        )
        .with_instance_type(instance_type)
    }

    pub fn with_instance_type(mut self, instance_type: &str) -> Self {
        self.instance_type = Some(instance_type.to_string());
        self
    }

    pub fn with_record_type(mut self, record_type: &str) -> Self {
        self.record_type = record_type.to_string();
        self
    }

    fn value(&self, dimension: Dimension) -> &str {
        match dimension {
            Dimension::Service => &self.service,
            Dimension::UsageType => &self.usage_type,
            Dimension::InstanceType => self.instance_type.as_deref().unwrap_or("NoInstanceType"),
            Dimension::RecordType => &self.record_type,
        }
    }

    fn attributes(&self) -> Vec<(Dimension, &str)> {
        [
            Dimension::Service,
            Dimension::UsageType,
            Dimension::InstanceType,
            Dimension::RecordType,
        ]
        .into_iter()
        .map(|d| (d, self.value(d)))
        .collect()
    }
}

/// A query seen by the fake, in call order
#[derive(Debug, Clone, PartialEq)]
pub enum SeenQuery {
    Cost {
        group_by: Vec<Dimension>,
        start: NaiveDate,
        end: NaiveDate,
    },
    Forecast { start: NaiveDate, end: NaiveDate },
}

/// In-memory billing source
#[derive(Default)]
pub struct FakeBillingSource {
    items: Vec<LineItem>,
    empty_periods: Vec<String>,
    forecast: Option<String>,
    seen: Mutex<Vec<SeenQuery>>,
}

impl FakeBillingSource {
    pub fn new(items: Vec<LineItem>) -> Self {
        Self {
            items,
            forecast: Some("100.00".to_string()),
            ..Default::default()
        }
    }

    /// Report a bucket with no groups for `period`
    pub fn with_empty_period(mut self, period: &str) -> Self {
        self.empty_periods.push(period.to_string());
        self
    }

    /// Forecast amount; `None` makes the forecast query fail
    pub fn with_forecast(mut self, amount: Option<&str>) -> Self {
        self.forecast = amount.map(str::to_string);
        self
    }

    pub fn seen(&self) -> Vec<SeenQuery> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl BillingSource for FakeBillingSource {
    async fn query_cost_and_usage(&self, query: &CostQuery) -> Result<Vec<TimeBucket>> {
        self.seen
            .lock()
            .unwrap()
            .push(SeenQuery::Cost {
                group_by: query.group_by.clone(),
                start: query.start,
                end: query.end,
            });

        let mut grouped: BTreeMap<String, BTreeMap<Vec<String>, Vec<String>>> = BTreeMap::new();
        for period in &self.empty_periods {
            grouped.entry(period.clone()).or_default();
        }

        for item in &self.items {
            let attributes = item.attributes();
            if let Some(filter) = &query.filter {
                if !filter.matches(&attributes) {
                    continue;
                }
            }
            let keys = query
                .group_by
                .iter()
                .map(|d| item.value(*d).to_string())
                .collect();
            grouped
                .entry(item.period.clone())
                .or_default()
                .entry(keys)
                .or_default()
                .push(item.amount.clone());
        }

        Ok(grouped
            .into_iter()
            .map(|(period, groups)| TimeBucket {
                period,
                groups: groups
                    .into_iter()
                    .map(|(keys, amounts)| CostGroup {
                        keys,
                        amount: sum_amounts(amounts),
                    })
                    .collect(),
            })
            .collect())
    }

    async fn query_forecast(&self, query: &ForecastQuery) -> Result<ForecastTotal> {
        self.seen.lock().unwrap().push(SeenQuery::Forecast {
            start: query.start,
            end: query.end,
        });
        match &self.forecast {
            Some(amount) => Ok(ForecastTotal {
                amount: amount.clone(),
            }),
            None => Err(CloudcostError::Query(
                "DataUnavailableException: insufficient history".to_string(),
            )),
        }
    }
}

/// Sum several raw amounts; a single amount is passed through untouched
fn sum_amounts(amounts: Vec<String>) -> String {
    if amounts.len() == 1 {
        return amounts.into_iter().next().unwrap_or_default();
    }
    amounts
        .iter()
        .map(|a| Decimal::from_str(a).unwrap())
        .sum::<Decimal>()
        .to_string()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Distinct periods of the fake's line items
pub fn periods_of(items: &[LineItem]) -> BTreeSet<String> {
    items.iter().map(|i| i.period.clone()).collect()
}
