//! AWS Cost Explorer integration
//!
//! Wraps `aws_sdk_costexplorer::Client` behind the `BillingSource` trait.
//! Cost and usage queries follow `next_page_token` until the service reports
//! no further pages, so large group-by results are never silently truncated.

use async_trait::async_trait;
use aws_sdk_costexplorer::{
    Client,
    error::DisplayErrorContext,
    types::{
        DateInterval, Dimension as CeDimension, DimensionValues, Expression, Granularity,
        GroupDefinition, GroupDefinitionType, Metric, ResultByTime,
    },
};
use chrono::NaiveDate;
use cloudcost_core::config::BillingConfig;
use cloudcost_core::error::{CloudcostError, Result};
use cloudcost_core::filters::FilterExpression;
use cloudcost_core::provider::{
    BillingSource, CostGroup, CostQuery, ForecastQuery, ForecastTotal, TimeBucket,
};
use tracing::{debug, info};

/// Provider name attached to the explicit credentials
const CREDENTIALS_PROVIDER_NAME: &str = "cloudcost-config";

/// Billing source backed by AWS Cost Explorer
pub struct CostExplorerSource {
    client: Client,
}

impl CostExplorerSource {
    /// Create a client from explicit credentials and region
    pub async fn new(config: &BillingConfig) -> Self {
        let credentials = aws_credential_types::Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            None, // session token
            None, // expiry
            CREDENTIALS_PROVIDER_NAME,
        );

        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        info!(region = %config.region, "Initialized Cost Explorer client");

        Self {
            client: Client::new(&sdk_config),
        }
    }
}

#[async_trait]
impl BillingSource for CostExplorerSource {
    async fn query_cost_and_usage(&self, query: &CostQuery) -> Result<Vec<TimeBucket>> {
        info!(
            "Fetching costs from {} to {} grouped by [{}]",
            query.start,
            query.end,
            query
                .group_by
                .iter()
                .map(|d| d.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let interval = date_interval(query.start, query.end)?;
        let group_by = (!query.group_by.is_empty()).then(|| {
            query
                .group_by
                .iter()
                .map(|d| {
                    GroupDefinition::builder()
                        .r#type(GroupDefinitionType::Dimension)
                        .key(d.as_str())
                        .build()
                })
                .collect::<Vec<_>>()
        });
        let filter = query.filter.as_ref().map(to_expression);

        let mut buckets = Vec::new();
        let mut next_page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let response = self
                .client
                .get_cost_and_usage()
                .time_period(interval.clone())
                .granularity(Granularity::from(query.granularity.as_str()))
                .metrics(query.metric)
                .set_filter(filter.clone())
                .set_group_by(group_by.clone())
                .set_next_page_token(next_page_token.take())
                .send()
                .await
                .map_err(|e| {
                    CloudcostError::Query(format!(
                        "GetCostAndUsage failed: {}",
                        DisplayErrorContext(&e)
                    ))
                })?;
            pages += 1;

            for result in response.results_by_time() {
                buckets.push(convert_result(result, query.metric)?);
            }

            match response.next_page_token() {
                Some(token) if !token.is_empty() => next_page_token = Some(token.to_string()),
                _ => break,
            }
        }

        debug!("Received {} time buckets over {} page(s)", buckets.len(), pages);
        Ok(buckets)
    }

    async fn query_forecast(&self, query: &ForecastQuery) -> Result<ForecastTotal> {
        info!("Fetching cost forecast from {} to {}", query.start, query.end);

        let response = self
            .client
            .get_cost_forecast()
            .time_period(date_interval(query.start, query.end)?)
            .granularity(Granularity::from(query.granularity.as_str()))
            .metric(Metric::from(query.metric))
            .prediction_interval_level(query.prediction_interval_level)
            .send()
            .await
            .map_err(|e| {
                CloudcostError::Query(format!(
                    "GetCostForecast failed: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        let amount = response
            .total()
            .and_then(|total| total.amount())
            .ok_or_else(|| {
                CloudcostError::MalformedResponse("forecast response has no total".to_string())
            })?;

        Ok(ForecastTotal {
            amount: amount.to_string(),
        })
    }
}

fn date_interval(start: NaiveDate, end: NaiveDate) -> Result<DateInterval> {
    DateInterval::builder()
        .start(start.format("%Y-%m-%d").to_string())
        .end(end.format("%Y-%m-%d").to_string())
        .build()
        .map_err(|e| CloudcostError::InvalidArgument(format!("date interval: {e}")))
}

/// Translate a filter tree into the SDK's expression type
fn to_expression(filter: &FilterExpression) -> Expression {
    match filter {
        FilterExpression::Dimension { key, values } => Expression::builder()
            .dimensions(
                DimensionValues::builder()
                    .key(CeDimension::from(key.as_str()))
                    .set_values(Some(values.clone()))
                    .build(),
            )
            .build(),
        FilterExpression::Not(inner) => Expression::builder().not(to_expression(inner)).build(),
        FilterExpression::And(all) => Expression::builder()
            .set_and(Some(all.iter().map(to_expression).collect()))
            .build(),
        FilterExpression::Or(any) => Expression::builder()
            .set_or(Some(any.iter().map(to_expression).collect()))
            .build(),
    }
}

fn convert_result(result: &ResultByTime, metric: &str) -> Result<TimeBucket> {
    let period = result
        .time_period()
        .map(|tp| tp.start().to_string())
        .ok_or_else(|| {
            CloudcostError::MalformedResponse("result without a time period".to_string())
        })?;

    let groups = result
        .groups()
        .iter()
        .map(|group| {
            let amount = group
                .metrics()
                .and_then(|metrics| metrics.get(metric))
                .and_then(|value| value.amount())
                .ok_or_else(|| {
                    CloudcostError::MalformedResponse(format!(
                        "group [{}] in period {} has no {} amount",
                        group.keys().join(", "),
                        period,
                        metric
                    ))
                })?;
            Ok(CostGroup {
                keys: group.keys().to_vec(),
                amount: amount.to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(TimeBucket { period, groups })
}
