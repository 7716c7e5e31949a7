//! Aggregation data types for cloudcost
//!
//! Pure data structures used for aggregated cost summaries and the
//! rendering bundle. These types have no dependencies on the billing source.

use crate::types::{DimensionKey, PeriodLabel};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One (period, key) row of a month-over-month comparison table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedRow {
    /// Billing period of the row
    pub period: PeriodLabel,
    /// Service or instance type the cost belongs to
    pub key: DimensionKey,
    /// Summed cost for the key within the period
    pub cost: Decimal,
    /// Cost of the same key in its preceding period, zero if none
    pub previous_cost: Decimal,
    /// `cost - previous_cost`
    pub cost_change: Decimal,
    /// Sum of the key's cost across every period (instance tables only)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub total_cost: Option<Decimal>,
}

/// Everything the document renderer needs, under fixed binding names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportBundle {
    /// Overall costs by service
    pub overall_summary: Vec<AggregatedRow>,
    /// EC2 compute costs by instance type
    pub ec2_summary: Vec<AggregatedRow>,
    /// RDS costs by instance type
    pub rds_summary: Vec<AggregatedRow>,
    /// Period to display label; the latest period maps to the current-period label
    pub months: BTreeMap<PeriodLabel, String>,
    /// Label preselected in the period dropdown
    pub latest_month: String,
    /// Distinct EC2 instance types, sorted
    pub instances: Vec<String>,
    /// Distinct RDS instance types, sorted
    pub rds_instances: Vec<String>,
    /// Distinct service names, sorted
    pub overall_services: Vec<String>,
    /// Forecasted cost for the rest of the current month
    pub forecast_cost: Decimal,
}

impl ReportBundle {
    /// The period currently mapped to the current-period label
    pub fn current_period(&self) -> Option<&PeriodLabel> {
        self.months
            .iter()
            .find(|(_, label)| **label == self.latest_month)
            .map(|(period, _)| period)
    }
}

/// Calculate totals from aggregated rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub cost: Decimal,
    pub previous_cost: Decimal,
    pub cost_change: Decimal,
}

impl Totals {
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a AggregatedRow>) -> Self {
        let mut totals = Self::default();
        for row in rows {
            totals.cost += row.cost;
            totals.previous_cost += row.previous_cost;
            totals.cost_change += row.cost_change;
        }
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(period: &str, key: &str, cost: i64, previous: i64) -> AggregatedRow {
        AggregatedRow {
            period: PeriodLabel::new(period),
            key: DimensionKey::new(key),
            cost: Decimal::new(cost, 2),
            previous_cost: Decimal::new(previous, 2),
            cost_change: Decimal::new(cost - previous, 2),
            total_cost: None,
        }
    }

    #[test]
    fn test_totals_from_rows() {
        let rows = vec![
            row("2024-02-01", "AWS Lambda", 1050, 1000),
            row("2024-02-01", "Amazon S3", 200, 300),
        ];
        let totals = Totals::from_rows(&rows);
        assert_eq!(totals.cost, Decimal::new(1250, 2));
        assert_eq!(totals.previous_cost, Decimal::new(1300, 2));
        assert_eq!(totals.cost_change, Decimal::new(-50, 2));
    }

    #[test]
    fn test_total_cost_omitted_when_absent() {
        let json = serde_json::to_value(row("2024-01-01", "AWS Lambda", 100, 0)).unwrap();
        assert!(json.get("total_cost").is_none());
        assert_eq!(json["period"], "2024-01-01");
        assert_eq!(json["cost"], 1.0);
    }

    #[test]
    fn test_money_serializes_as_numbers() {
        let mut with_total = row("2024-02-01", "t3.micro", 350, 500);
        with_total.total_cost = Some(Decimal::new(850, 2));
        let json = serde_json::to_value(&with_total).unwrap();

        assert!(json["cost"].is_number());
        assert_eq!(json["cost"], 3.5);
        assert_eq!(json["previous_cost"], 5.0);
        assert_eq!(json["cost_change"], -1.5);
        assert_eq!(json["total_cost"], 8.5);
    }

    #[test]
    fn test_current_period_lookup() {
        let mut months = BTreeMap::new();
        months.insert(PeriodLabel::new("2024-01-01"), "2024-01-01".to_string());
        months.insert(PeriodLabel::new("2024-02-01"), "Current Period".to_string());
        let bundle = ReportBundle {
            overall_summary: Vec::new(),
            ec2_summary: Vec::new(),
            rds_summary: Vec::new(),
            months,
            latest_month: "Current Period".to_string(),
            instances: Vec::new(),
            rds_instances: Vec::new(),
            overall_services: Vec::new(),
            forecast_cost: Decimal::ZERO,
        };
        assert_eq!(bundle.current_period().unwrap().as_str(), "2024-02-01");
    }
}
